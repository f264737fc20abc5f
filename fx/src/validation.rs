//! Structural validation of caller input.
//!
//! Validation runs before any store lookup and never touches a store. Every
//! field is checked independently, so a request carrying several defects gets
//! one [`ValidationError`] per defect.

use std::fmt;

use currex_common::{CodeError, CurrencyCode, CurrencyPair};
use rust_decimal::Decimal;

/// Input field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Code,
    Name,
    Sign,
    BaseCurrencyCode,
    TargetCurrencyCode,
    Rate,
    Amount,
}

impl Field {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Code => "code",
            Field::Name => "name",
            Field::Sign => "sign",
            Field::BaseCurrencyCode => "baseCurrencyCode",
            Field::TargetCurrencyCode => "targetCurrencyCode",
            Field::Rate => "rate",
            Field::Amount => "amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The field was not supplied at all.
    Missing,
    /// The field was supplied but holds only whitespace.
    Blank,
    /// Currency code with the wrong number of characters.
    InvalidLength { expected: usize, actual: usize },
    /// Currency code containing something other than letters.
    NonAlphabetic,
    /// Not parseable as a decimal number.
    NotANumber,
    /// Parsed, but zero or negative.
    NotPositive,
    /// More significant digits or decimal places than can be held exactly.
    TooPrecise,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing => write!(f, "is missing"),
            Violation::Blank => write!(f, "is blank"),
            Violation::InvalidLength { expected, actual } => {
                write!(f, "must have {} characters, got {}", expected, actual)
            }
            Violation::NonAlphabetic => write!(f, "must contain only letters"),
            Violation::NotANumber => write!(f, "is not a valid number"),
            Violation::NotPositive => write!(f, "must be greater than 0"),
            Violation::TooPrecise => write!(
                f,
                "must have at most {} significant digits and {} decimal places",
                MAX_PRECISION, MAX_PRECISION
            ),
        }
    }
}

impl From<CodeError> for Violation {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::Blank => Violation::Blank,
            CodeError::InvalidLength { expected, actual } => {
                Violation::InvalidLength { expected, actual }
            }
            CodeError::NonAlphabetic => Violation::NonAlphabetic,
        }
    }
}

/// A single named defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub violation: Violation,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.violation)
    }
}

/// Accumulator for validation errors.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a defect.
    pub fn add(&mut self, field: Field, violation: Violation) {
        self.errors.push(ValidationError { field, violation });
    }

    /// True iff no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded errors in the order they were found.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consume into the error value carried by [`crate::FxError::InvalidInput`].
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }
}

/// Non-empty set of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// All recorded errors.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether `field` was reported with `violation`.
    pub fn contains(&self, field: Field, violation: &Violation) -> bool {
        self.0
            .iter()
            .any(|e| e.field == field && &e.violation == violation)
    }

    /// Whether any error refers to `field`.
    pub fn has_field(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a currency code, recording every defect. Returns the normalized code
/// when the field is well-formed.
pub fn check_code(
    field: Field,
    raw: Option<&str>,
    result: &mut ValidationResult,
) -> Option<CurrencyCode> {
    let Some(raw) = raw else {
        result.add(field, Violation::Missing);
        return None;
    };

    let violations = CurrencyCode::violations(raw);
    if violations.is_empty() {
        return CurrencyCode::parse(raw).ok();
    }
    for violation in violations {
        result.add(field, violation.into());
    }
    None
}

/// Check a strictly positive decimal (amount or rate).
pub fn check_positive_decimal(
    field: Field,
    raw: Option<&str>,
    result: &mut ValidationResult,
) -> Option<Decimal> {
    let Some(raw) = raw else {
        result.add(field, Violation::Missing);
        return None;
    };
    if raw.trim().is_empty() {
        result.add(field, Violation::Blank);
        return None;
    }

    match parse_decimal(raw) {
        Some(value) if !represents_exactly(raw, value) => {
            result.add(field, Violation::TooPrecise);
            None
        }
        Some(value) if value > Decimal::ZERO => Some(value),
        Some(_) => {
            result.add(field, Violation::NotPositive);
            None
        }
        None => {
            result.add(field, Violation::NotANumber);
            None
        }
    }
}

/// Check a free-text field that must not be blank.
pub fn check_text(field: Field, raw: Option<&str>, result: &mut ValidationResult) -> Option<String> {
    match raw {
        None => {
            result.add(field, Violation::Missing);
            None
        }
        Some(s) if s.trim().is_empty() => {
            result.add(field, Violation::Blank);
            None
        }
        Some(s) => Some(s.trim().to_string()),
    }
}

/// Parse a decimal in plain (`0.92`) or scientific (`9.2e-1`) notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Digits a decimal value can hold, both significant and after the point.
pub const MAX_PRECISION: u32 = 28;

/// Whether `value` equals the literal `raw` without any rounding. Parsing
/// rounds literals that exceed [`MAX_PRECISION`].
pub fn represents_exactly(raw: &str, value: Decimal) -> bool {
    let Some(literal) = literal_digits(raw) else {
        return false;
    };
    let value = value.normalize();
    let parsed = strip_trailing_zeros(
        value.mantissa().unsigned_abs().to_string(),
        i64::from(value.scale()),
    );
    literal == parsed
}

/// Significant digits and scale of a plain or scientific literal.
fn literal_digits(raw: &str) -> Option<(String, i64)> {
    let literal: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let unsigned = literal.trim_start_matches(['+', '-']);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{}{}", int_part, frac_part);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(strip_trailing_zeros(digits, frac_part.len() as i64 - exponent))
}

fn strip_trailing_zeros(digits: String, mut scale: i64) -> (String, i64) {
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return (String::new(), 0);
    }
    let trimmed = significant.trim_end_matches('0');
    scale -= (significant.len() - trimmed.len()) as i64;
    (trimmed.to_string(), scale)
}

/// Validate a single currency code.
pub fn validate_code(raw: Option<&str>) -> Result<CurrencyCode, ValidationErrors> {
    let mut result = ValidationResult::new();
    match check_code(Field::Code, raw, &mut result) {
        Some(code) => Ok(code),
        None => Err(result.into_errors()),
    }
}

/// Validate an ordered pair of currency codes.
pub fn validate_pair(
    base: Option<&str>,
    target: Option<&str>,
) -> Result<CurrencyPair, ValidationErrors> {
    let mut result = ValidationResult::new();
    let base = check_code(Field::BaseCurrencyCode, base, &mut result);
    let target = check_code(Field::TargetCurrencyCode, target, &mut result);

    match (base, target) {
        (Some(base), Some(target)) => Ok(CurrencyPair::new(base, target)),
        _ => Err(result.into_errors()),
    }
}

/// Raw conversion request as received from a caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeRequest<'a> {
    pub base: Option<&'a str>,
    pub target: Option<&'a str>,
    pub amount: Option<&'a str>,
}

/// A conversion request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeQuery {
    pub pair: CurrencyPair,
    pub amount: Decimal,
}

impl ExchangeRequest<'_> {
    pub fn validate(&self) -> Result<ExchangeQuery, ValidationErrors> {
        let mut result = ValidationResult::new();
        let base = check_code(Field::BaseCurrencyCode, self.base, &mut result);
        let target = check_code(Field::TargetCurrencyCode, self.target, &mut result);
        let amount = check_positive_decimal(Field::Amount, self.amount, &mut result);

        match (base, target, amount) {
            (Some(base), Some(target), Some(amount)) => Ok(ExchangeQuery {
                pair: CurrencyPair::new(base, target),
                amount,
            }),
            _ => Err(result.into_errors()),
        }
    }
}

/// Raw rate submission, used for both creation and update.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateRequest<'a> {
    pub base: Option<&'a str>,
    pub target: Option<&'a str>,
    pub rate: Option<&'a str>,
}

/// A rate submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSubmission {
    pub pair: CurrencyPair,
    pub rate: Decimal,
}

impl RateRequest<'_> {
    pub fn validate(&self) -> Result<RateSubmission, ValidationErrors> {
        let mut result = ValidationResult::new();
        let base = check_code(Field::BaseCurrencyCode, self.base, &mut result);
        let target = check_code(Field::TargetCurrencyCode, self.target, &mut result);
        let rate = check_positive_decimal(Field::Rate, self.rate, &mut result);

        match (base, target, rate) {
            (Some(base), Some(target), Some(rate)) => Ok(RateSubmission {
                pair: CurrencyPair::new(base, target),
                rate,
            }),
            _ => Err(result.into_errors()),
        }
    }
}

/// Raw currency registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyRequest<'a> {
    pub code: Option<&'a str>,
    pub name: Option<&'a str>,
    pub sign: Option<&'a str>,
}

/// A currency registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRegistration {
    pub code: CurrencyCode,
    pub name: String,
    pub sign: String,
}

impl CurrencyRequest<'_> {
    pub fn validate(&self) -> Result<CurrencyRegistration, ValidationErrors> {
        let mut result = ValidationResult::new();
        let code = check_code(Field::Code, self.code, &mut result);
        let name = check_text(Field::Name, self.name, &mut result);
        let sign = check_text(Field::Sign, self.sign, &mut result);

        match (code, name, sign) {
            (Some(code), Some(name), Some(sign)) => Ok(CurrencyRegistration { code, name, sign }),
            _ => Err(result.into_errors()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_exchange_request() {
        let query = ExchangeRequest {
            base: Some("usd"),
            target: Some("EUR"),
            amount: Some("100.50"),
        }
        .validate()
        .unwrap();

        assert_eq!(query.pair.base.as_str(), "USD");
        assert_eq!(query.pair.target.as_str(), "EUR");
        assert_eq!(query.amount, dec!(100.50));
    }

    #[test]
    fn test_every_defect_is_reported() {
        let errors = ExchangeRequest {
            base: Some(" "),
            target: Some("EURO"),
            amount: Some("-5"),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(Field::BaseCurrencyCode, &Violation::Blank));
        assert!(errors.contains(
            Field::TargetCurrencyCode,
            &Violation::InvalidLength {
                expected: 3,
                actual: 4
            }
        ));
        assert!(errors.contains(Field::Amount, &Violation::NotPositive));
    }

    #[test]
    fn test_missing_fields() {
        let errors = RateRequest::default().validate().unwrap_err();

        assert!(errors.contains(Field::BaseCurrencyCode, &Violation::Missing));
        assert!(errors.contains(Field::TargetCurrencyCode, &Violation::Missing));
        assert!(errors.contains(Field::Rate, &Violation::Missing));
    }

    #[test]
    fn test_two_letter_code_rejected() {
        let errors = RateRequest {
            base: Some("EU"),
            target: Some("USD"),
            rate: Some("1.1"),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.has_field(Field::BaseCurrencyCode));
    }

    #[test]
    fn test_rate_checks() {
        for (raw, violation) in [
            ("", Violation::Blank),
            ("abc", Violation::NotANumber),
            ("0", Violation::NotPositive),
            ("0.000", Violation::NotPositive),
            ("-1.5", Violation::NotPositive),
        ] {
            let errors = RateRequest {
                base: Some("USD"),
                target: Some("EUR"),
                rate: Some(raw),
            }
            .validate()
            .unwrap_err();

            assert!(
                errors.contains(Field::Rate, &violation),
                "{raw:?} should report {violation:?}, got {errors}"
            );
        }
    }

    #[test]
    fn test_scientific_notation_accepted() {
        assert_eq!(parse_decimal("9.2e-1"), Some(dec!(0.92)));
        assert_eq!(parse_decimal(" 1.25 "), Some(dec!(1.25)));
        assert_eq!(parse_decimal("1,25"), None);
    }

    #[test]
    fn test_rounded_literals_rejected() {
        for raw in [
            "0.000000000000000000000000000001",
            "0.12345678901234567890123456789",
        ] {
            let errors = ExchangeRequest {
                base: Some("USD"),
                target: Some("EUR"),
                amount: Some(raw),
            }
            .validate()
            .unwrap_err();

            assert!(
                errors.contains(Field::Amount, &Violation::TooPrecise),
                "{raw:?} should be too precise, got {errors}"
            );
            assert!(!errors.contains(Field::Amount, &Violation::NotPositive));
        }
    }

    #[test]
    fn test_exact_literals_kept() {
        for raw in [
            "100.50",
            "0.0000000000000000000000000001",
            "1.00000000000000000001",
            "9.2e-1",
            "1e3",
        ] {
            let value = parse_decimal(raw).unwrap();
            assert!(represents_exactly(raw, value), "{raw:?} parsed as {value}");
        }
    }

    #[test]
    fn test_currency_request_requires_name_and_sign() {
        let errors = CurrencyRequest {
            code: Some("AUD"),
            name: Some("  "),
            sign: None,
        }
        .validate()
        .unwrap_err();

        assert!(errors.contains(Field::Name, &Violation::Blank));
        assert!(errors.contains(Field::Sign, &Violation::Missing));
        assert!(!errors.has_field(Field::Code));
    }

    #[test]
    fn test_error_display() {
        let errors = validate_pair(Some("U1"), Some("EUR")).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "baseCurrencyCode must have 3 characters, got 2; baseCurrencyCode must contain only letters"
        );
    }

    proptest! {
        #[test]
        fn prop_codes_of_wrong_length_are_rejected(code in "[A-Za-z]{1,2}|[A-Za-z]{4,8}") {
            let errors = validate_code(Some(&code)).unwrap_err();
            let has_length_error = errors
                .errors()
                .iter()
                .any(|e| matches!(e.violation, Violation::InvalidLength { .. }));
            prop_assert!(has_length_error);
        }

        #[test]
        fn prop_three_letter_codes_are_accepted(code in "[A-Za-z]{3}") {
            let parsed = validate_code(Some(&code)).unwrap();
            prop_assert_eq!(parsed.as_str(), code.to_ascii_uppercase());
        }

        #[test]
        fn prop_non_positive_amounts_are_rejected(units in -1_000_000i64..=0, scale in 0u32..6) {
            let raw = Decimal::new(units, scale).to_string();
            let errors = ExchangeRequest {
                base: Some("USD"),
                target: Some("EUR"),
                amount: Some(&raw),
            }
            .validate()
            .unwrap_err();
            prop_assert!(errors.contains(Field::Amount, &Violation::NotPositive));
        }
    }
}
