//! Currency and exchange rate types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{CurrencyId, ExchangeRateId};

/// Number of characters in a currency code.
pub const CURRENCY_CODE_LEN: usize = 3;

/// Reasons a string is not a well-formed currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Nothing but whitespace.
    #[error("currency code is blank")]
    Blank,

    /// Wrong number of characters.
    #[error("currency code must have {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Contains something other than ASCII letters.
    #[error("currency code must contain only letters")]
    NonAlphabetic,
}

/// ISO 4217 style currency code, always three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased. Returns the
    /// first violation found; use [`CurrencyCode::violations`] to get all of them.
    pub fn parse(raw: &str) -> Result<Self, CodeError> {
        match Self::violations(raw).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(Self(raw.trim().to_ascii_uppercase())),
        }
    }

    /// Every violation present in `raw`, in a stable order.
    pub fn violations(raw: &str) -> Vec<CodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return vec![CodeError::Blank];
        }

        let mut errors = Vec::new();
        let len = trimmed.chars().count();
        if len != CURRENCY_CODE_LEN {
            errors.push(CodeError::InvalidLength {
                expected: CURRENCY_CODE_LEN,
                actual: len,
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.push(CodeError::NonAlphabetic);
        }
        errors
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// US dollar.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub code: CurrencyCode,
    pub full_name: String,
    pub sign: String,
}

impl Currency {
    /// Create a currency with a freshly generated identity.
    pub fn new(code: CurrencyCode, full_name: impl Into<String>, sign: impl Into<String>) -> Self {
        Self {
            id: CurrencyId::new(),
            code,
            full_name: full_name.into(),
            sign: sign.into(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// An ordered pair of currency codes. `EUR/USD` and `USD/EUR` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub base: CurrencyCode,
    /// Currency being converted to.
    pub target: CurrencyCode,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Self {
        Self { base, target }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.target.clone(),
            target: self.base.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

/// A quoted rate: one unit of `base` buys `rate` units of `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: ExchangeRateId,
    pub base: Currency,
    pub target: Currency,
    pub rate: Decimal,
}

impl ExchangeRate {
    /// The ordered code pair this rate is stored under.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base.code.clone(), self.target.code.clone())
    }
}

/// A rate submission before it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExchangeRate {
    pub id: ExchangeRateId,
    pub pair: CurrencyPair,
    pub rate: Decimal,
}

impl NewExchangeRate {
    /// Create a submission with a freshly generated identity.
    pub fn new(pair: CurrencyPair, rate: Decimal) -> Self {
        Self {
            id: ExchangeRateId::new(),
            pair,
            rate,
        }
    }
}
