//! Resolved rates and completed conversions.

use currex_common::{Currency, CurrencyCode, CurrencyPair, ExchangeRate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a rate was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RateSource {
    /// Quoted for exactly the requested pair.
    Direct,
    /// Reciprocal of the quote for the reversed pair.
    Inverse,
    /// Composed from two quotes sharing the pivot currency as base.
    Pivot { via: CurrencyCode },
}

/// A rate usable for a requested pair. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRate {
    pub base: Currency,
    pub target: Currency,
    pub rate: Decimal,
    pub source: RateSource,
}

impl ResolvedRate {
    /// Use a quoted rate exactly as stored.
    pub fn direct(quote: &ExchangeRate) -> Self {
        Self {
            base: quote.base.clone(),
            target: quote.target.clone(),
            rate: quote.rate,
            source: RateSource::Direct,
        }
    }

    /// Derive the rate for the reversed pair of `quote`.
    ///
    /// Returns `None` when the quote cannot be inverted (zero rate).
    pub fn inverse(quote: &ExchangeRate, scale: u32) -> Option<Self> {
        let rate = Decimal::ONE.checked_div(quote.rate)?;
        Some(Self {
            base: quote.target.clone(),
            target: quote.base.clone(),
            rate: round_half_up(rate, scale),
            source: RateSource::Inverse,
        })
    }

    /// Compose two quotes `(P, base)` and `(P, target)` into a `base -> target` rate
    /// of `base_leg.rate / target_leg.rate`.
    pub fn pivot(base_leg: &ExchangeRate, target_leg: &ExchangeRate, scale: u32) -> Option<Self> {
        let rate = base_leg.rate.checked_div(target_leg.rate)?;
        Some(Self {
            base: base_leg.target.clone(),
            target: target_leg.target.clone(),
            rate: round_half_up(rate, scale),
            source: RateSource::Pivot {
                via: base_leg.base.code.clone(),
            },
        })
    }

    /// Get the currency pair.
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base.code.clone(), self.target.code.clone())
    }
}

/// Round to `scale` fractional digits, halves away from zero.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Multiply `a` by `b`, or `None` when the product overflows or would have to
/// be rounded to fit.
pub fn exact_product(a: Decimal, b: Decimal) -> Option<Decimal> {
    let product = a.checked_mul(b)?;

    let (a, b) = (a.normalize(), b.normalize());
    let mantissa = a
        .mantissa()
        .unsigned_abs()
        .checked_mul(b.mantissa().unsigned_abs())?;
    let expected = trim_mantissa(mantissa, i64::from(a.scale()) + i64::from(b.scale()));

    let product_normalized = product.normalize();
    let actual = trim_mantissa(
        product_normalized.mantissa().unsigned_abs(),
        i64::from(product_normalized.scale()),
    );

    (expected == actual).then_some(product)
}

fn trim_mantissa(mut mantissa: u128, mut scale: i64) -> (u128, i64) {
    if mantissa == 0 {
        return (0, 0);
    }
    while mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    (mantissa, scale)
}

/// A completed conversion of an amount along a resolved rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Rate used for conversion.
    pub rate: ResolvedRate,
    /// Input amount, in the base currency.
    pub amount: Decimal,
    /// Output amount, in the target currency.
    pub converted_amount: Decimal,
}

impl Conversion {
    /// Get the effective rate used.
    pub fn effective_rate(&self) -> Decimal {
        self.rate.rate
    }

    pub fn base(&self) -> &Currency {
        &self.rate.base
    }

    pub fn target(&self) -> &Currency {
        &self.rate.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currex_common::ExchangeRateId;
    use rust_decimal_macros::dec;

    fn currency(code: &str) -> Currency {
        Currency::new(code.parse().unwrap(), code, code)
    }

    fn quote(base: &str, target: &str, rate: Decimal) -> ExchangeRate {
        ExchangeRate {
            id: ExchangeRateId::new(),
            base: currency(base),
            target: currency(target),
            rate,
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(1.0000005), 6), dec!(1.000001));
        assert_eq!(round_half_up(dec!(1.0000004999), 6), dec!(1.000000));
        assert_eq!(round_half_up(dec!(2.5), 0), dec!(3));
    }

    #[test]
    fn test_inverse_swaps_currencies() {
        let usd_eur = quote("USD", "EUR", dec!(0.92));

        let derived = ResolvedRate::inverse(&usd_eur, 6).unwrap();

        assert_eq!(derived.base.code.as_str(), "EUR");
        assert_eq!(derived.target.code.as_str(), "USD");
        assert_eq!(derived.rate, dec!(1.086957));
        assert_eq!(derived.source, RateSource::Inverse);
        // The quote itself is untouched.
        assert_eq!(usd_eur.rate, dec!(0.92));
    }

    #[test]
    fn test_inverse_of_zero_is_unusable() {
        assert!(ResolvedRate::inverse(&quote("USD", "EUR", Decimal::ZERO), 6).is_none());
    }

    #[test]
    fn test_pivot_composition() {
        let usd_eur = quote("USD", "EUR", dec!(0.92));
        let usd_gbp = quote("USD", "GBP", dec!(0.78));

        let derived = ResolvedRate::pivot(&usd_eur, &usd_gbp, 6).unwrap();

        assert_eq!(derived.pair().to_string(), "EUR/GBP");
        assert_eq!(derived.rate, dec!(1.179487));
        assert_eq!(
            derived.source,
            RateSource::Pivot {
                via: "USD".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_exact_product() {
        assert_eq!(exact_product(dec!(1.086957), dec!(100)), Some(dec!(108.6957)));
        assert_eq!(
            exact_product(dec!(0.9212345678), dec!(1.00000000000000000001)),
            None
        );
        assert_eq!(exact_product(Decimal::MAX, dec!(10)), None);
        assert_eq!(exact_product(dec!(2.5), dec!(0.4)), Some(dec!(1)));
    }

    #[test]
    fn test_rate_source_serialization() {
        let json = serde_json::to_value(RateSource::Pivot {
            via: "USD".parse().unwrap(),
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({"kind": "pivot", "via": "USD"}));
    }
}
