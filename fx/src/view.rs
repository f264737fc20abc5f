//! Response payloads handed to the API layer.

use currex_common::{Currency, CurrencyId, ExchangeRate, ExchangeRateId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion::Conversion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyView {
    pub id: CurrencyId,
    pub code: String,
    pub name: String,
    pub sign: String,
}

impl From<&Currency> for CurrencyView {
    fn from(currency: &Currency) -> Self {
        Self {
            id: currency.id,
            code: currency.code.to_string(),
            name: currency.full_name.clone(),
            sign: currency.sign.clone(),
        }
    }
}

impl From<Currency> for CurrencyView {
    fn from(currency: Currency) -> Self {
        Self::from(&currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateView {
    pub id: ExchangeRateId,
    pub base_currency: CurrencyView,
    pub target_currency: CurrencyView,
    pub rate: Decimal,
}

impl From<ExchangeRate> for ExchangeRateView {
    fn from(rate: ExchangeRate) -> Self {
        Self {
            id: rate.id,
            base_currency: rate.base.into(),
            target_currency: rate.target.into(),
            rate: rate.rate,
        }
    }
}

/// Result of a conversion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeView {
    pub base_currency: CurrencyView,
    pub target_currency: CurrencyView,
    pub rate: Decimal,
    pub amount: Decimal,
    pub converted_amount: Decimal,
}

impl From<Conversion> for ExchangeView {
    fn from(conversion: Conversion) -> Self {
        Self {
            base_currency: conversion.rate.base.into(),
            target_currency: conversion.rate.target.into(),
            rate: conversion.rate.rate,
            amount: conversion.amount,
            converted_amount: conversion.converted_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exchange_rate_view_shape() {
        let rate = ExchangeRate {
            id: ExchangeRateId::new(),
            base: Currency::new("USD".parse().unwrap(), "US Dollar", "$"),
            target: Currency::new("EUR".parse().unwrap(), "Euro", "€"),
            rate: dec!(0.92),
        };

        let json = serde_json::to_value(ExchangeRateView::from(rate)).unwrap();

        assert_eq!(json["baseCurrency"]["code"], "USD");
        assert_eq!(json["baseCurrency"]["name"], "US Dollar");
        assert_eq!(json["targetCurrency"]["sign"], "€");
        assert_eq!(json["rate"], "0.92");
    }
}
