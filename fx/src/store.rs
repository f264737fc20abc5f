//! Store traits and the in-memory implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use currex_common::{
    Currency, CurrencyCode, CurrencyPair, ExchangeRate, NewExchangeRate, StorageError,
    StorageResult,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

/// Persistence for currency records.
#[async_trait]
pub trait CurrencyStore: Send + Sync {
    /// Find a currency by its exact code.
    async fn find_currency_by_code(&self, code: &CurrencyCode) -> StorageResult<Option<Currency>>;

    /// All registered currencies, ordered by code.
    async fn list_currencies(&self) -> StorageResult<Vec<Currency>>;

    /// Persist a new currency. Fails with [`StorageError::UniqueViolation`]
    /// when the code is taken.
    async fn save_currency(&self, currency: Currency) -> StorageResult<Currency>;
}

/// Persistence for quoted rates, keyed by ordered code pair.
#[async_trait]
pub trait ExchangeRateStore: Send + Sync {
    /// Find the rate quoted for exactly this ordered pair.
    async fn find_rate(&self, pair: &CurrencyPair) -> StorageResult<Option<ExchangeRate>>;

    /// All quoted rates, ordered by base code then target code.
    async fn list_rates(&self) -> StorageResult<Vec<ExchangeRate>>;

    /// Persist a new quote. Fails with [`StorageError::UniqueViolation`] when
    /// the pair is already quoted and [`StorageError::MissingReference`] when
    /// either currency is not registered.
    async fn save_rate(&self, rate: NewExchangeRate) -> StorageResult<ExchangeRate>;

    /// Replace the rate of an existing quote. Returns `None` when the pair has
    /// never been quoted.
    async fn update_rate(
        &self,
        pair: &CurrencyPair,
        rate: Decimal,
    ) -> StorageResult<Option<ExchangeRate>>;
}

#[derive(Default)]
struct Tables {
    currencies: BTreeMap<CurrencyCode, Currency>,
    rates: BTreeMap<CurrencyPair, ExchangeRate>,
}

/// Store backed by process memory.
///
/// Uniqueness and referential checks happen under one write lock, so the
/// guarantees match a relational store for single writes.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CurrencyStore for InMemoryStore {
    async fn find_currency_by_code(&self, code: &CurrencyCode) -> StorageResult<Option<Currency>> {
        let found = self.tables.read().currencies.get(code).cloned();
        debug!(code = %code, found = found.is_some(), "Currency lookup");
        Ok(found)
    }

    async fn list_currencies(&self) -> StorageResult<Vec<Currency>> {
        Ok(self.tables.read().currencies.values().cloned().collect())
    }

    async fn save_currency(&self, currency: Currency) -> StorageResult<Currency> {
        let mut tables = self.tables.write();
        if tables.currencies.contains_key(&currency.code) {
            return Err(StorageError::UniqueViolation(format!(
                "currency code {}",
                currency.code
            )));
        }
        tables
            .currencies
            .insert(currency.code.clone(), currency.clone());
        Ok(currency)
    }
}

#[async_trait]
impl ExchangeRateStore for InMemoryStore {
    async fn find_rate(&self, pair: &CurrencyPair) -> StorageResult<Option<ExchangeRate>> {
        let found = self.tables.read().rates.get(pair).cloned();
        debug!(pair = %pair, found = found.is_some(), "Rate lookup");
        Ok(found)
    }

    async fn list_rates(&self) -> StorageResult<Vec<ExchangeRate>> {
        Ok(self.tables.read().rates.values().cloned().collect())
    }

    async fn save_rate(&self, rate: NewExchangeRate) -> StorageResult<ExchangeRate> {
        let mut tables = self.tables.write();
        let base = tables.currencies.get(&rate.pair.base).cloned();
        let target = tables.currencies.get(&rate.pair.target).cloned();
        let (Some(base), Some(target)) = (base, target) else {
            return Err(StorageError::MissingReference(format!(
                "currency for pair {}",
                rate.pair
            )));
        };
        if tables.rates.contains_key(&rate.pair) {
            return Err(StorageError::UniqueViolation(format!("pair {}", rate.pair)));
        }

        let stored = ExchangeRate {
            id: rate.id,
            base,
            target,
            rate: rate.rate,
        };
        tables.rates.insert(rate.pair, stored.clone());
        Ok(stored)
    }

    async fn update_rate(
        &self,
        pair: &CurrencyPair,
        rate: Decimal,
    ) -> StorageResult<Option<ExchangeRate>> {
        let mut tables = self.tables.write();
        Ok(tables.rates.get_mut(pair).map(|stored| {
            stored.rate = rate;
            stored.clone()
        }))
    }
}
