//! Quoting, updating and looking up exchange rates.

use currex_common::{CurrencyPair, ExchangeRate, NewExchangeRate, StorageError};
use tracing::{info, instrument, warn};

use crate::engine::FxEngine;
use crate::error::{FxError, FxResult};
use crate::validation::{validate_pair, RateRequest};

impl FxEngine {
    /// Look up the rate quoted for exactly this ordered pair.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, base: Option<&str>, target: Option<&str>) -> FxResult<ExchangeRate> {
        let pair = validate_pair(base, target)?;
        self.rates
            .find_rate(&pair)
            .await?
            .ok_or(FxError::RateNotFound(pair))
    }

    /// All quoted rates.
    pub async fn list_rates(&self) -> FxResult<Vec<ExchangeRate>> {
        Ok(self.rates.list_rates().await?)
    }

    /// Quote a rate for a pair that has none yet.
    #[instrument(skip(self, request), fields(base = ?request.base, target = ?request.target))]
    pub async fn create_rate(&self, request: RateRequest<'_>) -> FxResult<ExchangeRate> {
        let submission = request.validate()?;
        self.ensure_registered(&submission.pair).await?;

        let pair = submission.pair.clone();
        let saved = match self
            .rates
            .save_rate(NewExchangeRate::new(submission.pair, submission.rate))
            .await
        {
            Ok(saved) => saved,
            Err(StorageError::UniqueViolation(_)) => return Err(FxError::RateAlreadyExists(pair)),
            Err(StorageError::MissingReference(detail)) => {
                warn!(pair = %pair, detail = %detail, "Currency vanished before rate was saved");
                // Name whichever currency is gone now; base if it reappeared.
                self.ensure_registered(&pair).await?;
                return Err(FxError::CurrencyNotFound(pair.base));
            }
            Err(other) => return Err(FxError::Storage(other)),
        };

        info!(rate_id = %saved.id, pair = %pair, rate = %saved.rate, "Rate quoted");
        Ok(saved)
    }

    /// Replace the rate of an existing quote.
    #[instrument(skip(self, request), fields(base = ?request.base, target = ?request.target))]
    pub async fn update_rate(&self, request: RateRequest<'_>) -> FxResult<ExchangeRate> {
        let submission = request.validate()?;
        self.ensure_registered(&submission.pair).await?;

        let updated = self
            .rates
            .update_rate(&submission.pair, submission.rate)
            .await?
            .ok_or_else(|| FxError::RateNotFound(submission.pair.clone()))?;

        info!(rate_id = %updated.id, pair = %submission.pair, rate = %updated.rate, "Rate updated");
        Ok(updated)
    }

    /// Fail with `CurrencyNotFound` naming the first unregistered code of `pair`.
    async fn ensure_registered(&self, pair: &CurrencyPair) -> FxResult<()> {
        for code in [&pair.base, &pair.target] {
            if self.currencies.find_currency_by_code(code).await?.is_none() {
                return Err(FxError::CurrencyNotFound(code.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FxEngineConfig;
    use crate::store::{CurrencyStore, ExchangeRateStore, InMemoryStore};
    use async_trait::async_trait;
    use currex_common::{Currency, CurrencyCode, StorageResult};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn engine() -> FxEngine {
        let store = Arc::new(InMemoryStore::new());
        for (code, name, sign) in [("USD", "US Dollar", "$"), ("EUR", "Euro", "€")] {
            store
                .save_currency(Currency::new(code.parse().unwrap(), name, sign))
                .await
                .unwrap();
        }
        FxEngine::new(store.clone(), store, FxEngineConfig::default())
    }

    fn quote<'a>(base: &'a str, target: &'a str, rate: &'a str) -> RateRequest<'a> {
        RateRequest {
            base: Some(base),
            target: Some(target),
            rate: Some(rate),
        }
    }

    #[tokio::test]
    async fn test_create_rate() {
        let engine = engine().await;

        let created = engine.create_rate(quote("usd", "eur", "0.92")).await.unwrap();

        assert_eq!(created.base.code.as_str(), "USD");
        assert_eq!(created.target.code.as_str(), "EUR");
        assert_eq!(created.rate, dec!(0.92));
        assert_eq!(
            engine.get_rate(Some("USD"), Some("EUR")).await.unwrap(),
            created
        );
    }

    #[tokio::test]
    async fn test_create_rate_twice() {
        let engine = engine().await;
        engine.create_rate(quote("USD", "EUR", "0.92")).await.unwrap();

        let result = engine.create_rate(quote("USD", "EUR", "0.92")).await;

        assert!(matches!(result, Err(FxError::RateAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_rate_with_short_code() {
        let engine = engine().await;

        let result = engine.create_rate(quote("EU", "USD", "1.1")).await;

        assert!(matches!(result, Err(FxError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_create_rate_unknown_currency() {
        let engine = engine().await;

        let result = engine.create_rate(quote("USD", "JPY", "150")).await;

        match result {
            Err(FxError::CurrencyNotFound(code)) => assert_eq!(code.as_str(), "JPY"),
            other => panic!("expected CurrencyNotFound, got {other:?}"),
        }
    }

    /// Registry whose `gone` currency is found only by the first lookup.
    struct VanishingCurrency {
        inner: InMemoryStore,
        gone: CurrencyCode,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CurrencyStore for VanishingCurrency {
        async fn find_currency_by_code(
            &self,
            code: &CurrencyCode,
        ) -> StorageResult<Option<Currency>> {
            if *code == self.gone && self.lookups.fetch_add(1, Ordering::SeqCst) > 0 {
                return Ok(None);
            }
            self.inner.find_currency_by_code(code).await
        }

        async fn list_currencies(&self) -> StorageResult<Vec<Currency>> {
            self.inner.list_currencies().await
        }

        async fn save_currency(&self, currency: Currency) -> StorageResult<Currency> {
            self.inner.save_currency(currency).await
        }
    }

    #[tokio::test]
    async fn test_vanished_target_is_named() {
        let registry = InMemoryStore::new();
        let rates = Arc::new(InMemoryStore::new());
        for code in ["USD", "EUR"] {
            registry
                .save_currency(Currency::new(code.parse().unwrap(), code, code))
                .await
                .unwrap();
        }
        rates
            .save_currency(Currency::new("USD".parse().unwrap(), "USD", "$"))
            .await
            .unwrap();
        let currencies = Arc::new(VanishingCurrency {
            inner: registry,
            gone: "EUR".parse().unwrap(),
            lookups: AtomicUsize::new(0),
        });
        let engine = FxEngine::new(currencies, rates.clone(), FxEngineConfig::default());

        let result = engine.create_rate(quote("USD", "EUR", "0.92")).await;

        match result {
            Err(FxError::CurrencyNotFound(code)) => assert_eq!(code.as_str(), "EUR"),
            other => panic!("expected EUR to be reported missing, got {other:?}"),
        }
        assert!(rates.list_rates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rate() {
        let engine = engine().await;
        let created = engine.create_rate(quote("USD", "EUR", "0.92")).await.unwrap();

        let updated = engine.update_rate(quote("USD", "EUR", "0.95")).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.rate, dec!(0.95));
        assert_eq!(engine.list_rates().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_update_rate_errors() {
        let engine = engine().await;

        let unknown = engine.update_rate(quote("USD", "GBP", "0.78")).await;
        assert!(matches!(unknown, Err(FxError::CurrencyNotFound(_))));

        let never_quoted = engine.update_rate(quote("USD", "EUR", "0.95")).await;
        assert!(matches!(never_quoted, Err(FxError::RateNotFound(_))));

        let invalid = engine.update_rate(quote("USD", "EUR", "0")).await;
        assert!(matches!(invalid, Err(FxError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_get_rate_does_not_invert() {
        let engine = engine().await;
        engine.create_rate(quote("USD", "EUR", "0.92")).await.unwrap();

        let result = engine.get_rate(Some("EUR"), Some("USD")).await;

        match result {
            Err(FxError::RateNotFound(pair)) => {
                assert_eq!(pair.base, "EUR".parse::<CurrencyCode>().unwrap());
            }
            other => panic!("expected RateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let engine = engine().await;
        engine.create_rate(quote("USD", "EUR", "0.92")).await.unwrap();

        assert_eq!(
            engine.list_rates().await.unwrap(),
            engine.list_rates().await.unwrap()
        );
        assert_eq!(
            engine.get_rate(Some("USD"), Some("EUR")).await.unwrap(),
            engine.get_rate(Some("USD"), Some("EUR")).await.unwrap()
        );
    }
}
