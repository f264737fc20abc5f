//! Currency registration and lookup.

use currex_common::{Currency, StorageError};
use tracing::{info, instrument};

use crate::engine::FxEngine;
use crate::error::{FxError, FxResult};
use crate::validation::{validate_code, CurrencyRequest};

impl FxEngine {
    /// Look up a single currency by code.
    #[instrument(skip(self))]
    pub async fn get_currency(&self, code: Option<&str>) -> FxResult<Currency> {
        let code = validate_code(code)?;
        self.currencies
            .find_currency_by_code(&code)
            .await?
            .ok_or(FxError::CurrencyNotFound(code))
    }

    /// All registered currencies.
    pub async fn list_currencies(&self) -> FxResult<Vec<Currency>> {
        Ok(self.currencies.list_currencies().await?)
    }

    /// Register a new currency.
    #[instrument(skip(self, request), fields(code = ?request.code))]
    pub async fn create_currency(&self, request: CurrencyRequest<'_>) -> FxResult<Currency> {
        let registration = request.validate()?;
        let code = registration.code.clone();
        let currency = Currency::new(registration.code, registration.name, registration.sign);

        let saved = self
            .currencies
            .save_currency(currency)
            .await
            .map_err(|e| match e {
                StorageError::UniqueViolation(_) => FxError::CurrencyAlreadyExists(code),
                other => FxError::Storage(other),
            })?;

        info!(currency_id = %saved.id, code = %saved.code, "Currency registered");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FxEngineConfig;
    use crate::store::InMemoryStore;
    use crate::validation::{Field, Violation};
    use std::sync::Arc;

    fn engine() -> FxEngine {
        let store = Arc::new(InMemoryStore::new());
        FxEngine::new(store.clone(), store, FxEngineConfig::default())
    }

    fn euro() -> CurrencyRequest<'static> {
        CurrencyRequest {
            code: Some("eur"),
            name: Some("Euro"),
            sign: Some("€"),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_currency() {
        let engine = engine();

        let created = engine.create_currency(euro()).await.unwrap();
        let fetched = engine.get_currency(Some("EUR")).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.code.as_str(), "EUR");
        assert_eq!(fetched.full_name, "Euro");
        assert_eq!(fetched.sign, "€");
    }

    #[tokio::test]
    async fn test_duplicate_currency() {
        let engine = engine();
        engine.create_currency(euro()).await.unwrap();

        let result = engine.create_currency(euro()).await;

        assert!(matches!(result, Err(FxError::CurrencyAlreadyExists(c)) if c.as_str() == "EUR"));
    }

    #[tokio::test]
    async fn test_unknown_currency() {
        let result = engine().get_currency(Some("XYZ")).await;

        assert!(matches!(result, Err(FxError::CurrencyNotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_code_is_invalid_input() {
        let result = engine().get_currency(Some("EURO")).await;

        match result {
            Err(FxError::InvalidInput(errors)) => assert!(errors.contains(
                Field::Code,
                &Violation::InvalidLength {
                    expected: 3,
                    actual: 4
                }
            )),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_listing_is_idempotent() {
        let engine = engine();
        assert!(engine.list_currencies().await.unwrap().is_empty());

        engine.create_currency(euro()).await.unwrap();

        let first = engine.list_currencies().await.unwrap();
        let second = engine.list_currencies().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }
}
