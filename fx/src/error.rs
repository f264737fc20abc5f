//! FX engine error types.

use currex_common::{CurrencyCode, CurrencyPair, StorageError};
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// Structurally malformed code, amount or rate.
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationErrors),

    /// Referenced currency is not registered.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(CurrencyCode),

    /// No direct, inverse or pivot rate exists for the pair.
    #[error("Rate not found for {0}")]
    RateNotFound(CurrencyPair),

    /// A currency with this code is already registered.
    #[error("Currency already exists: {0}")]
    CurrencyAlreadyExists(CurrencyCode),

    /// The ordered pair already has a quoted rate.
    #[error("Rate already exists for {0}")]
    RateAlreadyExists(CurrencyPair),

    /// Converted amount does not fit the decimal representation exactly.
    #[error("Converted amount for {0} exceeds the supported range or precision")]
    AmountOverflow(CurrencyPair),

    /// Backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Coarse classification of [`FxError`] used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    CurrencyNotFound,
    RateNotFound,
    AlreadyExists,
    StorageFault,
}

impl FxError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FxError::InvalidInput(_) | FxError::AmountOverflow(_) => ErrorKind::InvalidInput,
            FxError::CurrencyNotFound(_) => ErrorKind::CurrencyNotFound,
            FxError::RateNotFound(_) => ErrorKind::RateNotFound,
            FxError::CurrencyAlreadyExists(_) | FxError::RateAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            FxError::Storage(_) => ErrorKind::StorageFault,
        }
    }

    /// Get a stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::InvalidInput(_) => "INVALID_INPUT",
            FxError::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            FxError::RateNotFound(_) => "RATE_NOT_FOUND",
            FxError::CurrencyAlreadyExists(_) => "CURRENCY_ALREADY_EXISTS",
            FxError::RateAlreadyExists(_) => "RATE_ALREADY_EXISTS",
            FxError::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            FxError::Storage(e) => e.error_code(),
        }
    }

    /// Whether this error is a system fault rather than a business outcome.
    pub fn is_system_fault(&self) -> bool {
        self.kind() == ErrorKind::StorageFault
    }
}

impl From<ValidationErrors> for FxError {
    fn from(errors: ValidationErrors) -> Self {
        FxError::InvalidInput(errors)
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> CurrencyPair {
        CurrencyPair::new(CurrencyCode::usd(), "EUR".parse().unwrap())
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            FxError::RateNotFound(pair()).kind(),
            ErrorKind::RateNotFound
        );
        assert_eq!(
            FxError::RateAlreadyExists(pair()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            FxError::CurrencyAlreadyExists(CurrencyCode::usd()).kind(),
            ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_only_storage_is_system_fault() {
        let storage = FxError::Storage(StorageError::Database("connection reset".into()));
        assert!(storage.is_system_fault());
        assert_eq!(storage.error_code(), "DATABASE_ERROR");

        assert!(!FxError::CurrencyNotFound(CurrencyCode::usd()).is_system_fault());
    }
}
