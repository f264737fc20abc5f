//! Storage error types shared by every store implementation.

use thiserror::Error;

/// Failure reported by a currency or exchange rate store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The write referenced an entity that does not exist.
    #[error("Missing referenced entity: {0}")]
    MissingReference(String),

    /// Any other database failure (connectivity, corruption, bad data).
    #[error("Database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Get error code for logs and API payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::UniqueViolation(_) => "UNIQUE_VIOLATION",
            StorageError::MissingReference(_) => "MISSING_REFERENCE",
            StorageError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Result type alias for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
