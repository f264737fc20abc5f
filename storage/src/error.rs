//! Translation of sqlx failures into [`StorageError`].

use currex_common::StorageError;
use tracing::error;

/// PostgreSQL `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `not_null_violation`; raised when a code subquery finds no currency.
pub const NOT_NULL_VIOLATION: &str = "23502";
/// PostgreSQL `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Category of a SQLSTATE code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlStateClass {
    Unique,
    MissingReference,
    Other,
}

/// Classify a SQLSTATE code.
pub fn classify_sqlstate(code: Option<&str>) -> SqlStateClass {
    match code {
        Some(UNIQUE_VIOLATION) => SqlStateClass::Unique,
        Some(NOT_NULL_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => SqlStateClass::MissingReference,
        _ => SqlStateClass::Other,
    }
}

/// Map a sqlx error to a storage error, logging anything that is not a
/// constraint outcome.
pub fn map_sqlx_error(err: sqlx::Error, context: &str) -> StorageError {
    let db_error = err.as_database_error();
    let code = db_error.and_then(|e| e.code());

    match classify_sqlstate(code.as_deref()) {
        SqlStateClass::Unique => StorageError::UniqueViolation(context.to_string()),
        SqlStateClass::MissingReference => StorageError::MissingReference(context.to_string()),
        SqlStateClass::Other => {
            error!(error = %err, context = %context, "Database operation failed");
            StorageError::Database(err.to_string())
        }
    }
}
