//! Currex Storage
//!
//! PostgreSQL persistence for registered currencies and quoted exchange
//! rates. Constraint failures surface as typed [`StorageError`] variants so
//! the FX engine can tell a duplicate from a missing reference.
//!
//! [`StorageError`]: currex_common::StorageError

pub mod error;
pub mod pg;

pub use error::{classify_sqlstate, map_sqlx_error, SqlStateClass};
pub use pg::PgStore;
