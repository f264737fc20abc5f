//! Currex Common Types
//!
//! Shared types used across the currex workspace: entity identifiers,
//! currency codes, currencies, quoted exchange rates and storage errors.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
