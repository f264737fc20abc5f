//! Currex FX Engine
//!
//! Currency registry and exchange rate resolution.
//!
//! # Features
//!
//! - Input validation that reports every defect of a request
//! - Rate resolution: direct quote, inverted quote, or composition through a
//!   configurable pivot currency
//! - Currency registration and rate quoting over pluggable stores
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use currex_fx::{ExchangeRequest, FxEngine, FxEngineConfig, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let engine = FxEngine::new(store.clone(), store, FxEngineConfig::default());
//!
//! let conversion = engine
//!     .resolve(ExchangeRequest { base: Some("EUR"), target: Some("USD"), amount: Some("100") })
//!     .await?;
//! ```

pub mod engine;
pub mod store;
pub mod conversion;
pub mod validation;
pub mod view;
pub mod error;

mod currencies;
mod rates;

pub use engine::{FxEngine, FxEngineConfig};
pub use store::{CurrencyStore, ExchangeRateStore, InMemoryStore};
pub use conversion::{Conversion, RateSource, ResolvedRate};
pub use validation::{
    CurrencyRequest, ExchangeRequest, RateRequest, ValidationError, ValidationErrors,
};
pub use view::{CurrencyView, ExchangeRateView, ExchangeView};
pub use error::{ErrorKind, FxError, FxResult};
