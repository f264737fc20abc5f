//! Currex Server
//!
//! HTTP API over the FX engine: currency registry, quoted exchange rates and
//! amount conversion.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use api::app_router;
pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::{build_state, AppState};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
