//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use currex_fx::{CurrencyStore, ExchangeRateStore, FxEngine, InMemoryStore};
use currex_storage::PgStore;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// State handed to every request handler.
pub struct AppState {
    pub engine: Arc<FxEngine>,
}

impl AppState {
    pub fn new(engine: Arc<FxEngine>) -> Self {
        Self { engine }
    }
}

/// Build the engine over PostgreSQL when a database URL is configured, or
/// over process memory otherwise.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let fx_config = config.fx_config().map_err(anyhow::Error::msg)?;

    let (currencies, rates): (Arc<dyn CurrencyStore>, Arc<dyn ExchangeRateStore>) =
        match &config.database.url {
            Some(url) => {
                let store = PgStore::connect(url, config.database.max_connections)
                    .await
                    .context("Failed to connect to the database")?;
                store
                    .migrate()
                    .await
                    .context("Failed to apply database migrations")?;
                let store = Arc::new(store);
                (store.clone(), store)
            }
            None => {
                warn!("DATABASE_URL not set; data will be kept in memory only");
                let store = Arc::new(InMemoryStore::new());
                (store.clone(), store)
            }
        };

    info!(pivot = %fx_config.pivot_currency, "FX engine ready");
    let engine = FxEngine::new(currencies, rates, fx_config);
    Ok(Arc::new(AppState::new(Arc::new(engine))))
}
