//! HTTP routes.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::state::AppState;

pub mod currencies;
pub mod exchange;
pub mod health;
pub mod rates;

fn cors_layer(config: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = config
        .cors_allow_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(cors.allow_origin(origins))
}

/// Build the application router.
pub fn app_router(state: Arc<AppState>, config: &ServerConfig) -> anyhow::Result<Router> {
    let cors = cors_layer(config)?;

    Ok(Router::new()
        .merge(health::router())
        .merge(currencies::router())
        .merge(rates::router())
        .merge(exchange::router())
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http()))
}
