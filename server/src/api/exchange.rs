use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use currex_fx::{ExchangeRequest, ExchangeView};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct ExchangeParams {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

async fn exchange(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ExchangeParams>, QueryRejection>,
) -> ApiResult<Json<ExchangeView>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let conversion = state
        .engine
        .resolve(ExchangeRequest {
            base: params.from.as_deref(),
            target: params.to.as_deref(),
            amount: params.amount.as_deref(),
        })
        .await
        .map_err(ApiError::exchange)?;
    Ok(Json(conversion.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/exchange", get(exchange))
}
