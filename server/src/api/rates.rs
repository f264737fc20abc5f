use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use currex_fx::{ExchangeRateView, RateRequest};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewRateForm {
    base_currency_code: Option<String>,
    target_currency_code: Option<String>,
    rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RateUpdateForm {
    rate: Option<String>,
}

/// Split a concatenated `BASETARGET` segment into its two codes. Anything
/// other than six characters yields no codes at all.
pub(crate) fn split_pair(segment: &str) -> (Option<&str>, Option<&str>) {
    if segment.chars().count() != 6 {
        return (None, None);
    }
    match segment.char_indices().nth(3) {
        Some((mid, _)) => {
            let (base, target) = segment.split_at(mid);
            (Some(base), Some(target))
        }
        None => (None, None),
    }
}

async fn list_rates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ExchangeRateView>>> {
    let rates = state.engine.list_rates().await?;
    Ok(Json(rates.into_iter().map(ExchangeRateView::from).collect()))
}

async fn create_rate(
    State(state): State<Arc<AppState>>,
    form: Result<Form<NewRateForm>, FormRejection>,
) -> ApiResult<(StatusCode, Json<ExchangeRateView>)> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state
        .engine
        .create_rate(RateRequest {
            base: form.base_currency_code.as_deref(),
            target: form.target_currency_code.as_deref(),
            rate: form.rate.as_deref(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_rate(
    Path(pair): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExchangeRateView>> {
    let (base, target) = split_pair(&pair);
    let rate = state.engine.get_rate(base, target).await?;
    Ok(Json(rate.into()))
}

/// `/exchangeRate/` without a pair.
async fn get_rate_without_pair(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExchangeRateView>> {
    let rate = state.engine.get_rate(None, None).await?;
    Ok(Json(rate.into()))
}

async fn update_rate(
    Path(pair): Path<String>,
    State(state): State<Arc<AppState>>,
    form: Result<Form<RateUpdateForm>, FormRejection>,
) -> ApiResult<Json<ExchangeRateView>> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (base, target) = split_pair(&pair);
    let updated = state
        .engine
        .update_rate(RateRequest {
            base,
            target,
            rate: form.rate.as_deref(),
        })
        .await?;
    Ok(Json(updated.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exchangeRates", get(list_rates).post(create_rate))
        .route("/exchangeRate", get(get_rate_without_pair))
        .route("/exchangeRate/", get(get_rate_without_pair))
        .route("/exchangeRate/{pair}", get(get_rate).patch(update_rate))
}
