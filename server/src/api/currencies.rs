use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use currex_fx::{CurrencyRequest, CurrencyView};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct CurrencyForm {
    code: Option<String>,
    name: Option<String>,
    sign: Option<String>,
}

async fn list_currencies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CurrencyView>>> {
    let currencies = state.engine.list_currencies().await?;
    Ok(Json(currencies.into_iter().map(CurrencyView::from).collect()))
}

async fn create_currency(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CurrencyForm>, FormRejection>,
) -> ApiResult<(StatusCode, Json<CurrencyView>)> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state
        .engine
        .create_currency(CurrencyRequest {
            code: form.code.as_deref(),
            name: form.name.as_deref(),
            sign: form.sign.as_deref(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_currency(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CurrencyView>> {
    let currency = state.engine.get_currency(Some(&code)).await?;
    Ok(Json(currency.into()))
}

/// `/currency/` without a code.
async fn get_currency_without_code(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CurrencyView>> {
    let currency = state.engine.get_currency(None).await?;
    Ok(Json(currency.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/currencies", get(list_currencies).post(create_currency))
        .route("/currency", get(get_currency_without_code))
        .route("/currency/", get(get_currency_without_code))
        .route("/currency/{code}", get(get_currency))
}
