//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use currex_fx::FxError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Fx(#[from] FxError),
    /// Failure of a conversion request; a missing rate reads differently.
    #[error("{0}")]
    Exchange(FxError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Wrap an engine error raised while converting an amount.
    pub fn exchange(err: FxError) -> Self {
        ApiError::Exchange(err)
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Exchange(FxError::RateNotFound(pair)) => (
                StatusCode::NOT_FOUND,
                format!(
                    "Unable to exchange currencies '{}' to '{}': no exchange rate found",
                    pair.base, pair.target
                ),
            ),
            ApiError::Fx(err) | ApiError::Exchange(err) => fx_response(err),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        }
    }
}

fn fx_response(err: &FxError) -> (StatusCode, String) {
    match err {
        FxError::InvalidInput(errors) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid request: {}", errors),
        ),
        FxError::CurrencyNotFound(code) => (
            StatusCode::NOT_FOUND,
            format!("Currency with code '{}' not found", code),
        ),
        FxError::RateNotFound(pair) => (
            StatusCode::NOT_FOUND,
            format!(
                "Exchange rate for currency pair ('{}', '{}') not found",
                pair.base, pair.target
            ),
        ),
        FxError::CurrencyAlreadyExists(code) => (
            StatusCode::CONFLICT,
            format!("Currency with code '{}' already exists", code),
        ),
        FxError::RateAlreadyExists(pair) => (
            StatusCode::CONFLICT,
            format!(
                "Exchange rate for currency pair ('{}', '{}') already exists",
                pair.base, pair.target
            ),
        ),
        FxError::AmountOverflow(pair) => (
            StatusCode::BAD_REQUEST,
            format!(
                "Converted amount for {} exceeds the supported range or precision",
                pair
            ),
        ),
        FxError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error".to_string(),
        ),
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            ApiError::Fx(err) | ApiError::Exchange(err) if err.is_system_fault() => {
                error!(error = %err, code = err.error_code(), "Request failed");
            }
            ApiError::Fx(err) | ApiError::Exchange(err) => {
                debug!(code = err.error_code(), status = status.as_u16(), "Request rejected");
            }
            ApiError::BadRequest(reason) => {
                debug!(reason = %reason, "Malformed request");
            }
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use currex_common::{CurrencyCode, CurrencyPair, StorageError};

    fn pair() -> CurrencyPair {
        CurrencyPair::new(
            CurrencyCode::parse("EUR").unwrap(),
            CurrencyCode::parse("GBP").unwrap(),
        )
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FxError::RateNotFound(pair()), StatusCode::NOT_FOUND),
            (FxError::RateAlreadyExists(pair()), StatusCode::CONFLICT),
            (
                FxError::CurrencyNotFound(CurrencyCode::usd()),
                StatusCode::NOT_FOUND,
            ),
            (
                FxError::Storage(StorageError::Database("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_and_message().0, status);
        }
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err = ApiError::from(FxError::Storage(StorageError::Database(
            "password authentication failed".into(),
        )));

        assert_eq!(err.status_and_message().1, "Database error");
    }

    #[test]
    fn test_exchange_rate_not_found_message() {
        let (status, message) = ApiError::exchange(FxError::RateNotFound(pair())).status_and_message();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(message.starts_with("Unable to exchange currencies 'EUR' to 'GBP'"));
    }
}
