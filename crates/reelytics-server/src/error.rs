use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// An aggregation produced too few rows for the requested computation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Fetching or decoding the upstream dataset archive failed.
    #[error("dataset fetch failed: {0}")]
    DatasetFetch(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Classify an engine failure. The engine signals recoverable empty
    /// aggregations with a marker string inside an `anyhow` error; anything
    /// else is internal.
    pub fn from_engine(error: anyhow::Error) -> Self {
        let msg = error.to_string();
        if msg.contains(reelytics_engine::INSUFFICIENT_DATA_MARKER) {
            AppError::InsufficientData(
                "not enough per-user data for this computation".to_string(),
            )
        } else {
            AppError::Internal(error)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AppError::InsufficientData(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_data",
                msg.clone(),
            ),
            AppError::DatasetFetch(msg) => (StatusCode::BAD_GATEWAY, "dataset_fetch_failed", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": null
                }
            })),
        )
            .into_response()
    }
}
