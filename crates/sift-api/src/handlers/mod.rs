//! HTTP request handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sift_core::CoreError;

pub mod content;
pub mod endpoints;
pub mod health;
pub mod ingest;
pub mod moderate;
pub mod relay;

/// Error response body with a stable code and a human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable error description.
    pub message: String,
    /// Rows applied before a partial batch failure, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
}

/// Maps a core error onto an HTTP response.
pub(crate) fn core_error_response(error: &CoreError) -> Response {
    let (status, code) = match error {
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        CoreError::AlreadyResolved(_) => (StatusCode::CONFLICT, "already_resolved"),
        CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        CoreError::BatchPartialFailure { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "batch_partial_failure")
        },
        CoreError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
    };

    let applied = match error {
        CoreError::BatchPartialFailure { applied, .. } => Some(*applied),
        _ => None,
    };

    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail { code: code.to_string(), message: error.to_string(), applied },
        }),
    )
        .into_response()
}

/// Maps a bad request with a plain message.
pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: ErrorDetail {
                code: "invalid_input".to_string(),
                message: message.into(),
                applied: None,
            },
        }),
    )
        .into_response()
}
