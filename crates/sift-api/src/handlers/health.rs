//! Health probe handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::server::AppState;

/// Liveness probe: the process is up.
pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Readiness probe: the store answers queries.
pub async fn ready(State(state): State<AppState>) -> Response {
    match state.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "READY").into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT READY").into_response(),
    }
}
