//! Moderation decision handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use sift_core::ContentId;
use tracing::instrument;
use uuid::Uuid;

use crate::server::AppState;

use super::core_error_response;

/// Approves a pending record.
///
/// Returns the moved record on success. Repeats and races answer 409; the
/// decision that won stands.
#[instrument(name = "http_approve", skip(state))]
pub async fn approve(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.engine.approve(ContentId::from(id)).await {
        Ok(record) => Json(record).into_response(),
        Err(err) => core_error_response(&err),
    }
}

/// Rejects a pending record.
#[instrument(name = "http_reject", skip(state))]
pub async fn reject(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.engine.reject(ContentId::from(id)).await {
        Ok(record) => Json(record).into_response(),
        Err(err) => core_error_response(&err),
    }
}
