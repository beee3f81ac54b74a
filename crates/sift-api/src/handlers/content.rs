//! Partition listing handler.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use sift_core::Partition;
use tracing::instrument;

use crate::server::AppState;

use super::{bad_request, core_error_response};

/// Lists a partition's records, newest first.
#[instrument(name = "http_list_partition", skip(state))]
pub async fn list(State(state): State<AppState>, Path(partition): Path<String>) -> Response {
    let partition: Partition = match partition.parse() {
        Ok(partition) => partition,
        Err(message) => return bad_request(message),
    };

    match state.storage.content.list(partition).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => core_error_response(&err),
    }
}
