//! Bulk ingestion handlers: push payloads and spreadsheet sync.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use sift_ingest::{PushPayload, SheetBatch};
use tracing::instrument;

use crate::server::AppState;

use super::core_error_response;

/// Ingests a pushed batch of content items.
///
/// Accepts a single JSON object or an array; each item is upserted into the
/// pending partition by id when one is supplied. Items targeting resolved
/// ids are skipped, never reverted.
#[instrument(name = "http_ingest_push", skip_all)]
pub async fn push(State(state): State<AppState>, Json(payload): Json<PushPayload>) -> Response {
    match state.ingest.apply_push(payload).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => core_error_response(&err),
    }
}

/// Runs a spreadsheet snapshot sync.
///
/// The caller posts the raw tab values; the pending partition is cleared
/// and rebuilt from the evaluation rows using the configured column
/// mapping. Resolved partitions are never touched.
#[instrument(name = "http_ingest_sync", skip_all)]
pub async fn sync(State(state): State<AppState>, Json(batch): Json<SheetBatch>) -> Response {
    match state.ingest.sync_spreadsheet(&batch).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => core_error_response(&err),
    }
}
