//! Relay backlog view and manual sweep trigger.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sift_core::{ContentRecord, Outcome, RelayLedgerEntry};
use sift_relay::RelayError;
use tracing::instrument;

use crate::server::AppState;

use super::{bad_request, core_error_response, ErrorDetail, ErrorResponse};

/// Query parameters for the backlog view.
#[derive(Debug, Deserialize)]
pub struct BacklogQuery {
    /// Outcome to filter by. Defaults to approved.
    pub outcome: Option<String>,

    /// Maximum rows returned. Defaults to 100.
    pub limit: Option<i64>,
}

/// One backlog row: the obligation plus the content it concerns.
#[derive(Debug, Serialize)]
pub struct BacklogRow {
    /// The unsent obligation.
    pub entry: RelayLedgerEntry,
    /// Content snapshot from its resolved partition.
    pub content: ContentRecord,
}

/// Lists unsent obligations with their content joined, oldest first.
///
/// Feeds display and manual-retry tooling.
#[instrument(name = "http_relay_backlog", skip(state))]
pub async fn backlog(State(state): State<AppState>, Query(query): Query<BacklogQuery>) -> Response {
    let outcome: Outcome = match query.outcome.as_deref().unwrap_or("approved").parse() {
        Ok(outcome) => outcome,
        Err(message) => return bad_request(message),
    };
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    match state.storage.relay_ledger.pending_with_content(outcome, limit).await {
        Ok(items) => {
            let rows: Vec<BacklogRow> = items
                .into_iter()
                .map(|item| BacklogRow { entry: item.entry, content: item.content })
                .collect();
            Json(rows).into_response()
        },
        Err(err) => core_error_response(&err),
    }
}

/// Runs one dispatch pass immediately.
///
/// Safe to trigger while the background sweeper is active; completion is
/// idempotent and delivery is at-least-once.
#[instrument(name = "http_relay_sweep", skip_all)]
pub async fn sweep(State(state): State<AppState>) -> Response {
    match state.dispatcher.sweep().await {
        Ok(stats) => Json(stats).into_response(),
        Err(RelayError::Store(err)) => core_error_response(&err),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: ErrorDetail {
                    code: "relay_failure".to_string(),
                    message: err.to_string(),
                    applied: None,
                },
            }),
        )
            .into_response(),
    }
}
