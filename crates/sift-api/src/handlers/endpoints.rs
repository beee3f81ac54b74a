//! Relay endpoint configuration handlers.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sift_core::{RelayChannel, RelayEndpoint};
use tracing::instrument;

use crate::server::AppState;

use super::core_error_response;

/// Request body for endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct EndpointBody {
    /// Destination URL for the channel's notifications.
    pub url: String,

    /// Whether the dispatcher should deliver to it.
    #[serde(default)]
    pub enabled: bool,
}

/// Lists all configured endpoints.
#[instrument(name = "http_endpoints_list", skip_all)]
pub async fn list(State(state): State<AppState>) -> Response {
    match state.storage.endpoints.list().await {
        Ok(endpoints) => Json(endpoints).into_response(),
        Err(err) => core_error_response(&err),
    }
}

/// Creates or replaces the endpoint for a channel.
///
/// Disabling an endpoint stops delivery but obligations keep accruing;
/// re-enabling picks the backlog up on the next pass.
#[instrument(name = "http_endpoints_upsert", skip(state, body))]
pub async fn upsert(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(body): Json<EndpointBody>,
) -> Response {
    let endpoint = RelayEndpoint {
        channel: RelayChannel::new(channel),
        url: body.url,
        enabled: body.enabled,
    };

    match state.storage.endpoints.upsert(&endpoint).await {
        Ok(()) => Json(endpoint).into_response(),
        Err(err) => core_error_response(&err),
    }
}
