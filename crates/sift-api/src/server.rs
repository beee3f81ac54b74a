//! Router assembly and server lifecycle.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use sift_core::{Clock, Storage};
use sift_ingest::IngestionAdapter;
use sift_moderation::ModerationEngine;
use sift_relay::{Dispatcher, DispatcherConfig};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage layer, for read paths.
    pub storage: Storage,

    /// Ingestion adapter.
    pub ingest: IngestionAdapter,

    /// Moderation engine.
    pub engine: ModerationEngine,

    /// Relay dispatcher, shared with the background sweeper.
    pub dispatcher: Arc<Dispatcher>,
}

/// Wires the application state from its parts.
///
/// # Errors
///
/// Returns an error if the relay HTTP client cannot be built.
pub fn build_state(
    storage: Storage,
    clock: Arc<dyn Clock>,
    dispatcher_config: DispatcherConfig,
) -> Result<AppState> {
    let dispatcher = Arc::new(
        Dispatcher::new(storage.clone(), dispatcher_config, clock.clone())
            .context("failed to build relay dispatcher")?,
    );

    Ok(AppState {
        ingest: IngestionAdapter::new(storage.clone(), clock.clone()),
        engine: ModerationEngine::new(storage.clone(), clock),
        storage,
        dispatcher,
    })
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest/push", post(handlers::ingest::push))
        .route("/ingest/sync", post(handlers::ingest::sync))
        .route("/content/:partition", get(handlers::content::list))
        .route("/content/:id/approve", post(handlers::moderate::approve))
        .route("/content/:id/reject", post(handlers::moderate::reject))
        .route("/relay/backlog", get(handlers::relay::backlog))
        .route("/relay/sweep", post(handlers::relay::sweep))
        .route("/endpoints", get(handlers::endpoints::list))
        .route("/endpoints/:channel", put(handlers::endpoints::upsert))
        .route("/health/live", get(handlers::health::live))
        .route("/health/ready", get(handlers::health::ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router until the cancellation token fires.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let listener =
        tokio::net::TcpListener::bind(addr).await.context("failed to bind server address")?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await
        .context("server error")?;

    Ok(())
}
