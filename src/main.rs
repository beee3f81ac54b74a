//! Sift content moderation service.
//!
//! Main entry point: initializes logging, opens the database, and runs the
//! HTTP server alongside the background relay sweeper until shutdown.

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use sift_api::Config;
use sift_core::{storage, SystemClock};
use sift_relay::Sweeper;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("starting sift moderation service");

    let config = Config::load()?;
    info!(
        database_url = %config.database_url,
        host = %config.host,
        port = config.port,
        sweep_interval_secs = config.sweep_interval_secs,
        "configuration loaded"
    );

    let pool = create_database_pool(&config).await?;
    storage::migrate(&pool).await.context("database migration failed")?;
    info!("database ready");

    let state = sift_api::build_state(
        sift_core::Storage::new(pool.clone()),
        Arc::new(SystemClock::new()),
        config.to_dispatcher_config(),
    )?;

    let cancellation_token = CancellationToken::new();

    let sweeper = Sweeper::new(
        state.dispatcher.clone(),
        config.sweep_interval(),
        cancellation_token.clone(),
    );
    let sweeper_handle = tokio::spawn(sweeper.run());

    let server_handle = tokio::spawn({
        let state = state.clone();
        let addr = config.parse_server_addr()?;
        let token = cancellation_token.clone();
        async move { sift_api::serve(state, addr, token).await }
    });

    shutdown_signal().await;
    info!("shutdown signal received, stopping");

    cancellation_token.cancel();

    let _ = tokio::time::timeout(Duration::from_secs(10), async {
        let _ = sweeper_handle.await;
        let _ = server_handle.await;
    })
    .await;

    pool.close().await;
    info!("shutdown complete");

    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,sift=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database pool with bounded timeouts.
///
/// Every store operation inherits the acquire timeout, so an unreachable
/// database surfaces as an error rather than a hang.
async fn create_database_pool(config: &Config) -> Result<sqlx::SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("invalid DATABASE_URL")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.database_busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect_with(options)
        .await
        .context("failed to open database")?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("failed to verify database connection")?;

    Ok(pool)
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received CTRL+C signal");
        },
        _ = terminate => {
            info!("received SIGTERM signal");
        },
    }
}
