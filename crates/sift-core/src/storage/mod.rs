//! Storage layer implementing the repository pattern over SQLite.
//!
//! Repositories are the anti-corruption layer between domain models and the
//! database schema. All SQL lives here; the moderation engine and ingestion
//! adapter compose repository calls, never raw queries.
//!
//! Partitioning is structural: each moderation state is its own table, so a
//! record's partition is the table holding it. The conditional
//! delete-and-return primitive in [`content::Repository::take_pending_in_tx`]
//! is what makes concurrent approve/reject races resolve to exactly one
//! winner.

use std::sync::Arc;

use sqlx::SqlitePool;

pub mod content;
pub mod endpoints;
pub mod mappings;
pub mod relay_ledger;

use crate::error::Result;

/// Container for all repository instances sharing one connection pool.
#[derive(Clone)]
pub struct Storage {
    /// Partitioned content record access.
    pub content: Arc<content::Repository>,

    /// Relay obligation ledger.
    pub relay_ledger: Arc<relay_ledger::Repository>,

    /// Outbound endpoint configuration.
    pub endpoints: Arc<endpoints::Repository>,

    /// Spreadsheet column mapping configuration.
    pub mappings: Arc<mappings::Repository>,
}

impl Storage {
    /// Creates a storage instance over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);

        Self {
            content: Arc::new(content::Repository::new(pool.clone())),
            relay_ledger: Arc::new(relay_ledger::Repository::new(pool.clone())),
            endpoints: Arc::new(endpoints::Repository::new(pool.clone())),
            mappings: Arc::new(mappings::Repository::new(pool)),
        }
    }

    /// Returns the shared pool.
    pub fn pool(&self) -> SqlitePool {
        (*self.content.pool()).clone()
    }

    /// Verifies database connectivity.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StoreUnavailable` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&*self.content.pool()).await?;

        Ok(())
    }
}

/// Creates the schema if it does not exist.
///
/// Idempotent; run at startup and by the test harness. The three content
/// tables are structurally identical on purpose: partition membership is
/// which table a row lives in.
///
/// # Errors
///
/// Returns `CoreError::StoreUnavailable` if any statement fails.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for partition in crate::models::Partition::ALL {
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {} (
                id BLOB PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                image_ref TEXT,
                category TEXT NOT NULL,
                kind TEXT NOT NULL,
                source_ref TEXT,
                created_at TEXT NOT NULL
            )
            ",
            partition.table()
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS relay_ledger (
            id BLOB PRIMARY KEY,
            content_id BLOB NOT NULL,
            outcome TEXT NOT NULL,
            created_at TEXT NOT NULL,
            sent_at TEXT
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE INDEX IF NOT EXISTS idx_relay_ledger_unsent
        ON relay_ledger(outcome, created_at)
        WHERE sent_at IS NULL
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS relay_endpoints (
            channel TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS column_mappings (
            letter TEXT PRIMARY KEY,
            field TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}
