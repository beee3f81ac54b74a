//! Test infrastructure for deterministic, hermetic testing.
//!
//! Provides an in-memory database environment, fixture builders and
//! invariant checks shared by the workspace's integration tests. No test
//! touches the filesystem or network except through explicitly mocked
//! endpoints.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use anyhow::Result;
use sift_core::{storage, Storage, TestClock};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub mod fixtures;
pub mod invariants;

pub use fixtures::{ContentBuilder, EndpointBuilder};

/// Test environment with an isolated in-memory database.
///
/// Each environment owns a private SQLite instance. The pool is capped at a
/// single connection so the in-memory database lives exactly as long as the
/// environment; operations from concurrent tasks serialize on it, which is
/// enough to exercise the storage layer's conditional-move guarantees.
pub struct TestEnv {
    /// Deterministic clock for timestamp control.
    pub clock: TestClock,
    storage: Storage,
}

impl TestEnv {
    /// Creates a fresh environment with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or migration fails.
    pub async fn new() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        storage::migrate(&pool).await?;

        Ok(Self { clock: TestClock::new(), storage: Storage::new(pool) })
    }

    /// Storage layer over the test database.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Raw pool handle, for fault injection and direct assertions.
    pub fn pool(&self) -> SqlitePool {
        self.storage.pool()
    }

    /// Drops a table to simulate a mid-operation store fault.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop fails.
    pub async fn break_table(&self, table: &str) -> Result<()> {
        sqlx::query(&format!("DROP TABLE {table}")).execute(&self.pool()).await?;
        Ok(())
    }
}
