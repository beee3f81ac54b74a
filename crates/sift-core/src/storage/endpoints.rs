//! Repository for outbound webhook endpoint configuration.
//!
//! Read-mostly from the core's perspective: the dispatcher looks up the
//! enabled endpoint for a channel on every pass, so a flip of the `enabled`
//! flag takes effect on the next sweep without touching the backlog.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    error::Result,
    models::{RelayChannel, RelayEndpoint},
};

/// Repository for relay endpoint database operations.
pub struct Repository {
    pool: Arc<SqlitePool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Finds the endpoint registered for a channel, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn find(&self, channel: &RelayChannel) -> Result<Option<RelayEndpoint>> {
        let endpoint = sqlx::query_as::<_, RelayEndpoint>(
            "SELECT channel, url, enabled FROM relay_endpoints WHERE channel = ?1",
        )
        .bind(channel)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(endpoint)
    }

    /// Finds the enabled endpoint for a channel, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn find_enabled(&self, channel: &RelayChannel) -> Result<Option<RelayEndpoint>> {
        let endpoint = sqlx::query_as::<_, RelayEndpoint>(
            "SELECT channel, url, enabled FROM relay_endpoints WHERE channel = ?1 AND enabled = 1",
        )
        .bind(channel)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(endpoint)
    }

    /// Creates or replaces the endpoint for a channel.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the upsert fails.
    pub async fn upsert(&self, endpoint: &RelayEndpoint) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO relay_endpoints (channel, url, enabled)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(channel) DO UPDATE SET url = excluded.url, enabled = excluded.enabled
            ",
        )
        .bind(&endpoint.channel)
        .bind(&endpoint.url)
        .bind(endpoint.enabled)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Lists all configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn list(&self) -> Result<Vec<RelayEndpoint>> {
        let endpoints = sqlx::query_as::<_, RelayEndpoint>(
            "SELECT channel, url, enabled FROM relay_endpoints ORDER BY channel",
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(endpoints)
    }
}
