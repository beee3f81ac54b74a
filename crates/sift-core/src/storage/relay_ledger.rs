//! Repository for the relay obligation ledger.
//!
//! Append-only record of outbound notification obligations. An entry is
//! written in the same transaction as the partition move that produced it
//! and stays queryable with a null `sent_at` until a delivery is confirmed,
//! however many dispatch passes that takes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{Executor, Row, Sqlite, SqlitePool, Transaction};

use crate::{
    error::Result,
    models::{ContentId, ContentRecord, LedgerEntryId, Outcome, RelayLedgerEntry},
};

const ENTRY_COLUMNS: &str = "id, content_id, outcome, created_at, sent_at";

/// An unsent obligation joined with the content snapshot it concerns.
///
/// The snapshot comes from the partition the outcome moved the record into.
/// Entries whose content has since been deleted do not appear; the ledger
/// entry itself remains (weak reference).
#[derive(Debug, Clone)]
pub struct BacklogItem {
    /// The delivery obligation.
    pub entry: RelayLedgerEntry,

    /// Content as it exists in its resolved partition.
    pub content: ContentRecord,
}

/// Repository for relay ledger database operations.
pub struct Repository {
    pool: Arc<SqlitePool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Records a new obligation.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the insert fails.
    pub async fn record(
        &self,
        content_id: ContentId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<RelayLedgerEntry> {
        self.record_impl(&*self.pool, content_id, outcome, now).await
    }

    /// Records a new obligation within a transaction.
    ///
    /// The moderation engine uses this so the obligation commits or rolls
    /// back together with the partition move.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the insert fails.
    pub async fn record_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        content_id: ContentId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<RelayLedgerEntry> {
        self.record_impl(&mut **tx, content_id, outcome, now).await
    }

    async fn record_impl<'e, E>(
        &self,
        executor: E,
        content_id: ContentId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<RelayLedgerEntry>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let entry = RelayLedgerEntry {
            id: LedgerEntryId::new(),
            content_id,
            outcome,
            created_at: now,
            sent_at: None,
        };

        sqlx::query(&format!(
            "INSERT INTO relay_ledger ({ENTRY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, NULL)"
        ))
        .bind(entry.id)
        .bind(entry.content_id)
        .bind(entry.outcome)
        .bind(entry.created_at)
        .execute(executor)
        .await?;

        Ok(entry)
    }

    /// Finds an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn find(&self, id: LedgerEntryId) -> Result<Option<RelayLedgerEntry>> {
        let entry = sqlx::query_as::<_, RelayLedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM relay_ledger WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists all entries for a content id, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn for_content(&self, content_id: ContentId) -> Result<Vec<RelayLedgerEntry>> {
        let entries = sqlx::query_as::<_, RelayLedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM relay_ledger WHERE content_id = ?1 ORDER BY created_at ASC"
        ))
        .bind(content_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists unsent obligations for an outcome, oldest first.
    ///
    /// Oldest-first ordering keeps the backlog from starving behind fresh
    /// obligations.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn pending(&self, outcome: Outcome) -> Result<Vec<RelayLedgerEntry>> {
        let entries = sqlx::query_as::<_, RelayLedgerEntry>(&format!(
            r"
            SELECT {ENTRY_COLUMNS} FROM relay_ledger
            WHERE outcome = ?1 AND sent_at IS NULL
            ORDER BY created_at ASC
            ",
        ))
        .bind(outcome)
        .fetch_all(&*self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists unsent obligations joined with their content snapshots.
    ///
    /// Powers both the dispatcher (which POSTs the snapshot) and the manual
    /// retry tooling view.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn pending_with_content(
        &self,
        outcome: Outcome,
        limit: i64,
    ) -> Result<Vec<BacklogItem>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT l.id AS entry_id, l.content_id, l.outcome, l.created_at AS entry_created_at,
                   l.sent_at,
                   c.title, c.body, c.image_ref, c.category, c.kind, c.source_ref,
                   c.created_at AS content_created_at
            FROM relay_ledger l
            JOIN {} c ON c.id = l.content_id
            WHERE l.outcome = ?1 AND l.sent_at IS NULL
            ORDER BY l.created_at ASC
            LIMIT ?2
            ",
            outcome.partition().table()
        ))
        .bind(outcome)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let content_id: ContentId = row.try_get("content_id")?;
            items.push(BacklogItem {
                entry: RelayLedgerEntry {
                    id: row.try_get("entry_id")?,
                    content_id,
                    outcome: row.try_get("outcome")?,
                    created_at: row.try_get("entry_created_at")?,
                    sent_at: row.try_get("sent_at")?,
                },
                content: ContentRecord {
                    id: content_id,
                    title: row.try_get("title")?,
                    body: row.try_get("body")?,
                    image_ref: row.try_get("image_ref")?,
                    category: row.try_get("category")?,
                    kind: row.try_get("kind")?,
                    source_ref: row.try_get("source_ref")?,
                    created_at: row.try_get("content_created_at")?,
                },
            });
        }

        Ok(items)
    }

    /// Marks an obligation delivered.
    ///
    /// Idempotent: marking an already-sent entry is a no-op, so concurrent
    /// sweeps racing on the same obligation are harmless (the delivery
    /// guarantee is at-least-once, not exactly-once).
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the update fails.
    pub async fn mark_sent(&self, id: LedgerEntryId, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE relay_ledger SET sent_at = ?1 WHERE id = ?2 AND sent_at IS NULL")
            .bind(now)
            .bind(id)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }
}
