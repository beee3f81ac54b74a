//! Repository for partitioned content record operations.
//!
//! The pending/approved/rejected tables share one schema; which table holds
//! a record is its moderation state. Moves between partitions happen inside
//! a caller-owned transaction via `take_pending_in_tx` + `insert_in_tx`, so
//! a record is never observable in zero or two partitions.

use std::sync::Arc;

use sqlx::{Executor, Sqlite, SqlitePool, Transaction};

use crate::{
    error::{CoreError, Result},
    models::{ContentId, ContentRecord, Partition},
};

const RECORD_COLUMNS: &str = "id, title, body, image_ref, category, kind, source_ref, created_at";

/// Repository for content record database operations.
pub struct Repository {
    pool: Arc<SqlitePool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<SqlitePool> {
        self.pool.clone()
    }

    /// Lists a partition's records, newest origin timestamp first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store cannot be reached. Callers
    /// must treat that as "state unknown", not as an empty partition.
    pub async fn list(&self, partition: Partition) -> Result<Vec<ContentRecord>> {
        let records = sqlx::query_as::<_, ContentRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM {} ORDER BY created_at DESC",
            partition.table()
        ))
        .fetch_all(&*self.pool)
        .await?;

        Ok(records)
    }

    /// Finds a record in a specific partition.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn find(&self, partition: Partition, id: ContentId) -> Result<Option<ContentRecord>> {
        let record = sqlx::query_as::<_, ContentRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE id = ?1",
            partition.table()
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts a record into the pending partition.
    ///
    /// If a record with the same id already sits in Pending, the insert
    /// becomes an upsert. If it already lives in a resolved partition the
    /// insert is refused: re-ingestion must never revert a moderation
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyResolved` for resolved ids, `StoreUnavailable` on
    /// store failure.
    pub async fn insert_pending(&self, record: &ContentRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if self.resolved_partition_in_tx(&mut tx, record.id).await?.is_some() {
            return Err(CoreError::AlreadyResolved(record.id));
        }

        sqlx::query(&format!(
            r"
            INSERT INTO {} ({RECORD_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                image_ref = excluded.image_ref,
                category = excluded.category,
                kind = excluded.kind,
                source_ref = excluded.source_ref,
                created_at = excluded.created_at
            ",
            Partition::Pending.table()
        ))
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.image_ref)
        .bind(&record.category)
        .bind(record.kind)
        .bind(&record.source_ref)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Conditionally removes a record from the pending partition.
    ///
    /// This is the per-id compare-and-move primitive: the DELETE only
    /// succeeds if the record is still pending, so two racing moderation
    /// calls get exactly one `Some` between them.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the statement fails.
    pub async fn take_pending_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: ContentId,
    ) -> Result<Option<ContentRecord>> {
        let record = sqlx::query_as::<_, ContentRecord>(&format!(
            "DELETE FROM {} WHERE id = ?1 RETURNING {RECORD_COLUMNS}",
            Partition::Pending.table()
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(record)
    }

    /// Inserts a record into a partition within a transaction.
    ///
    /// Used for the second half of a partition move; `created_at` is written
    /// verbatim from the record, preserving the origin timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the insert fails.
    pub async fn insert_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        partition: Partition,
        record: &ContentRecord,
    ) -> Result<()> {
        self.insert_impl(&mut **tx, partition, record).await
    }

    async fn insert_impl<'e, E>(
        &self,
        executor: E,
        partition: Partition,
        record: &ContentRecord,
    ) -> Result<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(&format!(
            "INSERT INTO {} ({RECORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            partition.table()
        ))
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.image_ref)
        .bind(&record.category)
        .bind(record.kind)
        .bind(&record.source_ref)
        .bind(record.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Finds which resolved partition, if any, holds the id.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a lookup fails.
    pub async fn resolved_partition_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: ContentId,
    ) -> Result<Option<Partition>> {
        for partition in [Partition::Approved, Partition::Rejected] {
            let exists: Option<i64> =
                sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?1", partition.table()))
                    .bind(id)
                    .fetch_optional(&mut **tx)
                    .await?;

            if exists.is_some() {
                return Ok(Some(partition));
            }
        }

        Ok(None)
    }

    /// Deletes every pending record, leaving resolved partitions untouched.
    ///
    /// Spreadsheet sync calls this before rebuilding the queue: the sheet is
    /// the authority for what is still pending, and only for that.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the delete fails.
    pub async fn clear_pending(&self) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {}", Partition::Pending.table()))
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts records in a partition.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn count(&self, partition: Partition) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", partition.table()))
                .fetch_one(&*self.pool)
                .await?;

        Ok(count.0)
    }
}
