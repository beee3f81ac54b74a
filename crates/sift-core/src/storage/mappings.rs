//! Repository for spreadsheet column mapping configuration.
//!
//! The ingestion adapter consumes these mappings when translating raw sheet
//! rows; editing them is a whole-set replace, matching how the source system
//! persisted its column configuration.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{error::Result, models::ColumnMapping};

/// Repository for column mapping database operations.
pub struct Repository {
    pool: Arc<SqlitePool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Loads the configured mappings, ordered by column letter.
    ///
    /// An empty result means no mapping has been configured; callers fall
    /// back to their default mapping.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the query fails.
    pub async fn load(&self) -> Result<Vec<ColumnMapping>> {
        let mappings = sqlx::query_as::<_, ColumnMapping>(
            "SELECT letter, field FROM column_mappings ORDER BY length(letter), letter",
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(mappings)
    }

    /// Replaces the whole mapping set.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the transaction fails.
    pub async fn replace(&self, mappings: &[ColumnMapping]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM column_mappings").execute(&mut *tx).await?;

        for mapping in mappings {
            sqlx::query("INSERT INTO column_mappings (letter, field) VALUES (?1, ?2)")
                .bind(&mapping.letter)
                .bind(mapping.field)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
