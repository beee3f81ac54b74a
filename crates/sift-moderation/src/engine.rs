//! Approve/reject transition engine.

use std::sync::Arc;

use sift_core::{Clock, ContentId, ContentRecord, CoreError, Outcome, Result, Storage};
use tracing::{info, instrument};

/// Executes moderation decisions against the content store.
///
/// Each decision is one transaction: conditionally remove the record from
/// Pending, re-insert it into the outcome's partition with its origin
/// timestamp intact, and append the relay obligation. If any step fails the
/// transaction rolls back and the caller observes a single error with no
/// partial state.
#[derive(Clone)]
pub struct ModerationEngine {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl ModerationEngine {
    /// Creates an engine over the given storage.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Approves a pending record.
    ///
    /// # Errors
    ///
    /// `AlreadyResolved` if the record left Pending earlier (including a
    /// concurrent decision that won the race), `NotFound` if the id is
    /// unknown, `StoreUnavailable` on store failure. No ledger entry is
    /// created on any error path.
    pub async fn approve(&self, id: ContentId) -> Result<ContentRecord> {
        self.resolve(id, Outcome::Approved).await
    }

    /// Rejects a pending record.
    ///
    /// # Errors
    ///
    /// Same contract as [`approve`](Self::approve).
    pub async fn reject(&self, id: ContentId) -> Result<ContentRecord> {
        self.resolve(id, Outcome::Rejected).await
    }

    #[instrument(name = "moderation_resolve", skip(self), fields(content_id = %id, outcome = %outcome))]
    async fn resolve(&self, id: ContentId, outcome: Outcome) -> Result<ContentRecord> {
        let mut tx = self.storage.pool().begin().await?;

        let Some(record) = self.storage.content.take_pending_in_tx(&mut tx, id).await? else {
            // Not pending: distinguish a repeated decision from a bogus id.
            let err = match self.storage.content.resolved_partition_in_tx(&mut tx, id).await? {
                Some(_) => CoreError::AlreadyResolved(id),
                None => CoreError::NotFound(id),
            };
            return Err(err);
        };

        self.storage.content.insert_in_tx(&mut tx, outcome.partition(), &record).await?;

        let entry = self
            .storage
            .relay_ledger
            .record_in_tx(&mut tx, id, outcome, self.clock.now())
            .await?;

        tx.commit().await?;

        info!(
            content_id = %id,
            outcome = %outcome,
            ledger_entry = %entry.id,
            "moderation decision committed"
        );

        Ok(record)
    }
}
