//! The ingestion adapter: applies normalized input to the content store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sift_core::{Clock, CoreError, Result, Storage};
use tracing::{debug, info, instrument, warn};

use crate::{columns::MappingSet, normalize::normalize_row, push::PushPayload};

/// Category assigned to pushed items that carry none.
pub const IMPORT_CATEGORY: &str = "imported";

/// Outcome of a push ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Items inserted or updated in the pending partition.
    pub applied: usize,

    /// Items whose id was already resolved; the decision stands and the
    /// item is skipped.
    pub skipped_resolved: usize,

    /// Items dropped for missing title or body.
    pub dropped: usize,
}

/// Outcome of a spreadsheet sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Pending records removed by the snapshot replace.
    pub cleared: u64,

    /// Rows inserted into the pending partition.
    pub applied: usize,

    /// Rows dropped for missing title or body.
    pub dropped: usize,
}

/// Raw spreadsheet sources for one sync run.
///
/// Each source is a 2D array of cells whose first row is a header. Only the
/// evaluation source feeds the pending partition; the resolved sources are
/// part of the inbound contract but deliberately not applied, because sync
/// must never touch resolved partitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetBatch {
    /// Rows awaiting moderation.
    #[serde(default)]
    pub evaluation: Vec<Vec<String>>,

    /// Rows the sheet lists as approved. Ignored.
    #[serde(default)]
    pub approved: Vec<Vec<String>>,

    /// Rows the sheet lists as rejected. Ignored.
    #[serde(default)]
    pub rejected: Vec<Vec<String>>,
}

/// Normalizes bulk input and applies it through the content store.
#[derive(Clone)]
pub struct IngestionAdapter {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl IngestionAdapter {
    /// Creates an adapter over the given storage.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Applies a pushed batch, upserting by id where one is supplied.
    ///
    /// Items without a usable title/body are dropped; items whose id is
    /// already resolved are skipped (a re-push never reverts a decision).
    /// Both show up as counts in the report rather than failing the batch.
    ///
    /// # Errors
    ///
    /// Returns `BatchPartialFailure` with the applied count if the store
    /// fails partway; already-applied items are not rolled back and the
    /// batch can be re-run safely.
    #[instrument(name = "ingest_push", skip_all)]
    pub async fn apply_push(&self, payload: PushPayload) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for item in payload.into_items() {
            let Some(record) = item.into_record(self.clock.now()) else {
                report.dropped += 1;
                continue;
            };

            match self.storage.content.insert_pending(&record).await {
                Ok(()) => report.applied += 1,
                Err(CoreError::AlreadyResolved(id)) => {
                    debug!(content_id = %id, "pushed item already resolved, skipping");
                    report.skipped_resolved += 1;
                },
                Err(CoreError::StoreUnavailable(message)) => {
                    warn!(applied = report.applied, "push batch stopped by store failure");
                    return Err(CoreError::BatchPartialFailure {
                        applied: report.applied,
                        message,
                    });
                },
                Err(other) => return Err(other),
            }
        }

        info!(
            applied = report.applied,
            skipped_resolved = report.skipped_resolved,
            dropped = report.dropped,
            "push batch applied"
        );

        Ok(report)
    }

    /// Replaces the pending partition with the sheet's evaluation rows.
    ///
    /// Row 0 of each source is a header and is skipped. The configured
    /// column mapping translates cells; without configuration the default
    /// mapping applies. Re-running the same sync is idempotent, and records
    /// resolved between two runs stay resolved: the replace only ever sees
    /// the pending table.
    ///
    /// # Errors
    ///
    /// Returns `BatchPartialFailure` with the applied count if inserts fail
    /// partway (the clear is not undone; a retry of the whole sync
    /// recovers), or `StoreUnavailable` if the sync could not start.
    #[instrument(name = "ingest_sync", skip_all, fields(rows = batch.evaluation.len()))]
    pub async fn sync_spreadsheet(&self, batch: &SheetBatch) -> Result<SyncReport> {
        let configured = self.storage.mappings.load().await?;
        let mapping = if configured.is_empty() {
            MappingSet::default_mapping()
        } else {
            MappingSet::from_mappings(&configured)?
        };

        if !batch.approved.is_empty() || !batch.rejected.is_empty() {
            debug!(
                approved_rows = batch.approved.len(),
                rejected_rows = batch.rejected.len(),
                "resolved sheet sources ignored; sync only rebuilds the pending queue"
            );
        }

        let cleared = self.storage.content.clear_pending().await?;

        let mut report = SyncReport { cleared, ..SyncReport::default() };
        let now = self.clock.now();

        for row in batch.evaluation.iter().skip(1) {
            let Some(record) = normalize_row(row, &mapping, now) else {
                report.dropped += 1;
                continue;
            };

            if let Err(err) = self.storage.content.insert_pending(&record).await {
                warn!(applied = report.applied, "sync stopped by store failure");
                return Err(CoreError::BatchPartialFailure {
                    applied: report.applied,
                    message: err.to_string(),
                });
            }
            report.applied += 1;
        }

        info!(
            cleared = report.cleared,
            applied = report.applied,
            dropped = report.dropped,
            "spreadsheet sync complete"
        );

        Ok(report)
    }
}
