//! Error taxonomy for moderation and storage operations.
//!
//! Every failure a caller can observe maps to one of these variants. The
//! moderation engine guarantees all-or-nothing transitions, so callers never
//! see a half-applied state behind any of these errors.

use thiserror::Error;

use crate::models::ContentId;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for moderation pipeline operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying persistence unreachable or timed out.
    ///
    /// Means "cannot determine state", never "empty". No partial writes are
    /// assumed committed.
    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    /// Referenced content is absent from every partition.
    #[error("content {0} not found")]
    NotFound(ContentId),

    /// The content already left the pending partition.
    ///
    /// Returned for re-moderation and for re-ingestion of a resolved id.
    /// Moderation decisions are permanent; the state is left unchanged.
    #[error("content {0} already resolved")]
    AlreadyResolved(ContentId),

    /// Bulk ingestion stopped partway through the batch.
    ///
    /// Already-applied rows are not rolled back; rerunning the whole batch
    /// is safe because sync replaces the pending partition wholesale.
    #[error("batch ingestion stopped after {applied} rows: {message}")]
    BatchPartialFailure {
        /// Rows successfully applied before the failure.
        applied: usize,
        /// Description of the underlying failure.
        message: String,
    },

    /// Malformed caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_errors_surface_as_store_unavailable() {
        let err: CoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, CoreError::StoreUnavailable(_)));
    }

    #[test]
    fn display_includes_applied_count() {
        let err = CoreError::BatchPartialFailure { applied: 7, message: "disk full".into() };
        assert!(err.to_string().contains('7'));
    }
}
