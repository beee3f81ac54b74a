//! Core domain models and partitioned storage for the sift moderation
//! pipeline.
//!
//! Provides strongly-typed domain primitives, the error taxonomy, and the
//! repository layer over SQLite. Every other crate depends on these
//! foundational types; the moderation state machine and relay ledger
//! invariants are enforced here at the storage layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result};
pub use models::{
    ColumnMapping, ContentId, ContentKind, ContentRecord, LedgerEntryId, MappedField, Outcome,
    Partition, RelayChannel, RelayEndpoint, RelayLedgerEntry,
};
pub use storage::Storage;
pub use time::{Clock, SystemClock, TestClock};
