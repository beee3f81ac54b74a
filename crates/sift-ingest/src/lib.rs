//! Bulk ingestion for the moderation pipeline.
//!
//! Normalizes external input into pending content records: positional
//! spreadsheet rows translated through a column mapping, and already-keyed
//! JSON payloads pushed by automation. Spreadsheet sync treats the sheet as
//! the authority for what is still pending and rebuilds that partition
//! wholesale; resolved partitions are never touched by ingestion.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod columns;
pub mod normalize;
pub mod push;

pub use adapter::{IngestReport, IngestionAdapter, SheetBatch, SyncReport};
pub use columns::{column_index, MappingSet};
pub use push::{PushItem, PushPayload};
