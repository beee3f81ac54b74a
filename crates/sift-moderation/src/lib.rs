//! Moderation state machine for content records.
//!
//! Implements the Pending -> Approved/Rejected transition as a single
//! storage transaction: the partition move and the relay ledger entry
//! commit together or not at all. Approved and Rejected are terminal;
//! nothing moves a record out of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;

pub use engine::ModerationEngine;
