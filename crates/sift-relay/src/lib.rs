//! Webhook dispatch for the relay obligation ledger.
//!
//! Consumes unsent ledger entries and POSTs each content outcome to the
//! enabled endpoint for its channel. Delivery is at-least-once: an
//! obligation is only marked sent on a confirmed 2xx, stays queryable
//! across passes otherwise, and is never dropped because an endpoint is
//! down or unconfigured. Failed deliveries are retried by later passes,
//! not synchronously.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod sweeper;

pub use client::{ClientConfig, RelayClient};
pub use dispatcher::{Dispatcher, DispatcherConfig, SweepStats};
pub use error::{RelayError, Result};
pub use sweeper::Sweeper;

/// Default timeout for outbound delivery requests, in seconds.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Default maximum obligations delivered per outcome per pass.
pub const DEFAULT_BATCH_LIMIT: i64 = 100;

/// Default interval between background sweep passes, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
