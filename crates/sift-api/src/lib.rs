//! HTTP surface for the sift moderation pipeline.
//!
//! Exposes ingestion (push and spreadsheet sync), the moderation actions,
//! partition listings, the relay backlog view and manual sweep trigger,
//! endpoint configuration, and health probes. Configuration loading lives
//! here too: defaults, then `config.toml`, then environment overrides.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{build_state, router, serve, AppState};
