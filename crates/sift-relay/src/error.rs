//! Error types for relay dispatch operations.
//!
//! Delivery errors are transient by design: they are logged, counted, and
//! never surfaced to a moderation caller. Only store failures escape a
//! sweep, because without the store the dispatcher cannot even track what
//! it owes.

use sift_core::CoreError;
use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors arising while dispatching relay obligations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection-level failure reaching the endpoint.
    #[error("network failure: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The delivery request exceeded its timeout.
    #[error("delivery timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned HTTP {status}")]
    HttpStatus {
        /// Status code received.
        status: u16,
    },

    /// Invalid client or endpoint configuration.
    #[error("relay configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Underlying ledger or endpoint store failed.
    #[error(transparent)]
    Store(#[from] CoreError),
}

impl RelayError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether this failure only affects a single delivery attempt.
    ///
    /// Per-delivery failures leave the obligation unsent for the next pass;
    /// store failures abort the pass.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}
