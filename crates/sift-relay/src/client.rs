//! HTTP client for outbound relay delivery.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RelayError, Result};

/// Configuration for the relay HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout applied to each delivery request.
    pub timeout: Duration,

    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_DELIVERY_TIMEOUT_SECS),
            user_agent: "sift-relay/0.1".to_string(),
        }
    }
}

/// HTTP client for webhook delivery.
///
/// Connection pooling comes from the underlying reqwest client; one
/// instance serves every endpoint. A delivery succeeds if and only if the
/// endpoint answers 2xx within the timeout.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RelayClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RelayError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// POSTs a JSON payload to an endpoint.
    ///
    /// # Errors
    ///
    /// `Timeout` or `Network` on transport failure, `HttpStatus` for any
    /// non-2xx response. All three leave the obligation eligible for the
    /// next pass.
    pub async fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<u16> {
        debug!(url, "posting relay payload");

        let response = self.client.post(url).json(payload).send().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::timeout(self.config.timeout.as_secs())
            } else if e.is_connect() {
                RelayError::network(format!("connection failed: {e}"))
            } else {
                RelayError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(RelayError::HttpStatus { status: status.as_u16() })
        }
    }
}
