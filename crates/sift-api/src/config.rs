//! Configuration management for the sift moderation service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use sift_relay::{ClientConfig, DispatcherConfig};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out of the box with an embedded database file next to
/// the binary; everything here exists for deployment-specific overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Database
    /// SQLite connection URL.
    ///
    /// Environment variable: `DATABASE_URL`
    #[serde(default = "default_database_url", alias = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections", alias = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,

    /// Connection acquire timeout in seconds. Bounds every store operation
    /// so a wedged database surfaces as an error instead of a hang.
    ///
    /// Environment variable: `DATABASE_CONNECT_TIMEOUT_SECS`
    #[serde(default = "default_connect_timeout", alias = "DATABASE_CONNECT_TIMEOUT_SECS")]
    pub database_connect_timeout_secs: u64,

    /// SQLite busy handler timeout in milliseconds.
    ///
    /// Environment variable: `DATABASE_BUSY_TIMEOUT_MS`
    #[serde(default = "default_busy_timeout", alias = "DATABASE_BUSY_TIMEOUT_MS")]
    pub database_busy_timeout_ms: u64,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,

    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    // Relay
    /// Seconds between background dispatch passes.
    ///
    /// Environment variable: `SWEEP_INTERVAL_SECS`
    #[serde(default = "default_sweep_interval", alias = "SWEEP_INTERVAL_SECS")]
    pub sweep_interval_secs: u64,

    /// Timeout for each outbound delivery request in seconds.
    ///
    /// Environment variable: `DELIVERY_TIMEOUT_SECS`
    #[serde(default = "default_delivery_timeout", alias = "DELIVERY_TIMEOUT_SECS")]
    pub delivery_timeout_secs: u64,

    /// Maximum obligations delivered per outcome per pass.
    ///
    /// Environment variable: `RELAY_BATCH_LIMIT`
    #[serde(default = "default_batch_limit", alias = "RELAY_BATCH_LIMIT")]
    pub relay_batch_limit: i64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, config file, and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Converts to the relay crate's dispatcher configuration.
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig { batch_limit: self.relay_batch_limit, client: self.to_client_config() }
    }

    /// Converts to the relay client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.delivery_timeout_secs),
            user_agent: "sift/0.1".to_string(),
        }
    }

    /// Interval between background sweep passes.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Parses the server socket address from host and port.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable host/port pair.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database max_connections must be greater than 0");
        }

        if self.database_connect_timeout_secs == 0 {
            anyhow::bail!("database connect timeout must be greater than 0");
        }

        if self.sweep_interval_secs == 0 {
            anyhow::bail!("sweep interval must be greater than 0");
        }

        if self.delivery_timeout_secs == 0 {
            anyhow::bail!("delivery timeout must be greater than 0");
        }

        if self.relay_batch_limit <= 0 {
            anyhow::bail!("relay batch limit must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            database_connect_timeout_secs: default_connect_timeout(),
            database_busy_timeout_ms: default_busy_timeout(),
            host: default_host(),
            port: default_port(),
            sweep_interval_secs: default_sweep_interval(),
            delivery_timeout_secs: default_delivery_timeout(),
            relay_batch_limit: default_batch_limit(),
            rust_log: default_log_level(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://sift.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_busy_timeout() -> u64 {
    5000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_sweep_interval() -> u64 {
    sift_relay::DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_delivery_timeout() -> u64 {
    sift_relay::DEFAULT_DELIVERY_TIMEOUT_SECS
}

fn default_batch_limit() -> i64 {
    sift_relay::DEFAULT_BATCH_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}
