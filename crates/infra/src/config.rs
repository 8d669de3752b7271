//! Configuration loader
//!
//! Loads application configuration from a TOML file with environment
//! variable overrides. A `.env` file is honoured when present.
//!
//! ## Environment Variables
//! - `STRIDE_DB_PATH`: SQLite database file path
//! - `STRIDE_DB_POOL_SIZE`: Connection pool size
//! - `STRIDE_STATUS_STORE_PATH`: Sync status JSON file path
//! - `STRIDE_KEYRING_SERVICE`: Keyring service name for credentials
//! - `STRIDE_SYNC_INTERVAL`: Sync interval in seconds
//! - `STRIDE_HTTP_TIMEOUT`: HTTP request timeout in seconds

use std::path::Path;

use serde::{Deserialize, Serialize};
use stride_domain::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SYNC_INTERVAL_SECS};
use stride_domain::{Result, StrideError};
use tracing::info;

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Sync engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub status_store_path: String,
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
    #[serde(default = "default_sync_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

fn default_pool_size() -> u32 {
    4
}

fn default_keyring_service() -> String {
    "stride".to_string()
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns `StrideError::Config` if the file is unreadable or invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Optional .env support for development setups.
        dotenvy::dotenv().ok();

        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StrideError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        let mut config: AppConfig = toml::from_str(&raw)
            .map_err(|e| StrideError::Config(format!("invalid config: {e}")))?;
        config.apply_env_overrides()?;

        info!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("STRIDE_DB_PATH") {
            self.database.path = path;
        }
        if let Ok(size) = std::env::var("STRIDE_DB_POOL_SIZE") {
            self.database.pool_size = parse_env("STRIDE_DB_POOL_SIZE", &size)?;
        }
        if let Ok(path) = std::env::var("STRIDE_STATUS_STORE_PATH") {
            self.sync.status_store_path = path;
        }
        if let Ok(service) = std::env::var("STRIDE_KEYRING_SERVICE") {
            self.sync.keyring_service = service;
        }
        if let Ok(interval) = std::env::var("STRIDE_SYNC_INTERVAL") {
            self.sync.interval_seconds = parse_env("STRIDE_SYNC_INTERVAL", &interval)?;
        }
        if let Ok(timeout) = std::env::var("STRIDE_HTTP_TIMEOUT") {
            self.sync.http_timeout_seconds = parse_env("STRIDE_HTTP_TIMEOUT", &timeout)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| StrideError::Config(format!("invalid {name}: {e}")))
}
