//! # Stride Infra
//!
//! Infrastructure adapters behind the `stride-core` ports:
//! - `api`: reqwest-based remote run gateway and credential-driven provider
//! - `credentials`: platform keyring credential store
//! - `database`: SQLite-backed run session cache (r2d2 pool)
//! - `sync`: file-backed sync status store with atomic writes
//! - `scheduling`: periodic background sync with cancellation and backoff
//! - `config`: TOML + environment configuration loader

pub mod api;
pub mod config;
pub mod credentials;
pub mod database;
pub mod scheduling;
pub mod sync;

pub use api::{ApiClient, ApiClientConfig, CredentialGatewayProvider};
pub use config::AppConfig;
pub use credentials::{CredentialStore, KeyringCredentialStore};
pub use database::{DbManager, SqliteSessionCache};
pub use scheduling::{SchedulerError, SyncScheduler, SyncSchedulerConfig};
pub use sync::FileSyncStateStore;
