//! # Stride Core
//!
//! Business logic for run telemetry processing and synchronization.
//!
//! This crate contains:
//! - The metrics engine: pace conversion and calibrated per-kilometer split
//!   integration over raw speed samples (pure functions, no I/O)
//! - The sync engine: batch upload orchestration with per-item outcome
//!   reconciliation against the persisted sync state
//! - The cache refresh policy: incremental vs. full reload of the local run
//!   session cache
//! - Port traits for the telemetry source, session cache, sync state store,
//!   and remote gateway (implemented in `stride-infra`)

pub mod metrics;
pub mod refresh;
pub mod sync;
pub mod telemetry;

pub use refresh::{RefreshService, SessionCache};
pub use sync::{
    GatewayError, SyncGateway, SyncGatewayProvider, SyncOutcome, SyncService, SyncStateStore,
};
pub use telemetry::TelemetrySource;
