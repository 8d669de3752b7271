//! Batch sync engine: uploads unsynced runs and reconciles per-item results.

pub mod ports;
pub mod service;

pub use ports::{GatewayError, SyncGateway, SyncGatewayProvider, SyncStateStore};
pub use service::{SyncOutcome, SyncService};
