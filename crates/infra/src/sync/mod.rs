//! Persisted sync bookkeeping.

pub mod status_store;

pub use status_store::FileSyncStateStore;
