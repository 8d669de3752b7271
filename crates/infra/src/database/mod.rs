//! SQLite persistence for the local run session cache.

pub mod manager;
pub mod session_cache;

pub use manager::DbManager;
pub use session_cache::SqliteSessionCache;
