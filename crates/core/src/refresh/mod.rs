//! Cache refresh policy: incremental vs. full reload of cached sessions.

pub mod ports;
pub mod service;

pub use ports::SessionCache;
pub use service::RefreshService;
