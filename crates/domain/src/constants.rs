//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Metrics engine
pub const KILOMETER_METERS: f64 = 1000.0;
/// Residual distance below this threshold is treated as floating-point noise
/// and does not produce a trailing partial split.
pub const PARTIAL_SPLIT_NOISE_METERS: f64 = 0.1;

// Sync configuration defaults
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RUNS_PER_PAGE: u32 = 15;
pub const MAX_FAILURE_MESSAGE_LEN: usize = 256;
