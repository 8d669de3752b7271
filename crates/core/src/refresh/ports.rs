//! Port interface for the local run session cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stride_domain::{Result, RunSession};

/// Trait for the durable local cache of run sessions
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// All cached sessions, newest first.
    async fn all_sessions(&self) -> Result<Vec<RunSession>>;

    /// Insert or update the given sessions, keeping existing rows.
    async fn insert_all(&self, sessions: &[RunSession]) -> Result<()>;

    /// Replace the entire cache contents with the given sessions.
    async fn replace_all(&self, sessions: &[RunSession]) -> Result<()>;

    /// End time of the most recently finished cached session, if any.
    async fn latest_end_time(&self) -> Result<Option<DateTime<Utc>>>;
}
