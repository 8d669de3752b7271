//! Port for the underlying run telemetry source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stride_domain::{Result, RunDetail, RunSession};

/// Read-only access to recorded run telemetry.
///
/// Implementations aggregate whatever the platform recorded (sessions,
/// speed and heart-rate streams, step counts) into the domain model. All
/// methods return sessions newest-first.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Load every recorded run session.
    async fn load_run_sessions(&self) -> Result<Vec<RunSession>>;

    /// Load run sessions that ended strictly after `after`.
    async fn load_run_sessions_after(&self, after: DateTime<Utc>) -> Result<Vec<RunSession>>;

    /// Load the full detail for one session: aggregates plus heart-rate
    /// samples, pace samples and per-kilometer splits.
    async fn load_run_detail(
        &self,
        session_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RunDetail>;
}
