//! Cache refresh service - core business logic

use std::sync::Arc;

use stride_domain::{Result, RunSession};
use tracing::{debug, info, instrument};

use super::ports::SessionCache;
use crate::telemetry::TelemetrySource;

/// Refreshes the local session cache from the telemetry source.
///
/// Incremental refresh only fetches telemetry newer than the latest cached
/// end time; an empty cache falls back to a full refresh. Sync runs
/// downstream of a refresh (the scheduler's job), never the other way
/// around.
pub struct RefreshService {
    cache: Arc<dyn SessionCache>,
    telemetry: Arc<dyn TelemetrySource>,
}

impl RefreshService {
    /// Create a new refresh service
    pub fn new(cache: Arc<dyn SessionCache>, telemetry: Arc<dyn TelemetrySource>) -> Self {
        Self { cache, telemetry }
    }

    /// Fetch sessions newer than the cached latest end time and insert
    /// them. Falls back to a full refresh when the cache is empty.
    #[instrument(skip_all)]
    pub async fn refresh_incremental(&self) -> Result<()> {
        let Some(latest) = self.cache.latest_end_time().await? else {
            debug!("cache empty, falling back to full refresh");
            return self.refresh_full().await;
        };

        let fresh = self.telemetry.load_run_sessions_after(latest).await?;
        if fresh.is_empty() {
            debug!(%latest, "no new sessions");
            return Ok(());
        }
        info!(count = fresh.len(), "caching new sessions");
        self.cache.insert_all(&fresh).await
    }

    /// Re-read all telemetry and wholesale-replace the cache.
    #[instrument(skip_all)]
    pub async fn refresh_full(&self) -> Result<()> {
        let all = self.telemetry.load_run_sessions().await?;
        info!(count = all.len(), "replacing session cache");
        self.cache.replace_all(&all).await
    }

    /// Current cache contents, newest first.
    pub async fn sessions(&self) -> Result<Vec<RunSession>> {
        self.cache.all_sessions().await
    }
}
