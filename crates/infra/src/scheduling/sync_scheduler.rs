//! Periodic background sync with lifecycle management.
//!
//! Each tick refreshes the local session cache incrementally, then fires a
//! batch sync over the cached session list. Transient failures extend the
//! next delay exponentially up to a cap; unauthorized and not-connected
//! outcomes wait for the regular interval since retrying cannot help.

use std::sync::Arc;
use std::time::Duration;

use stride_core::{RefreshService, SyncOutcome, SyncService};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Delay between successful sync cycles.
    pub interval: Duration,
    /// Upper bound for the backoff delay after transient failures.
    pub max_backoff: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_backoff: Duration::from_secs(4 * 3600),
        }
    }
}

/// Background scheduler driving refresh-then-sync cycles
pub struct SyncScheduler {
    refresh: Arc<RefreshService>,
    sync: Arc<SyncService>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl SyncScheduler {
    /// Create a new sync scheduler
    pub fn new(
        refresh: Arc<RefreshService>,
        sync: Arc<SyncService>,
        config: SyncSchedulerConfig,
    ) -> Self {
        Self {
            refresh,
            sync,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the background loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is already running.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting sync scheduler");

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation_token = CancellationToken::new();

        let refresh = Arc::clone(&self.refresh);
        let sync = Arc::clone(&self.sync);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sync_loop(refresh, sync, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Sync scheduler started");
        Ok(())
    }

    /// Stop the background loop gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is not running.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping sync scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Sync scheduler stopped");
        Ok(())
    }

    /// Check if the scheduler is running.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Run one refresh-then-sync cycle immediately, outside the periodic
    /// loop. Used for opportunistic syncs (app foregrounded, connectivity
    /// regained).
    #[instrument(skip(self))]
    pub async fn trigger_now(&self) -> SyncOutcome {
        Self::run_cycle(&self.refresh, &self.sync).await
    }

    async fn sync_loop(
        refresh: Arc<RefreshService>,
        sync: Arc<SyncService>,
        config: SyncSchedulerConfig,
        cancel: CancellationToken,
    ) {
        let mut delay = config.interval;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let outcome = Self::run_cycle(&refresh, &sync).await;
                    delay = match outcome {
                        SyncOutcome::Error(ref message) => {
                            let next = (delay * 2).min(config.max_backoff);
                            warn!(error = %message, backoff_secs = next.as_secs(), "sync failed, backing off");
                            next
                        }
                        SyncOutcome::Unauthorized => {
                            warn!("sync unauthorized, waiting for re-authentication");
                            config.interval
                        }
                        SyncOutcome::NotConnected => {
                            debug!("no server configured, skipping sync");
                            config.interval
                        }
                        SyncOutcome::Success { synced, total } => {
                            info!(synced, total, "sync cycle completed");
                            config.interval
                        }
                    };
                }
            }
        }
    }

    async fn run_cycle(refresh: &Arc<RefreshService>, sync: &Arc<SyncService>) -> SyncOutcome {
        if let Err(err) = refresh.refresh_incremental().await {
            error!(error = %err, "cache refresh failed");
        }
        match refresh.sessions().await {
            Ok(sessions) => sync.sync_sessions(&sessions).await,
            Err(err) => {
                error!(error = %err, "failed to read cached sessions");
                SyncOutcome::Error(err.to_string())
            }
        }
    }
}

/// Ensure the background task stops when the scheduler is dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("SyncScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
