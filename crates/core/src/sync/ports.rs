//! Port interfaces for sync operations

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use stride_domain::{BatchRunData, BatchRunRequest, Result, SyncRecord};

/// Errors surfaced by the remote run gateway.
///
/// Distinguishes outcomes the engine reacts to differently: an expired
/// token, a payload the server rejected, any other HTTP failure, and
/// transport-level failures where the request may never have arrived.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The server rejected the bearer token (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The server rejected the payload as invalid (HTTP 422).
    #[error("validation rejected")]
    Validation,

    /// Any other non-success HTTP status.
    #[error("server returned {0}")]
    Http(u16),

    /// The request failed before a response was received.
    #[error("network error: {0}")]
    Network(String),
}

/// Trait for uploading runs to the remote server
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Upload a batch of runs in a single request.
    ///
    /// A non-success HTTP status is an `Err`; the `Ok` payload carries the
    /// per-item results in request order.
    async fn upload_batch(
        &self,
        request: &BatchRunRequest,
    ) -> std::result::Result<BatchRunData, GatewayError>;
}

/// Trait for resolving a gateway from the current credentials.
///
/// Returns `None` when no server is configured, which the sync engine
/// treats as "not connected" rather than an error.
#[async_trait]
pub trait SyncGatewayProvider: Send + Sync {
    async fn gateway(&self) -> Option<Arc<dyn SyncGateway>>;
}

/// Trait for the persisted per-session sync state
#[async_trait]
pub trait SyncStateStore: Send + Sync {
    /// Load the full map of session id to sync record.
    async fn sync_map(&self) -> Result<HashMap<String, SyncRecord>>;

    /// Record the listed sessions as pending upload. Existing records keep
    /// their state; only unknown sessions get a fresh pending record.
    async fn mark_pending(&self, session_ids: &[String]) -> Result<()>;

    /// Record a session as synced with the server-assigned id.
    async fn mark_synced(&self, session_id: &str, server_id: i64) -> Result<()>;

    /// Record a session as failed with a diagnostic message.
    async fn mark_failed(&self, session_id: &str, message: &str) -> Result<()>;

    /// Epoch millis of the most recent successful sync, if any.
    async fn last_sync_time(&self) -> Result<Option<i64>>;

    /// Drop all sync state, forcing a full re-upload on the next sync.
    async fn clear_all(&self) -> Result<()>;
}
