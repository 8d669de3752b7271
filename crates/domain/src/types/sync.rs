//! Per-run sync bookkeeping, persisted by the sync status store.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a run's synchronization with the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    Pending,
    Synced,
    Failed,
}

/// Sync record keyed by `RunSession::id`.
///
/// Created `Pending` when a run is first selected for sync, then overwritten
/// to `Synced` (with the server-assigned id) or `Failed` (with a message)
/// after a batch response. A `Synced` record always carries a `server_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    #[serde(default)]
    pub server_id: Option<i64>,
    pub state: SyncState,
    /// Epoch milliseconds of the last sync attempt.
    #[serde(default)]
    pub last_attempt: i64,
    #[serde(default)]
    pub failure_message: Option<String>,
}

impl SyncRecord {
    /// A fresh record for a run that has been selected for sync.
    #[must_use]
    pub fn pending() -> Self {
        Self { server_id: None, state: SyncState::Pending, last_attempt: 0, failure_message: None }
    }

    /// Runs are eligible for re-sync only while not synced.
    #[must_use]
    pub fn needs_sync(&self) -> bool {
        self.state != SyncState::Synced
    }
}

/// Stored server connection credentials. Absence of credentials is the
/// first-class "not connected" state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredentials {
    pub base_url: String,
    pub token: String,
}

impl ServerCredentials {
    /// Normalizes the base URL by trimming trailing slashes.
    #[must_use]
    pub fn new(base_url: &str, token: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), token: token.to_string() }
    }
}
