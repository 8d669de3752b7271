//! File-backed sync status store.
//!
//! Persists the run-id to `SyncRecord` map plus the last-successful-sync
//! timestamp as one JSON document. Writes go through a temp file and an
//! atomic rename; a corrupt or missing file degrades to an empty map.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use stride_core::SyncStateStore;
use stride_domain::constants::MAX_FAILURE_MESSAGE_LEN;
use stride_domain::{Result, StrideError, SyncRecord, SyncState};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StatusDocument {
    #[serde(default)]
    records: HashMap<String, SyncRecord>,
    #[serde(default)]
    last_sync_time: Option<i64>,
}

/// JSON-file implementation of the sync state port.
///
/// Single-writer discipline: every read-modify-write holds the in-process
/// mutex, and the document on disk is replaced wholesale.
pub struct FileSyncStateStore {
    path: PathBuf,
    doc: Mutex<StatusDocument>,
}

impl FileSyncStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let doc = load_document(&path);
        Self { path, doc: Mutex::new(doc) }
    }

    fn persist(&self, doc: &StatusDocument) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .map_err(|e| StrideError::Database(format!("status store dir: {e}")))?;

        let json = serde_json::to_vec_pretty(doc)
            .map_err(|e| StrideError::Internal(format!("status serialization: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| StrideError::Database(format!("status temp file: {e}")))?;
        tmp.write_all(&json)
            .map_err(|e| StrideError::Database(format!("status write: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| StrideError::Database(format!("status rename: {e}")))?;
        Ok(())
    }

    fn mutate<F: FnOnce(&mut StatusDocument)>(&self, apply: F) -> Result<()> {
        let mut doc = self.doc.lock();
        apply(&mut doc);
        self.persist(&doc)
    }
}

fn load_document(path: &Path) -> StatusDocument {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "sync status file corrupt, starting empty");
                StatusDocument::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no sync status file yet");
            StatusDocument::default()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "sync status file unreadable, starting empty");
            StatusDocument::default()
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn truncated(message: &str) -> String {
    if message.len() <= MAX_FAILURE_MESSAGE_LEN {
        return message.to_string();
    }
    message.chars().take(MAX_FAILURE_MESSAGE_LEN).collect()
}

#[async_trait]
impl SyncStateStore for FileSyncStateStore {
    async fn sync_map(&self) -> Result<HashMap<String, SyncRecord>> {
        Ok(self.doc.lock().records.clone())
    }

    async fn mark_pending(&self, session_ids: &[String]) -> Result<()> {
        self.mutate(|doc| {
            let now = now_millis();
            for id in session_ids {
                // Insert-only: never downgrade an existing record.
                doc.records.entry(id.clone()).or_insert_with(|| {
                    let mut record = SyncRecord::pending();
                    record.last_attempt = now;
                    record
                });
            }
        })
    }

    async fn mark_synced(&self, session_id: &str, server_id: i64) -> Result<()> {
        self.mutate(|doc| {
            let now = now_millis();
            doc.records.insert(
                session_id.to_string(),
                SyncRecord {
                    server_id: Some(server_id),
                    state: SyncState::Synced,
                    last_attempt: now,
                    failure_message: None,
                },
            );
            doc.last_sync_time = Some(now);
        })
    }

    async fn mark_failed(&self, session_id: &str, message: &str) -> Result<()> {
        self.mutate(|doc| {
            doc.records.insert(
                session_id.to_string(),
                SyncRecord {
                    server_id: None,
                    state: SyncState::Failed,
                    last_attempt: now_millis(),
                    failure_message: Some(truncated(message)),
                },
            );
        })
    }

    async fn last_sync_time(&self) -> Result<Option<i64>> {
        Ok(self.doc.lock().last_sync_time)
    }

    async fn clear_all(&self) -> Result<()> {
        self.mutate(|doc| {
            doc.records.clear();
            doc.last_sync_time = None;
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> FileSyncStateStore {
        FileSyncStateStore::new(dir.path().join("sync-status.json"))
    }

    #[tokio::test]
    async fn pending_is_insert_only() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.mark_synced("a", 7).await.unwrap();
        store.mark_pending(&["a".to_string(), "b".to_string()]).await.unwrap();

        let map = store.sync_map().await.unwrap();
        assert_eq!(map["a"].state, SyncState::Synced);
        assert_eq!(map["a"].server_id, Some(7));
        assert_eq!(map["b"].state, SyncState::Pending);
    }

    #[tokio::test]
    async fn synced_and_failed_overwrite_unconditionally() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.mark_failed("a", "timeout").await.unwrap();
        store.mark_synced("a", 9).await.unwrap();
        let map = store.sync_map().await.unwrap();
        assert_eq!(map["a"].state, SyncState::Synced);
        assert_eq!(map["a"].failure_message, None);

        store.mark_failed("a", "retry blew up").await.unwrap();
        let map = store.sync_map().await.unwrap();
        assert_eq!(map["a"].state, SyncState::Failed);
        assert_eq!(map["a"].server_id, None);
    }

    #[tokio::test]
    async fn successful_sync_bumps_last_sync_time() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.last_sync_time().await.unwrap(), None);

        store.mark_synced("a", 1).await.unwrap();

        let stamp = store.last_sync_time().await.unwrap().unwrap();
        assert!(stamp > 0);
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync-status.json");

        {
            let store = FileSyncStateStore::new(&path);
            store.mark_synced("a", 7).await.unwrap();
            store.mark_failed("b", "boom").await.unwrap();
        }

        let reopened = FileSyncStateStore::new(&path);
        let map = reopened.sync_map().await.unwrap();
        assert_eq!(map["a"].server_id, Some(7));
        assert_eq!(map["b"].failure_message.as_deref(), Some("boom"));
        assert!(reopened.last_sync_time().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync-status.json");
        fs::write(&path, b"{not json at all").unwrap();

        let store = FileSyncStateStore::new(&path);
        assert!(store.sync_map().await.unwrap().is_empty());

        // The store still works after the bad load.
        store.mark_pending(&["a".to_string()]).await.unwrap();
        assert_eq!(store.sync_map().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_all_wipes_records_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.mark_synced("a", 7).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(store.sync_map().await.unwrap().is_empty());
        assert_eq!(store.last_sync_time().await.unwrap(), None);
    }

    #[tokio::test]
    async fn long_failure_messages_are_truncated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.mark_failed("a", &"x".repeat(2000)).await.unwrap();

        let map = store.sync_map().await.unwrap();
        assert_eq!(map["a"].failure_message.as_ref().unwrap().len(), MAX_FAILURE_MESSAGE_LEN);
    }
}
