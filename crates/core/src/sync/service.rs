//! Batch sync orchestration - core business logic

use std::sync::Arc;

use futures::future::join_all;
use stride_domain::{BatchRunRequest, RunSession, RunUpload};
use tracing::{info, instrument, warn};

use super::ports::{GatewayError, SyncGatewayProvider, SyncStateStore};
use crate::telemetry::TelemetrySource;

/// Outcome of one batch sync invocation.
///
/// Exactly one of these is returned per call; every attempted session ends
/// the call as synced, failed, or still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The batch completed. `synced` counts runs the server created or
    /// already had; `total` is the size of the input session list.
    Success { synced: usize, total: usize },
    /// No credentials are stored, so no upload was attempted.
    NotConnected,
    /// The server rejected the bearer token. Requires re-authentication,
    /// not a retry.
    Unauthorized,
    /// The batch failed with a message worth surfacing. Transport errors
    /// land here and are retryable; validation errors are not.
    Error(String),
}

/// Batch sync service
///
/// Stateless per invocation and safely re-entrant: the persisted sync map
/// is consulted fresh on every call, so repeating a fully successful sync
/// uploads nothing.
pub struct SyncService {
    gateway_provider: Arc<dyn SyncGatewayProvider>,
    state_store: Arc<dyn SyncStateStore>,
    telemetry: Arc<dyn TelemetrySource>,
}

impl SyncService {
    /// Create a new sync service
    pub fn new(
        gateway_provider: Arc<dyn SyncGatewayProvider>,
        state_store: Arc<dyn SyncStateStore>,
        telemetry: Arc<dyn TelemetrySource>,
    ) -> Self {
        Self { gateway_provider, state_store, telemetry }
    }

    /// Upload every not-yet-synced session in `sessions` as one batch and
    /// reconcile the per-item results back into the state store.
    #[instrument(skip_all, fields(total = sessions.len()))]
    pub async fn sync_sessions(&self, sessions: &[RunSession]) -> SyncOutcome {
        let Some(gateway) = self.gateway_provider.gateway().await else {
            return SyncOutcome::NotConnected;
        };

        let sync_map = match self.state_store.sync_map().await {
            Ok(map) => map,
            Err(err) => return SyncOutcome::Error(err.to_string()),
        };

        let unsynced: Vec<&RunSession> = sessions
            .iter()
            .filter(|session| {
                sync_map.get(&session.id).map_or(true, |record| record.needs_sync())
            })
            .collect();

        if unsynced.is_empty() {
            return SyncOutcome::Success { synced: 0, total: sessions.len() };
        }

        let unsynced_ids: Vec<String> =
            unsynced.iter().map(|session| session.id.clone()).collect();

        // Persist pending state before touching the network, so a crash
        // mid-upload leaves visible pending records rather than silence.
        if let Err(err) = self.state_store.mark_pending(&unsynced_ids).await {
            return SyncOutcome::Error(err.to_string());
        }

        // Detail fetches are independent per session; issue them in
        // parallel and join before assembling the batch.
        let uploads: Vec<RunUpload> =
            join_all(unsynced.iter().map(|session| self.build_upload(session))).await;

        let request = BatchRunRequest { runs: uploads };
        info!(runs = request.runs.len(), "uploading run batch");

        match gateway.upload_batch(&request).await {
            Ok(data) => {
                for item in &data.results {
                    let Some(session_id) = unsynced_ids.get(item.index) else {
                        warn!(index = item.index, "batch result index out of bounds");
                        continue;
                    };
                    match item.status.as_str() {
                        "created" | "skipped" => {
                            // A success verdict without a server id is
                            // malformed; leave the record pending.
                            if let Some(server_id) = item.id {
                                let _ = self.state_store.mark_synced(session_id, server_id).await;
                            } else {
                                warn!(session_id, status = %item.status, "missing server id");
                            }
                        }
                        other => {
                            let _ = self.state_store.mark_failed(session_id, other).await;
                        }
                    }
                }
                let synced = (data.created + data.skipped) as usize;
                info!(synced, total = sessions.len(), "run batch reconciled");
                SyncOutcome::Success { synced, total: sessions.len() }
            }
            Err(GatewayError::Unauthorized) => SyncOutcome::Unauthorized,
            Err(GatewayError::Validation) => {
                SyncOutcome::Error("Validation error from server".to_string())
            }
            Err(GatewayError::Http(code)) => SyncOutcome::Error(format!("Server returned {code}")),
            Err(GatewayError::Network(message)) => {
                for session_id in &unsynced_ids {
                    let _ = self.state_store.mark_failed(session_id, &message).await;
                }
                SyncOutcome::Error(message)
            }
        }
    }

    /// Assemble an upload record for one session, falling back to the
    /// session-level aggregates when detail enrichment fails.
    async fn build_upload(&self, session: &RunSession) -> RunUpload {
        match self
            .telemetry
            .load_run_detail(&session.id, session.start_time, session.end_time)
            .await
        {
            Ok(detail) => RunUpload::from_detail(&detail),
            Err(err) => {
                warn!(session_id = %session.id, error = %err, "detail enrichment failed, uploading aggregates only");
                RunUpload::from_session(session)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use stride_domain::{
        BatchRunData, BatchResultItem, HeartRateSample, Result, RunDetail, RunSession, StrideError,
        SyncRecord, SyncState,
    };
    use tokio::sync::Mutex;

    use super::*;
    use crate::sync::ports::SyncGateway;

    struct MockStateStore {
        records: Mutex<HashMap<String, SyncRecord>>,
    }

    impl MockStateStore {
        fn new() -> Self {
            Self { records: Mutex::new(HashMap::new()) }
        }

        async fn record(&self, id: &str) -> Option<SyncRecord> {
            self.records.lock().await.get(id).cloned()
        }
    }

    #[async_trait]
    impl SyncStateStore for MockStateStore {
        async fn sync_map(&self) -> Result<HashMap<String, SyncRecord>> {
            Ok(self.records.lock().await.clone())
        }

        async fn mark_pending(&self, session_ids: &[String]) -> Result<()> {
            let mut records = self.records.lock().await;
            for id in session_ids {
                records.entry(id.clone()).or_insert_with(SyncRecord::pending);
            }
            Ok(())
        }

        async fn mark_synced(&self, session_id: &str, server_id: i64) -> Result<()> {
            let mut record = SyncRecord::pending();
            record.state = SyncState::Synced;
            record.server_id = Some(server_id);
            self.records.lock().await.insert(session_id.to_string(), record);
            Ok(())
        }

        async fn mark_failed(&self, session_id: &str, message: &str) -> Result<()> {
            let mut record = SyncRecord::pending();
            record.state = SyncState::Failed;
            record.failure_message = Some(message.to_string());
            self.records.lock().await.insert(session_id.to_string(), record);
            Ok(())
        }

        async fn last_sync_time(&self) -> Result<Option<i64>> {
            Ok(None)
        }

        async fn clear_all(&self) -> Result<()> {
            self.records.lock().await.clear();
            Ok(())
        }
    }

    struct MockGateway {
        responses: Mutex<Vec<std::result::Result<BatchRunData, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl MockGateway {
        fn new(responses: Vec<std::result::Result<BatchRunData, GatewayError>>) -> Self {
            Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl SyncGateway for MockGateway {
        async fn upload_batch(
            &self,
            _request: &BatchRunRequest,
        ) -> std::result::Result<BatchRunData, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .await
                .pop()
                .unwrap_or(Err(GatewayError::Network("no response queued".to_string())))
        }
    }

    struct MockProvider {
        gateway: Option<Arc<dyn SyncGateway>>,
    }

    #[async_trait]
    impl SyncGatewayProvider for MockProvider {
        async fn gateway(&self) -> Option<Arc<dyn SyncGateway>> {
            self.gateway.clone()
        }
    }

    struct MockTelemetry {
        fail_detail: bool,
        detail_calls: AtomicUsize,
    }

    impl MockTelemetry {
        fn new() -> Self {
            Self { fail_detail: false, detail_calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { fail_detail: true, detail_calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl TelemetrySource for MockTelemetry {
        async fn load_run_sessions(&self) -> Result<Vec<RunSession>> {
            Ok(Vec::new())
        }

        async fn load_run_sessions_after(
            &self,
            _after: chrono::DateTime<Utc>,
        ) -> Result<Vec<RunSession>> {
            Ok(Vec::new())
        }

        async fn load_run_detail(
            &self,
            session_id: &str,
            start: chrono::DateTime<Utc>,
            end: chrono::DateTime<Utc>,
        ) -> Result<RunDetail> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_detail {
                return Err(StrideError::Telemetry("sensor store unavailable".to_string()));
            }
            let session = sample_session(session_id, start, end);
            Ok(RunDetail {
                session,
                total_steps: 4200,
                heart_rate_samples: vec![HeartRateSample { timestamp: start, bpm: 150 }],
                pace_samples: Vec::new(),
                splits: Vec::new(),
            })
        }
    }

    fn sample_session(
        id: &str,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> RunSession {
        RunSession {
            id: id.to_string(),
            start_time: start,
            end_time: end,
            distance_meters: 5000.0,
            active_duration: end - start,
            average_pace_seconds_per_km: Some(300.0),
            average_heart_rate_bpm: Some(152),
            title: "Morning run".to_string(),
        }
    }

    fn sessions(count: usize) -> Vec<RunSession> {
        let base = Utc.with_ymd_and_hms(2025, 6, 21, 7, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let start = base + Duration::hours(i as i64 * 24);
                sample_session(&format!("run-{i}"), start, start + Duration::minutes(25))
            })
            .collect()
    }

    fn created_item(index: usize, id: i64) -> BatchResultItem {
        BatchResultItem {
            index,
            status: "created".to_string(),
            id: Some(id),
            already_synced: None,
        }
    }

    fn service_with(
        gateway: Option<Arc<dyn SyncGateway>>,
        store: Arc<MockStateStore>,
        telemetry: Arc<MockTelemetry>,
    ) -> SyncService {
        SyncService::new(Arc::new(MockProvider { gateway }), store, telemetry)
    }

    #[tokio::test]
    async fn skipped_item_marks_session_synced_with_server_id() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 0,
            skipped: 1,
            results: vec![BatchResultItem {
                index: 0,
                status: "skipped".to_string(),
                id: Some(7),
                already_synced: Some(true),
            }],
        })]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(1)).await;

        assert_eq!(outcome, SyncOutcome::Success { synced: 1, total: 1 });
        let record = store.record("run-0").await.unwrap();
        assert_eq!(record.state, SyncState::Synced);
        assert_eq!(record.server_id, Some(7));
    }

    #[tokio::test]
    async fn network_failure_marks_all_attempted_sessions_failed() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Err(GatewayError::Network(
            "connection reset".to_string(),
        ))]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(2)).await;

        assert_eq!(outcome, SyncOutcome::Error("connection reset".to_string()));
        for id in ["run-0", "run-1"] {
            let record = store.record(id).await.unwrap();
            assert_eq!(record.state, SyncState::Failed);
            assert_eq!(record.failure_message.as_deref(), Some("connection reset"));
        }
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit_without_network_calls() {
        let store = Arc::new(MockStateStore::new());
        let service = service_with(None, store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(3)).await;

        assert_eq!(outcome, SyncOutcome::NotConnected);
        assert!(store.record("run-0").await.is_none());
    }

    #[tokio::test]
    async fn fully_synced_set_uploads_nothing() {
        let store = Arc::new(MockStateStore::new());
        store.mark_synced("run-0", 11).await.unwrap();
        store.mark_synced("run-1", 12).await.unwrap();
        let gateway = Arc::new(MockGateway::new(Vec::new()));
        let service =
            service_with(Some(gateway.clone()), store, Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(2)).await;

        assert_eq!(outcome, SyncOutcome::Success { synced: 0, total: 2 });
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_sync_is_idempotent() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 2,
            skipped: 0,
            results: vec![created_item(0, 1), created_item(1, 2)],
        })]));
        let service = service_with(
            Some(gateway.clone()),
            store,
            Arc::new(MockTelemetry::new()),
        );
        let runs = sessions(2);

        let first = service.sync_sessions(&runs).await;
        let second = service.sync_sessions(&runs).await;

        assert_eq!(first, SyncOutcome::Success { synced: 2, total: 2 });
        assert_eq!(second, SyncOutcome::Success { synced: 0, total: 2 });
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_unsynced_sessions_are_uploaded() {
        let store = Arc::new(MockStateStore::new());
        store.mark_synced("run-0", 31).await.unwrap();
        store.mark_failed("run-1", "earlier failure").await.unwrap();
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 2,
            skipped: 0,
            // Index is positional within the unsynced subset: run-1, run-2.
            results: vec![created_item(0, 41), created_item(1, 42)],
        })]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(3)).await;

        assert_eq!(outcome, SyncOutcome::Success { synced: 2, total: 3 });
        assert_eq!(store.record("run-0").await.unwrap().server_id, Some(31));
        assert_eq!(store.record("run-1").await.unwrap().server_id, Some(41));
        assert_eq!(store.record("run-2").await.unwrap().server_id, Some(42));
    }

    #[tokio::test]
    async fn failure_status_marks_session_failed_with_status_text() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 1,
            skipped: 0,
            results: vec![
                created_item(0, 51),
                BatchResultItem {
                    index: 1,
                    status: "duplicate_conflict".to_string(),
                    id: None,
                    already_synced: None,
                },
            ],
        })]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(2)).await;

        assert_eq!(outcome, SyncOutcome::Success { synced: 1, total: 2 });
        let failed = store.record("run-1").await.unwrap();
        assert_eq!(failed.state, SyncState::Failed);
        assert_eq!(failed.failure_message.as_deref(), Some("duplicate_conflict"));
    }

    #[tokio::test]
    async fn out_of_bounds_index_and_missing_id_are_ignored() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 1,
            skipped: 0,
            results: vec![
                created_item(5, 99),
                BatchResultItem {
                    index: 0,
                    status: "created".to_string(),
                    id: None,
                    already_synced: None,
                },
            ],
        })]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(1)).await;

        // The malformed items leave the session pending for the next pass.
        assert_eq!(outcome, SyncOutcome::Success { synced: 1, total: 1 });
        let record = store.record("run-0").await.unwrap();
        assert_eq!(record.state, SyncState::Pending);
        assert_eq!(record.server_id, None);
    }

    #[tokio::test]
    async fn unauthorized_response_leaves_sessions_pending() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Err(GatewayError::Unauthorized)]));
        let service =
            service_with(Some(gateway), store.clone(), Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(1)).await;

        assert_eq!(outcome, SyncOutcome::Unauthorized);
        assert_eq!(store.record("run-0").await.unwrap().state, SyncState::Pending);
    }

    #[tokio::test]
    async fn validation_rejection_maps_to_fixed_message() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Err(GatewayError::Validation)]));
        let service = service_with(Some(gateway), store, Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(1)).await;

        assert_eq!(outcome, SyncOutcome::Error("Validation error from server".to_string()));
    }

    #[tokio::test]
    async fn other_server_errors_report_the_status_code() {
        let store = Arc::new(MockStateStore::new());
        let gateway = Arc::new(MockGateway::new(vec![Err(GatewayError::Http(503))]));
        let service = service_with(Some(gateway), store, Arc::new(MockTelemetry::new()));

        let outcome = service.sync_sessions(&sessions(1)).await;

        assert_eq!(outcome, SyncOutcome::Error("Server returned 503".to_string()));
    }

    #[tokio::test]
    async fn detail_failure_falls_back_to_aggregate_upload() {
        let store = Arc::new(MockStateStore::new());
        let telemetry = Arc::new(MockTelemetry::failing());
        let gateway = Arc::new(MockGateway::new(vec![Ok(BatchRunData {
            created: 1,
            skipped: 0,
            results: vec![created_item(0, 61)],
        })]));
        let service = service_with(Some(gateway), store.clone(), telemetry.clone());

        let outcome = service.sync_sessions(&sessions(1)).await;

        // Enrichment failure never aborts the batch.
        assert_eq!(outcome, SyncOutcome::Success { synced: 1, total: 1 });
        assert_eq!(telemetry.detail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.record("run-0").await.unwrap().state, SyncState::Synced);
    }
}
