//! Scenario tests for the sync engine
//!
//! Exercises the reconcile state machine, conflict resolution, debounced
//! auto-sync and sign-out against mock ports that record every remote call.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

use mizan_core::domain::ledger::{AssetField, LedgerStore};
use mizan_core::domain::newtypes::{BearerToken, FileId};
use mizan_core::domain::sync::{SyncMeta, SyncStatus};
use mizan_core::ports::auth_gate::IAuthGate;
use mizan_core::ports::local_store::{ILocalStore, LocalStoreError, LEDGER_KEY, SYNC_META_KEY};
use mizan_core::ports::notification::{INotifier, Toast};
use mizan_core::ports::remote_store::{IRemoteStore, RemoteFile, RemoteStoreError};
use mizan_drive::session::TokenSession;
use mizan_sync::engine::{ForceSyncOutcome, ReconcileOutcome, ResolutionOutcome, SyncEngine};
use mizan_sync::session::SyncSession;

// ============================================================================
// Mock ports
// ============================================================================

/// Remote store double that records every call
#[derive(Default)]
struct MockRemote {
    /// Scripted responses for successive `find` calls (default: no file)
    find_responses: StdMutex<VecDeque<Result<Option<RemoteFile>, RemoteStoreError>>>,
    /// Scripted response for `download`
    download_response: StdMutex<Option<Result<Vec<u8>, RemoteStoreError>>>,
    /// When set, create/update fail with HTTP 500
    fail_uploads: AtomicBool,
    find_calls: AtomicUsize,
    created_payloads: StdMutex<Vec<Vec<u8>>>,
    updated_payloads: StdMutex<Vec<(FileId, Vec<u8>)>>,
    download_calls: StdMutex<Vec<FileId>>,
}

impl MockRemote {
    fn push_find(&self, response: Result<Option<RemoteFile>, RemoteStoreError>) {
        self.find_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    fn set_download(&self, response: Result<Vec<u8>, RemoteStoreError>) {
        *self.download_response.lock().unwrap() = Some(response);
    }

    fn upload_count(&self) -> usize {
        self.created_payloads.lock().unwrap().len() + self.updated_payloads.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl IRemoteStore for MockRemote {
    async fn find(&self) -> Result<Option<RemoteFile>, RemoteStoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.find_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn create(&self, payload: &[u8]) -> Result<RemoteFile, RemoteStoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Http { status: 500 });
        }
        self.created_payloads
            .lock()
            .unwrap()
            .push(payload.to_vec());
        Ok(RemoteFile {
            id: FileId::new("created-file").unwrap(),
            modified_time: Utc::now(),
        })
    }

    async fn update(&self, id: &FileId, payload: &[u8]) -> Result<(), RemoteStoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Http { status: 500 });
        }
        self.updated_payloads
            .lock()
            .unwrap()
            .push((id.clone(), payload.to_vec()));
        Ok(())
    }

    async fn download(&self, id: &FileId) -> Result<Vec<u8>, RemoteStoreError> {
        self.download_calls.lock().unwrap().push(id.clone());
        self.download_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(RemoteStoreError::NoRemoteFile))
    }
}

/// In-memory local store double
#[derive(Default)]
struct MockLocal {
    records: StdMutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl ILocalStore for MockLocal {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Toast collector
#[derive(Default)]
struct CollectingNotifier {
    toasts: StdMutex<Vec<Toast>>,
}

#[async_trait::async_trait]
impl INotifier for CollectingNotifier {
    async fn toast(&self, toast: &Toast) -> anyhow::Result<()> {
        self.toasts.lock().unwrap().push(toast.clone());
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    remote: Arc<MockRemote>,
    local: Arc<MockLocal>,
    ledger: Arc<Mutex<LedgerStore>>,
    auth: Arc<TokenSession>,
    #[allow(dead_code)]
    notifier: Arc<CollectingNotifier>,
    engine: SyncEngine,
}

fn authed_fixture() -> Fixture {
    build_fixture(Some(BearerToken::new("test-token").unwrap()))
}

fn build_fixture(token: Option<BearerToken>) -> Fixture {
    let remote = Arc::new(MockRemote::default());
    let local = Arc::new(MockLocal::default());
    let ledger = Arc::new(Mutex::new(LedgerStore::new()));
    let auth = Arc::new(match token {
        Some(token) => TokenSession::with_token(token),
        None => TokenSession::new(),
    });
    let notifier = Arc::new(CollectingNotifier::default());

    let engine = SyncEngine::new(
        Arc::clone(&remote) as Arc<dyn IRemoteStore>,
        Arc::clone(&local) as Arc<dyn ILocalStore>,
        Arc::clone(&ledger),
        Arc::clone(&auth) as Arc<dyn IAuthGate>,
        Arc::clone(&notifier) as Arc<dyn INotifier>,
    );

    Fixture {
        remote,
        local,
        ledger,
        auth,
        notifier,
        engine,
    }
}

fn remote_file(id: &str, modified: DateTime<Utc>) -> RemoteFile {
    RemoteFile {
        id: FileId::new(id).unwrap(),
        modified_time: modified,
    }
}

async fn record_last_sync(local: &MockLocal, at: DateTime<Utc>) {
    let meta = SyncMeta { last_modified: at };
    local.set(SYNC_META_KEY, &meta.to_json()).await.unwrap();
}

// ============================================================================
// Reconcile
// ============================================================================

#[tokio::test]
async fn test_reconcile_without_session_is_a_noop() {
    let fx = build_fixture(None);

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::NoSession);
    assert_eq!(fx.remote.find_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.engine.status(), SyncStatus::Offline);
}

#[tokio::test]
async fn test_reconcile_with_no_remote_file_creates_upload() {
    let fx = authed_fixture();
    fx.ledger
        .lock()
        .await
        .set_asset(AssetField::Cash, 100_000.0);

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::Synced);
    assert_eq!(fx.engine.status(), SyncStatus::Synced);

    // Exactly one create, zero updates.
    let created = fx.remote.created_payloads.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert!(fx.remote.updated_payloads.lock().unwrap().is_empty());

    // The payload carries the local ledger.
    let payload: serde_json::Value = serde_json::from_slice(&created[0]).unwrap();
    assert_eq!(payload["calculator"]["assets"]["cash"], 100_000.0);
    assert_eq!(payload["version"], 1);

    // Sync metadata was recorded, and the new handle is cached.
    assert!(fx.local.get(SYNC_META_KEY).await.unwrap().is_some());
    assert_eq!(
        fx.engine.cached_handle(),
        Some(FileId::new("created-file").unwrap())
    );
}

#[tokio::test]
async fn test_reconcile_with_newer_remote_enters_conflict_pending() {
    let fx = authed_fixture();
    fx.ledger.lock().await.set_asset(AssetField::Cash, 777.0);

    let last_sync = Utc::now() - ChronoDuration::hours(2);
    record_last_sync(&fx.local, last_sync).await;

    let remote_modified = Utc::now();
    fx.remote
        .push_find(Ok(Some(remote_file("cloud-1", remote_modified))));

    let ledger_before = fx.ledger.lock().await.clone();
    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::ConflictPending { remote_modified });

    // Zero uploads, zero ledger mutations, zero downloads.
    assert_eq!(fx.remote.upload_count(), 0);
    assert!(fx.remote.download_calls.lock().unwrap().is_empty());
    assert_eq!(*fx.ledger.lock().await, ledger_before);

    // The conflict carries the remote timestamp for the user prompt.
    let pending = fx.engine.pending_conflict().expect("conflict pending");
    assert_eq!(pending.remote_modified(), remote_modified);

    // Sync metadata was not overwritten while suspended.
    let raw = fx.local.get(SYNC_META_KEY).await.unwrap().unwrap();
    assert_eq!(
        SyncMeta::parse_lenient(&raw).unwrap().last_modified,
        last_sync
    );
}

#[tokio::test]
async fn test_reconcile_with_no_local_record_treats_remote_as_newer() {
    let fx = authed_fixture();
    fx.remote
        .push_find(Ok(Some(remote_file("cloud-1", Utc::now()))));

    let outcome = fx.engine.reconcile().await;

    assert!(matches!(outcome, ReconcileOutcome::ConflictPending { .. }));
    assert_eq!(fx.remote.upload_count(), 0);
}

#[tokio::test]
async fn test_reconcile_with_older_remote_uploads_silently() {
    let fx = authed_fixture();
    record_last_sync(&fx.local, Utc::now()).await;

    let remote_modified = Utc::now() - ChronoDuration::hours(1);
    fx.remote
        .push_find(Ok(Some(remote_file("cloud-1", remote_modified))));

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::Synced);
    assert_eq!(fx.engine.status(), SyncStatus::Synced);
    assert!(fx.engine.pending_conflict().is_none());

    // Update against the discovered handle, no create.
    let updated = fx.remote.updated_payloads.lock().unwrap().clone();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0.as_str(), "cloud-1");
    assert!(fx.remote.created_payloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reconcile_with_equal_timestamps_keeps_local() {
    let fx = authed_fixture();
    let t = Utc::now();
    record_last_sync(&fx.local, t).await;
    fx.remote.push_find(Ok(Some(remote_file("cloud-1", t))));

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::Synced);
    assert_eq!(fx.remote.updated_payloads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconcile_remote_lookup_failure_sets_error_status() {
    let fx = authed_fixture();
    fx.remote
        .push_find(Err(RemoteStoreError::Unavailable("dns".to_string())));

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
    assert_eq!(fx.remote.upload_count(), 0);
}

#[tokio::test]
async fn test_reconcile_upload_failure_sets_error_status() {
    let fx = authed_fixture();
    fx.remote.fail_uploads.store(true, Ordering::SeqCst);

    let outcome = fx.engine.reconcile().await;

    assert_eq!(outcome, ReconcileOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
    // No metadata persisted for a failed upload.
    assert!(fx.local.get(SYNC_META_KEY).await.unwrap().is_none());
}

// ============================================================================
// Conflict resolution
// ============================================================================

/// Drives the engine into conflict-pending against `cloud-1`
async fn enter_conflict(fx: &Fixture) {
    record_last_sync(&fx.local, Utc::now() - ChronoDuration::hours(2)).await;
    fx.remote
        .push_find(Ok(Some(remote_file("cloud-1", Utc::now()))));
    let outcome = fx.engine.reconcile().await;
    assert!(matches!(outcome, ReconcileOutcome::ConflictPending { .. }));
}

#[tokio::test]
async fn test_resolve_keep_local_uploads_and_clears_conflict() {
    let fx = authed_fixture();
    fx.ledger.lock().await.set_asset(AssetField::Cash, 42.0);
    enter_conflict(&fx).await;

    let outcome = fx.engine.resolve_keep_local().await;

    assert_eq!(outcome, ResolutionOutcome::Synced);
    assert_eq!(fx.engine.status(), SyncStatus::Synced);
    assert!(fx.engine.pending_conflict().is_none());

    // The local snapshot overwrote the discovered remote file in place.
    let updated = fx.remote.updated_payloads.lock().unwrap().clone();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0.as_str(), "cloud-1");
    let payload: serde_json::Value = serde_json::from_slice(&updated[0].1).unwrap();
    assert_eq!(payload["calculator"]["assets"]["cash"], 42.0);
}

#[tokio::test]
async fn test_resolve_use_cloud_downloads_and_applies() {
    let fx = authed_fixture();
    fx.ledger.lock().await.set_asset(AssetField::Cash, 42.0);
    enter_conflict(&fx).await;

    let cloud = serde_json::json!({
        "version": 1,
        "lastModified": "2026-07-01T00:00:00Z",
        "calculator": { "assets": { "cash": 9_999.0 } },
        "tracker": { "payments": [] }
    });
    fx.remote.set_download(Ok(cloud.to_string().into_bytes()));

    let outcome = fx.engine.resolve_use_cloud().await;

    assert_eq!(outcome, ResolutionOutcome::Synced);
    assert_eq!(fx.engine.status(), SyncStatus::Synced);
    assert!(fx.engine.pending_conflict().is_none());

    // Download happened against the pending handle; the ledger adopted it.
    assert_eq!(fx.remote.download_calls.lock().unwrap().len(), 1);
    assert_eq!(fx.ledger.lock().await.calculator().assets.cash, 9_999.0);

    // Ledger snapshot and fresh sync metadata were persisted.
    assert!(fx.local.get(LEDGER_KEY).await.unwrap().is_some());
    assert!(fx.local.get(SYNC_META_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_resolve_use_cloud_failure_keeps_local_and_clears_conflict() {
    let fx = authed_fixture();
    fx.ledger.lock().await.set_asset(AssetField::Cash, 42.0);
    enter_conflict(&fx).await;

    fx.remote
        .set_download(Err(RemoteStoreError::Http { status: 500 }));

    let outcome = fx.engine.resolve_use_cloud().await;

    assert_eq!(outcome, ResolutionOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
    // Conflict is cleared regardless of failure: no automatic re-prompt.
    assert!(fx.engine.pending_conflict().is_none());
    // Local data untouched.
    assert_eq!(fx.ledger.lock().await.calculator().assets.cash, 42.0);
}

#[tokio::test]
async fn test_resolve_use_cloud_rejects_incompatible_schema() {
    let fx = authed_fixture();
    fx.ledger.lock().await.set_asset(AssetField::Cash, 42.0);
    enter_conflict(&fx).await;

    let cloud = serde_json::json!({
        "version": 99,
        "calculator": { "assets": { "cash": 1.0 } }
    });
    fx.remote.set_download(Ok(cloud.to_string().into_bytes()));

    let outcome = fx.engine.resolve_use_cloud().await;

    assert_eq!(outcome, ResolutionOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
    assert_eq!(fx.ledger.lock().await.calculator().assets.cash, 42.0);
}

#[tokio::test]
async fn test_resolve_use_cloud_garbage_payload_keeps_local() {
    let fx = authed_fixture();
    enter_conflict(&fx).await;
    fx.remote.set_download(Ok(b"not json at all".to_vec()));

    let outcome = fx.engine.resolve_use_cloud().await;

    assert_eq!(outcome, ResolutionOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
}

#[tokio::test]
async fn test_resolutions_without_conflict_are_noops() {
    let fx = authed_fixture();

    assert_eq!(
        fx.engine.resolve_keep_local().await,
        ResolutionOutcome::NoConflict
    );
    assert_eq!(
        fx.engine.resolve_use_cloud().await,
        ResolutionOutcome::NoConflict
    );
    assert_eq!(fx.remote.upload_count(), 0);
}

// ============================================================================
// Manual sync
// ============================================================================

#[tokio::test]
async fn test_force_sync_without_session_requests_sign_in() {
    let fx = build_fixture(None);

    let outcome = fx.engine.force_sync().await;

    assert_eq!(outcome, ForceSyncOutcome::SignInRequested);
    assert!(fx.auth.take_sign_in_request());
    assert_eq!(fx.remote.upload_count(), 0);
}

#[tokio::test]
async fn test_force_sync_uploads_immediately() {
    let fx = authed_fixture();

    let outcome = fx.engine.force_sync().await;

    assert_eq!(outcome, ForceSyncOutcome::Synced);
    assert_eq!(fx.engine.status(), SyncStatus::Synced);
    assert_eq!(fx.remote.upload_count(), 1);
}

#[tokio::test]
async fn test_force_sync_failure_surfaces_error() {
    let fx = authed_fixture();
    fx.remote.fail_uploads.store(true, Ordering::SeqCst);

    let outcome = fx.engine.force_sync().await;

    assert_eq!(outcome, ForceSyncOutcome::Failed);
    assert_eq!(fx.engine.status(), SyncStatus::Error);
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_sign_out_clears_handle_meta_and_conflict() {
    let fx = authed_fixture();
    enter_conflict(&fx).await;
    assert!(fx.engine.cached_handle().is_some());

    fx.engine.sign_out().await;

    assert!(fx.engine.cached_handle().is_none());
    assert!(fx.engine.pending_conflict().is_none());
    assert!(fx.local.get(SYNC_META_KEY).await.unwrap().is_none());
    assert_eq!(fx.engine.status(), SyncStatus::Offline);
}

#[tokio::test]
async fn test_sign_in_after_sign_out_rediscovers_remote_file() {
    let fx = authed_fixture();

    // First session: remote exists, local is current, silent upload.
    record_last_sync(&fx.local, Utc::now()).await;
    fx.remote
        .push_find(Ok(Some(remote_file("old-file", Utc::now() - ChronoDuration::hours(1)))));
    assert_eq!(fx.engine.reconcile().await, ReconcileOutcome::Synced);

    fx.engine.sign_out().await;

    // Second session: a different remote file now exists. With the cleared
    // metadata, discovery must re-run and the remote must win arbitration.
    let new_modified = Utc::now();
    fx.remote
        .push_find(Ok(Some(remote_file("new-file", new_modified))));

    let outcome = fx.engine.reconcile().await;

    assert_eq!(fx.remote.find_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        outcome,
        ReconcileOutcome::ConflictPending {
            remote_modified: new_modified
        }
    );
    let pending = fx.engine.pending_conflict().expect("conflict");
    assert_eq!(pending.remote.id.as_str(), "new-file");
}

// ============================================================================
// Debounced auto-sync (through the session layer)
// ============================================================================

struct SessionFixture {
    remote: Arc<MockRemote>,
    ledger: Arc<Mutex<LedgerStore>>,
    session: SyncSession,
}

fn session_fixture(token: Option<BearerToken>, debounce: Duration) -> SessionFixture {
    let remote = Arc::new(MockRemote::default());
    let local = Arc::new(MockLocal::default());
    let ledger = Arc::new(Mutex::new(LedgerStore::new()));
    let auth = Arc::new(match token {
        Some(token) => TokenSession::with_token(token),
        None => TokenSession::new(),
    });
    let notifier = Arc::new(CollectingNotifier::default());

    let session = SyncSession::create(
        Arc::clone(&remote) as Arc<dyn IRemoteStore>,
        local as Arc<dyn ILocalStore>,
        Arc::clone(&ledger),
        auth as Arc<dyn IAuthGate>,
        notifier as Arc<dyn INotifier>,
        debounce,
    );

    SessionFixture {
        remote,
        ledger,
        session,
    }
}

const DEBOUNCE: Duration = Duration::from_millis(3000);

#[tokio::test(start_paused = true)]
async fn test_rapid_mutations_produce_exactly_one_upload() {
    let fx = session_fixture(Some(BearerToken::new("tok").unwrap()), DEBOUNCE);

    // The seeded token triggers an initial reconcile (no remote file →
    // one create). Let it finish before counting debounce uploads.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let baseline = fx.remote.upload_count();

    // A burst of edits inside the debounce window.
    for amount in [1.0, 2.0, 3.0, 4.0, 100_000.0] {
        fx.ledger.lock().await.set_asset(AssetField::Cash, amount);
        fx.session.note_mutation();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // Let the window elapse.
    tokio::time::sleep(DEBOUNCE * 2).await;

    assert_eq!(fx.remote.upload_count(), baseline + 1);

    // The single upload carries the final state of the burst.
    let updated = fx.remote.updated_payloads.lock().unwrap().clone();
    let (_, payload) = updated.last().expect("one debounced update");
    let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
    assert_eq!(value["calculator"]["assets"]["cash"], 100_000.0);
}

#[tokio::test(start_paused = true)]
async fn test_each_mutation_resets_the_debounce_window() {
    let fx = session_fixture(Some(BearerToken::new("tok").unwrap()), DEBOUNCE);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let baseline = fx.remote.upload_count();

    // Mutations spaced at two-thirds of the window: each resets the timer,
    // so no upload may fire until the final quiet period.
    for _ in 0..3 {
        fx.session.note_mutation();
        tokio::time::sleep(DEBOUNCE * 2 / 3).await;
        assert_eq!(fx.remote.upload_count(), baseline);
    }

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(fx.remote.upload_count(), baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn test_mutation_without_session_never_schedules() {
    let fx = session_fixture(None, DEBOUNCE);

    fx.session.note_mutation();
    tokio::time::sleep(DEBOUNCE * 3).await;

    assert_eq!(fx.remote.upload_count(), 0);
    assert_eq!(fx.session.engine().status(), SyncStatus::Offline);
}

#[tokio::test(start_paused = true)]
async fn test_force_sync_supersedes_pending_debounce() {
    let fx = session_fixture(Some(BearerToken::new("tok").unwrap()), DEBOUNCE);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let baseline = fx.remote.upload_count();

    fx.session.note_mutation();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Manual sync cancels the pending debounce and uploads immediately.
    let outcome = fx.session.force_sync().await;
    assert_eq!(outcome, ForceSyncOutcome::Synced);
    assert_eq!(fx.remote.upload_count(), baseline + 1);

    // The cancelled debounce never fires a second upload.
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(fx.remote.upload_count(), baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn test_mutation_during_conflict_pending_does_not_upload() {
    let fx = session_fixture(Some(BearerToken::new("tok").unwrap()), DEBOUNCE);

    // Let the seeded-token reconcile finish (no remote file, one create).
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Drive the engine into conflict-pending: clear the recorded sync state
    // and present a remote file, so arbitration must favor the remote.
    fx.session.engine().sign_out().await;
    fx.remote
        .push_find(Ok(Some(remote_file("cloud-1", Utc::now()))));
    let outcome = fx.session.engine().reconcile().await;
    assert!(matches!(outcome, ReconcileOutcome::ConflictPending { .. }));
    let baseline = fx.remote.upload_count();

    // Edits while suspended must not trigger the auto-upload.
    fx.ledger.lock().await.set_asset(AssetField::Cash, 5.0);
    fx.session.note_mutation();
    tokio::time::sleep(DEBOUNCE * 3).await;

    assert_eq!(fx.remote.upload_count(), baseline);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_flushes_pending_upload() {
    let fx = session_fixture(Some(BearerToken::new("tok").unwrap()), DEBOUNCE);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let baseline = fx.remote.upload_count();

    fx.ledger.lock().await.set_asset(AssetField::Cash, 55.0);
    fx.session.note_mutation();

    // Dispose before the window elapses: the edit must still be uploaded.
    fx.session.dispose().await;

    assert_eq!(fx.remote.upload_count(), baseline + 1);
}
