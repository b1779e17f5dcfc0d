//! The synchronization engine
//!
//! [`SyncEngine`] orchestrates reconciliation between the local ledger and
//! the remote copy, using the ledger store's snapshots as its payload.
//!
//! ## State machine
//!
//! `offline → syncing → {synced | error}`, plus a conflict-pending
//! sub-state that suspends automatic resolution until the user chooses a
//! side. Status is published over a watch channel; conflict-pending is
//! carried separately while status remains `syncing`.
//!
//! ## Flow
//!
//! 1. **Session start** (token arrives): [`reconcile`](SyncEngine::reconcile)
//! 2. No remote file → local is authoritative, create-upload
//! 3. Remote found → compare its `modifiedTime` against the *persisted*
//!    sync metadata; strictly newer remote suspends, otherwise update-upload
//! 4. User resolves: [`resolve_use_cloud`](SyncEngine::resolve_use_cloud) /
//!    [`resolve_keep_local`](SyncEngine::resolve_keep_local)
//!
//! All adapter failures are contained here: they become a status transition
//! plus an optional toast, never an escaped error. A stale in-flight
//! response cannot interleave with a newer transfer because every remote
//! operation serializes on one gate; requests themselves are never
//! cancelled. Cross-process races (two devices editing at once) resolve at
//! whole-snapshot granularity, last writer wins.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use mizan_core::domain::ledger::LedgerStore;
use mizan_core::domain::newtypes::FileId;
use mizan_core::domain::snapshot::ApplyOutcome;
use mizan_core::domain::sync::{SyncMeta, SyncStatus};
use mizan_core::ports::auth_gate::IAuthGate;
use mizan_core::ports::local_store::{ILocalStore, LEDGER_KEY, SYNC_META_KEY};
use mizan_core::ports::notification::{INotifier, Toast};
use mizan_core::ports::remote_store::IRemoteStore;

use crate::conflict::{self, Arbitration, PendingConflict};
use crate::SyncError;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No authenticated session; nothing was attempted
    NoSession,
    /// Local and remote agree again (a create or update upload succeeded)
    Synced,
    /// Remote is newer; suspended awaiting a user decision
    ConflictPending {
        remote_modified: chrono::DateTime<chrono::Utc>,
    },
    /// A transfer failed; status is `error` and the next trigger re-attempts
    Failed,
}

/// Result of resolving a pending conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// There was no conflict to resolve
    NoConflict,
    /// The chosen side won and both copies agree again
    Synced,
    /// The resolution transfer failed; the conflict stays cleared
    Failed,
}

/// Result of a user-initiated immediate sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceSyncOutcome {
    /// No session: interpreted as "start one", delegated to the auth gate
    SignInRequested,
    /// The upload succeeded
    Synced,
    /// The upload failed
    Failed,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// The sync state machine
///
/// ## Dependencies
///
/// - `remote`: the single-file remote object store
/// - `local`: device-local persistence (ledger snapshot + sync metadata)
/// - `ledger`: the shared ledger store; mutated only through its apply API
/// - `auth`: the bearer-token capability
/// - `notifier`: the user-feedback side channel
pub struct SyncEngine {
    remote: Arc<dyn IRemoteStore>,
    local: Arc<dyn ILocalStore>,
    ledger: Arc<Mutex<LedgerStore>>,
    auth: Arc<dyn IAuthGate>,
    notifier: Arc<dyn INotifier>,
    /// Publishes the observable status projection
    status_tx: watch::Sender<SyncStatus>,
    /// Remote file handle cached for the session once discovered
    remote_handle: StdMutex<Option<FileId>>,
    /// The suspended divergence, if any
    conflict: StdMutex<Option<PendingConflict>>,
    /// Serializes all in-flight transfers (reconcile, debounce fire,
    /// manual sync, resolutions); guarantees at most one upload per trigger
    transfer_gate: Mutex<()>,
}

impl SyncEngine {
    /// Creates a new engine in the `offline` state
    pub fn new(
        remote: Arc<dyn IRemoteStore>,
        local: Arc<dyn ILocalStore>,
        ledger: Arc<Mutex<LedgerStore>>,
        auth: Arc<dyn IAuthGate>,
        notifier: Arc<dyn INotifier>,
    ) -> Self {
        let (status_tx, _rx) = watch::channel(SyncStatus::Offline);
        Self {
            remote,
            local,
            ledger,
            auth,
            notifier,
            status_tx,
            remote_handle: StdMutex::new(None),
            conflict: StdMutex::new(None),
            transfer_gate: Mutex::new(()),
        }
    }

    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Returns the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_tx.borrow()
    }

    /// Subscribes to status transitions
    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Returns the suspended conflict, if reconciliation found one
    pub fn pending_conflict(&self) -> Option<PendingConflict> {
        self.conflict
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the cached remote file handle, if discovered this session
    pub fn cached_handle(&self) -> Option<FileId> {
        self.remote_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_status(&self, status: SyncStatus) {
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            debug!(from = %previous, to = %status, "Sync status changed");
        }
    }

    /// Marks the engine offline (token gone); keeps conflict and handle
    /// clearing to the explicit sign-out path
    pub fn mark_offline(&self) {
        self.set_status(SyncStatus::Offline);
    }

    fn set_handle(&self, handle: Option<FileId>) {
        *self
            .remote_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = handle;
    }

    fn set_conflict(&self, conflict: Option<PendingConflict>) {
        *self.conflict.lock().unwrap_or_else(|e| e.into_inner()) = conflict;
    }

    fn take_conflict(&self) -> Option<PendingConflict> {
        self.conflict
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Compares local and remote copies and decides the sync action
    ///
    /// Triggered on session start (including silent token restoration) and
    /// by explicit pulls. Never mutates the ledger: a newer remote suspends
    /// into conflict-pending instead.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> ReconcileOutcome {
        if self.auth.current_token().is_none() {
            debug!("Reconcile skipped: no authenticated session");
            return ReconcileOutcome::NoSession;
        }

        let _gate = self.transfer_gate.lock().await;
        self.set_status(SyncStatus::Syncing);

        let found = match self.remote.find().await {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "Remote lookup failed");
                self.set_status(SyncStatus::Error);
                self.notify(Toast::error("Sync failed: could not reach cloud storage"))
                    .await;
                return ReconcileOutcome::Failed;
            }
        };

        match found {
            None => {
                // Nothing in the cloud yet: local is authoritative.
                info!("No remote ledger found, uploading local copy");
                match self.upload_current().await {
                    Ok(()) => {
                        self.set_status(SyncStatus::Synced);
                        ReconcileOutcome::Synced
                    }
                    Err(err) => {
                        warn!(error = %err, "Initial upload failed");
                        self.set_status(SyncStatus::Error);
                        ReconcileOutcome::Failed
                    }
                }
            }
            Some(remote) => {
                self.set_handle(Some(remote.id.clone()));

                let recorded = self.load_sync_meta().await.map(|m| m.last_modified);
                match conflict::arbitrate(remote.modified_time, recorded) {
                    Arbitration::RemoteNewer => {
                        info!(
                            remote_modified = %remote.modified_time,
                            recorded = ?recorded,
                            "Remote ledger is newer, awaiting user decision"
                        );
                        let remote_modified = remote.modified_time;
                        self.set_conflict(Some(PendingConflict { remote }));
                        self.notify(Toast::warning(format!(
                            "Cloud data from {} found; choose which copy to keep",
                            remote_modified.to_rfc3339()
                        )))
                        .await;
                        ReconcileOutcome::ConflictPending { remote_modified }
                    }
                    Arbitration::LocalAuthoritative => {
                        debug!("Local ledger is current, uploading silently");
                        match self.upload_current().await {
                            Ok(()) => {
                                self.set_status(SyncStatus::Synced);
                                ReconcileOutcome::Synced
                            }
                            Err(err) => {
                                warn!(error = %err, "Upload failed during reconcile");
                                self.set_status(SyncStatus::Error);
                                ReconcileOutcome::Failed
                            }
                        }
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Conflict resolution
    // ------------------------------------------------------------------

    /// Resolves a pending conflict by adopting the cloud copy
    ///
    /// Downloads the remote payload and merges it through the ledger's
    /// apply API, then records fresh sync metadata. On any failure (parse
    /// error, schema mismatch, network) the conflict stays cleared, the
    /// user is not re-prompted, and local data is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_use_cloud(&self) -> ResolutionOutcome {
        let Some(pending) = self.take_conflict() else {
            debug!("resolve_use_cloud called with no pending conflict");
            return ResolutionOutcome::NoConflict;
        };

        let _gate = self.transfer_gate.lock().await;
        self.set_status(SyncStatus::Syncing);

        match self.adopt_remote(&pending).await {
            Ok(()) => {
                info!("Cloud ledger adopted");
                self.set_status(SyncStatus::Synced);
                self.notify(Toast::success("Cloud data loaded")).await;
                ResolutionOutcome::Synced
            }
            Err(err) => {
                warn!(error = %err, "Failed to adopt cloud ledger");
                self.set_status(SyncStatus::Error);
                self.notify(Toast::error("Sync failed")).await;
                ResolutionOutcome::Failed
            }
        }
    }

    /// Resolves a pending conflict by keeping the local copy
    ///
    /// Uploads the current snapshot over the remote file and records fresh
    /// sync metadata.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_keep_local(&self) -> ResolutionOutcome {
        if self.take_conflict().is_none() {
            debug!("resolve_keep_local called with no pending conflict");
            return ResolutionOutcome::NoConflict;
        };

        let _gate = self.transfer_gate.lock().await;
        self.set_status(SyncStatus::Syncing);

        match self.upload_current().await {
            Ok(()) => {
                info!("Local ledger kept, remote overwritten");
                self.set_status(SyncStatus::Synced);
                self.notify(Toast::success("Data uploaded to cloud")).await;
                ResolutionOutcome::Synced
            }
            Err(err) => {
                warn!(error = %err, "Failed to upload local ledger");
                self.set_status(SyncStatus::Error);
                ResolutionOutcome::Failed
            }
        }
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// User-initiated immediate sync
    ///
    /// Without a session this is interpreted as "start one" and delegated
    /// to the auth gate. The caller (session layer) cancels any pending
    /// debounced upload before invoking this, so the two paths never race.
    #[tracing::instrument(skip(self))]
    pub async fn force_sync(&self) -> ForceSyncOutcome {
        if self.auth.current_token().is_none() {
            info!("Manual sync without session, requesting interactive sign-in");
            self.auth.request_interactive_sign_in();
            return ForceSyncOutcome::SignInRequested;
        }

        let _gate = self.transfer_gate.lock().await;
        self.set_status(SyncStatus::Syncing);

        match self.upload_current().await {
            Ok(()) => {
                self.set_status(SyncStatus::Synced);
                self.notify(Toast::success("Sync complete")).await;
                ForceSyncOutcome::Synced
            }
            Err(err) => {
                warn!(error = %err, "Manual sync failed");
                self.set_status(SyncStatus::Error);
                self.notify(Toast::error("Sync failed")).await;
                ForceSyncOutcome::Failed
            }
        }
    }

    /// Marks the start of a debounced upload window
    ///
    /// Returns false (a no-op) when no session exists (edits made while
    /// signed out are never queued; the next session start re-evaluates
    /// from scratch) or while a conflict is suspended, since automatic
    /// resolution must not overwrite either side before the user decides.
    pub(crate) fn begin_debounce(&self) -> bool {
        if self.auth.current_token().is_none() {
            debug!("Debounce skipped: no authenticated session");
            return false;
        }
        if self.pending_conflict().is_some() {
            debug!("Debounce skipped: conflict awaiting user decision");
            return false;
        }
        self.set_status(SyncStatus::Syncing);
        true
    }

    /// Fires the debounced upload (called by the scheduler on deadline)
    ///
    /// The snapshot is built here, at fire time, so the payload always
    /// carries the final state of an edit burst.
    pub(crate) async fn debounced_upload(&self) {
        if self.auth.current_token().is_none() {
            debug!("Debounced upload skipped: session ended before deadline");
            self.set_status(SyncStatus::Offline);
            return;
        }
        if self.pending_conflict().is_some() {
            debug!("Debounced upload skipped: conflict awaiting user decision");
            return;
        }

        let _gate = self.transfer_gate.lock().await;
        self.set_status(SyncStatus::Syncing);

        match self.upload_current().await {
            Ok(()) => self.set_status(SyncStatus::Synced),
            Err(err) => {
                warn!(error = %err, "Debounced upload failed");
                self.set_status(SyncStatus::Error);
            }
        }
    }

    /// Builds a fresh snapshot and uploads it, creating the remote file if
    /// this session has no handle yet. Persists sync metadata on success.
    ///
    /// Caller must hold the transfer gate.
    async fn upload_current(&self) -> Result<(), SyncError> {
        let snapshot = { self.ledger.lock().await.snapshot() };
        let payload = snapshot
            .to_payload()
            .map_err(|e| SyncError::Encode(e.to_string()))?;

        let cached = self.cached_handle();
        match cached {
            Some(id) => {
                debug!(id = %id, bytes = payload.len(), "Updating remote ledger");
                self.remote.update(&id, &payload).await?;
            }
            None => {
                debug!(bytes = payload.len(), "Creating remote ledger");
                let created = self.remote.create(&payload).await?;
                info!(id = %created.id, "Remote ledger created");
                self.set_handle(Some(created.id));
            }
        }

        self.persist_sync_meta().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sign-out
    // ------------------------------------------------------------------

    /// Clears session-scoped sync state after sign-out
    ///
    /// Drops the cached remote handle and any pending conflict, and removes
    /// the persisted sync metadata so the next sign-in re-runs discovery
    /// and comparison from a clean slate. Remote data is never deleted.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.set_handle(None);
        self.set_conflict(None);

        if let Err(err) = self.local.remove(SYNC_META_KEY).await {
            warn!(error = %err, "Failed to clear sync metadata on sign-out");
        }

        self.set_status(SyncStatus::Offline);
        info!("Sync state cleared after sign-out");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Downloads, validates and applies the remote payload, then persists
    /// the ledger and fresh sync metadata. Caller holds the transfer gate.
    async fn adopt_remote(&self, pending: &PendingConflict) -> Result<(), SyncError> {
        let bytes = self.remote.download(&pending.remote.id).await?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SyncError::Parse(e.to_string()))?;

        {
            let mut ledger = self.ledger.lock().await;
            match ledger.apply_value(&value) {
                ApplyOutcome::Applied => {}
                ApplyOutcome::PartiallyApplied { skipped } => {
                    warn!(?skipped, "Cloud payload partially applied");
                }
                ApplyOutcome::Rejected { reason } => {
                    return Err(SyncError::Rejected(reason.to_string()));
                }
            }
        }

        self.persist_ledger().await;
        self.persist_sync_meta().await;
        Ok(())
    }

    /// Writes the current ledger snapshot to local storage
    async fn persist_ledger(&self) {
        let snapshot = { self.ledger.lock().await.snapshot() };
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "Failed to serialize ledger for persistence");
                return;
            }
        };
        if let Err(err) = self.local.set(LEDGER_KEY, &json).await {
            warn!(error = %err, "Failed to persist ledger snapshot");
            self.notify(Toast::warning("Could not save data on this device"))
                .await;
        }
    }

    /// Records "this device synced now" for future conflict comparison
    async fn persist_sync_meta(&self) {
        let meta = SyncMeta::now();
        if let Err(err) = self.local.set(SYNC_META_KEY, &meta.to_json()).await {
            warn!(error = %err, "Failed to persist sync metadata");
            self.notify(Toast::warning("Could not save sync state on this device"))
                .await;
        }
    }

    /// Loads the recorded last-sync timestamp; corrupt or missing records
    /// read as "never synced"
    async fn load_sync_meta(&self) -> Option<SyncMeta> {
        match self.local.get(SYNC_META_KEY).await {
            Ok(Some(raw)) => SyncMeta::parse_lenient(&raw),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "Failed to read sync metadata");
                None
            }
        }
    }

    /// Fire-and-forget toast delivery
    async fn notify(&self, toast: Toast) {
        if let Err(err) = self.notifier.toast(&toast).await {
            debug!(error = %err, "Toast delivery failed");
        }
    }
}
