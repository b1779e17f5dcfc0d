//! Sync session lifecycle
//!
//! [`SyncSession`] is the one-per-application-run object that owns what
//! would otherwise be module-level shared state: the engine, the debounce
//! scheduler task, and the token-watch task that triggers reconciliation
//! when a session token arrives (sign-in or silent restoration).
//!
//! Created once via [`create`](SyncSession::create), torn down via
//! [`dispose`](SyncSession::dispose), which flushes any pending debounced
//! upload so the last edits of a run are not lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mizan_core::domain::ledger::LedgerStore;
use mizan_core::ports::auth_gate::IAuthGate;
use mizan_core::ports::local_store::ILocalStore;
use mizan_core::ports::notification::INotifier;
use mizan_core::ports::remote_store::IRemoteStore;

use crate::engine::{ForceSyncOutcome, SyncEngine};
use crate::scheduler::{SchedulerHandle, UploadScheduler};

/// Once-per-run synchronization session
///
/// Consumers hold the session; the engine is shared out for status
/// observation and conflict resolution.
pub struct SyncSession {
    engine: Arc<SyncEngine>,
    handle: SchedulerHandle,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncSession {
    /// Wires up the engine, scheduler and token watcher
    ///
    /// If a token is already present at creation time (seeded session), a
    /// reconcile is triggered immediately, mirroring the behavior on later
    /// token arrival.
    pub fn create(
        remote: Arc<dyn IRemoteStore>,
        local: Arc<dyn ILocalStore>,
        ledger: Arc<Mutex<LedgerStore>>,
        auth: Arc<dyn IAuthGate>,
        notifier: Arc<dyn INotifier>,
        debounce: Duration,
    ) -> Self {
        let engine = Arc::new(SyncEngine::new(
            remote,
            local,
            ledger,
            Arc::clone(&auth),
            notifier,
        ));

        let (scheduler, handle) = UploadScheduler::new(Arc::clone(&engine), debounce);
        let shutdown = CancellationToken::new();

        let scheduler_task = tokio::spawn(scheduler.run());

        let watcher_engine = Arc::clone(&engine);
        let watcher_cancel = shutdown.clone();
        let mut token_rx = auth.subscribe();
        let watcher_task = tokio::spawn(async move {
            // Session may start already authenticated (e.g. restored token).
            if token_rx.borrow_and_update().is_some() {
                watcher_engine.reconcile().await;
            }

            loop {
                tokio::select! {
                    _ = watcher_cancel.cancelled() => break,
                    changed = token_rx.changed() => {
                        if changed.is_err() {
                            debug!("Auth gate dropped, token watcher exiting");
                            break;
                        }
                        let has_token = token_rx.borrow_and_update().is_some();
                        if has_token {
                            info!("Session token available, reconciling");
                            watcher_engine.reconcile().await;
                        } else {
                            debug!("Session token gone");
                            watcher_engine.mark_offline();
                        }
                    }
                }
            }
        });

        info!("Sync session created");

        Self {
            engine,
            handle,
            shutdown,
            tasks: vec![scheduler_task, watcher_task],
        }
    }

    /// Shared engine reference (status, conflicts, reconcile)
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Notes a ledger mutation, (re)starting the debounced upload window
    ///
    /// A no-op without an authenticated session.
    pub fn note_mutation(&self) {
        if self.engine.begin_debounce() && !self.handle.touch() {
            warn!("Upload scheduler unavailable, mutation not scheduled");
        }
    }

    /// User-initiated immediate sync; supersedes any pending debounce
    pub async fn force_sync(&self) -> ForceSyncOutcome {
        self.handle.cancel();
        self.engine.force_sync().await
    }

    /// Signs the sync layer out: cancels pending work and clears
    /// session-scoped state (cached handle, conflict, sync metadata)
    ///
    /// The auth gate's own token clearing is the caller's responsibility.
    pub async fn sign_out(&self) {
        self.handle.cancel();
        self.engine.sign_out().await;
    }

    /// Tears the session down, flushing any pending debounced upload first
    pub async fn dispose(self) {
        debug!("Disposing sync session");
        let SyncSession {
            engine: _,
            handle,
            shutdown,
            tasks,
        } = self;

        handle.flush().await;
        shutdown.cancel();

        // Closing the signal channel lets the scheduler drain and exit.
        drop(handle);

        for task in tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "Sync session task ended abnormally");
            }
        }
        info!("Sync session disposed");
    }
}
