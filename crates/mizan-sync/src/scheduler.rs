//! Upload scheduler - trailing debounce for auto-sync
//!
//! Sits between ledger mutations and the [`SyncEngine`]: every mutation
//! signals the scheduler, each signal resets the pending deadline, and only
//! the last edit in a burst triggers network traffic. The snapshot is built
//! by the engine at fire time, never at schedule time, so the payload
//! always reflects the final ledger state.
//!
//! ## Flow
//!
//! ```text
//! ledger mutation ──→ SchedulerHandle ──→ UploadScheduler ──→ engine upload
//!                          │                    │
//!                       Touch/Cancel      deadline (reset on Touch)
//! ```
//!
//! A manual sync cancels the pending deadline through the handle rather
//! than racing it; shutdown flushes a still-pending deadline immediately so
//! the last edits of a run are never lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::engine::SyncEngine;

/// Signals accepted by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerSignal {
    /// A ledger mutation happened; (re)start the debounce window
    Touch,
    /// Drop any pending deadline (manual sync supersedes the debounce)
    Cancel,
    /// Fire a pending deadline immediately (used on dispose)
    Flush,
}

/// Sending side handed to mutation sites
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerSignal>,
}

impl SchedulerHandle {
    /// Restarts the debounce window; returns false if the scheduler is gone
    pub fn touch(&self) -> bool {
        self.tx.try_send(SchedulerSignal::Touch).is_ok()
    }

    /// Cancels any pending deadline
    pub fn cancel(&self) -> bool {
        self.tx.try_send(SchedulerSignal::Cancel).is_ok()
    }

    /// Requests an immediate fire of a pending deadline
    pub async fn flush(&self) -> bool {
        self.tx.send(SchedulerSignal::Flush).await.is_ok()
    }
}

/// Debounced upload scheduler
///
/// Owns the receiving end of the signal channel and the deadline state.
/// Runs until every [`SchedulerHandle`] is dropped; on shutdown a pending
/// deadline is flushed before exiting.
pub struct UploadScheduler {
    signal_rx: mpsc::Receiver<SchedulerSignal>,
    engine: Arc<SyncEngine>,
    debounce: Duration,
}

impl UploadScheduler {
    /// Creates a scheduler and its handle
    ///
    /// # Arguments
    /// * `engine` - Engine invoked when a deadline fires
    /// * `debounce` - Quiet period required after the last mutation
    pub fn new(engine: Arc<SyncEngine>, debounce: Duration) -> (Self, SchedulerHandle) {
        let (tx, signal_rx) = mpsc::channel(64);

        info!(
            debounce_ms = debounce.as_millis() as u64,
            "Creating upload scheduler"
        );

        (
            Self {
                signal_rx,
                engine,
                debounce,
            },
            SchedulerHandle { tx },
        )
    }

    /// Main scheduler loop
    ///
    /// Two concurrent concerns via `tokio::select!`:
    ///
    /// 1. **Signals**: `Touch` resets the deadline, `Cancel` clears it,
    ///    `Flush` fires it immediately.
    /// 2. **Deadline**: when the quiet period elapses, the engine uploads
    ///    once, carrying whatever the ledger holds at that moment.
    ///
    /// The loop ends when the signal channel closes (all handles dropped);
    /// a still-pending deadline is fired first.
    pub async fn run(mut self) {
        debug!("Upload scheduler starting");
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(SchedulerSignal::Touch) => {
                            deadline = Some(Instant::now() + self.debounce);
                            debug!("Debounce window restarted");
                        }
                        Some(SchedulerSignal::Cancel) => {
                            if deadline.take().is_some() {
                                debug!("Pending debounced upload cancelled");
                            }
                        }
                        Some(SchedulerSignal::Flush) => {
                            if deadline.take().is_some() {
                                debug!("Flushing pending debounced upload");
                                self.engine.debounced_upload().await;
                            }
                        }
                        None => {
                            if deadline.take().is_some() {
                                info!("Flushing pending upload before scheduler shutdown");
                                self.engine.debounced_upload().await;
                            }
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    deadline = None;
                    debug!("Debounce deadline reached, uploading");
                    self.engine.debounced_upload().await;
                }
            }
        }

        debug!("Upload scheduler stopped");
    }
}
