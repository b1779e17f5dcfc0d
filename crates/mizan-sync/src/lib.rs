//! Mizan Sync - the local-first synchronization engine
//!
//! Reconciles the locally-edited ledger against the remote copy, detects
//! divergence via timestamps, and arbitrates which copy wins without losing
//! user data. Overwriting the local device's unsynced edits is always an
//! explicit user action; overwriting the remote copy with confirmed-newer
//! local data is silent.
//!
//! ## Modules
//!
//! - [`conflict`] - pure timestamp arbitration
//! - [`engine`] - the sync state machine (reconcile, resolutions, uploads)
//! - [`scheduler`] - trailing-debounce upload scheduling
//! - [`session`] - once-per-run lifecycle wiring engine, scheduler and
//!   token watcher

pub mod conflict;
pub mod engine;
pub mod scheduler;
pub mod session;

pub use engine::{ForceSyncOutcome, ReconcileOutcome, ResolutionOutcome, SyncEngine};
pub use session::SyncSession;

use thiserror::Error;

use mizan_core::ports::remote_store::RemoteStoreError;

/// Errors that can occur inside a synchronization operation
///
/// These never escape the engine's public API: every entry point converts
/// them into a [`SyncStatus`](mizan_core::domain::SyncStatus) transition
/// plus an optional toast, so the caller degrades to offline-only operation
/// instead of crashing.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store reported a failure
    #[error("remote store error: {0}")]
    Remote(#[from] RemoteStoreError),

    /// The downloaded payload was not valid JSON
    #[error("remote payload is not valid JSON: {0}")]
    Parse(String),

    /// The snapshot could not be serialized for upload
    #[error("snapshot serialization failed: {0}")]
    Encode(String),

    /// The payload was rejected by the ledger (schema version gate)
    #[error("incompatible payload: {0}")]
    Rejected(String),
}
