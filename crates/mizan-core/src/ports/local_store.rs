//! Local persistence port (driven/secondary port)
//!
//! Durable key/value storage scoped to the device. Two logical records are
//! stored: the full ledger snapshot (offline reload) and the sync metadata
//! (conflict comparison only). The keys are deliberately separate so that
//! rewriting the ledger (e.g. during a file import) leaves the
//! conflict-detection timestamp intact.

use thiserror::Error;

/// Storage key for the persisted ledger snapshot (JSON string)
pub const LEDGER_KEY: &str = "ledger_snapshot";

/// Storage key for the persisted sync metadata (JSON string)
pub const SYNC_META_KEY: &str = "sync_meta";

/// Failures surfaced by local store adapters
///
/// Callers treat these as warnings, not fatal errors: a failed write is
/// logged and surfaced through the notification side channel, and the
/// application continues operating on in-memory state.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// The backing store could not be read or written
    #[error("local storage failure: {0}")]
    Storage(String),
}

/// Port trait for device-local key/value persistence
#[async_trait::async_trait]
pub trait ILocalStore: Send + Sync {
    /// Reads a record, returning `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Writes (or overwrites) a record
    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Deletes a record; absent keys are not an error
    async fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}
