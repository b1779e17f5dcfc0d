//! Remote store port (driven/secondary port)
//!
//! Interface for the single-file-per-account remote object store. The
//! primary implementation targets the Google Drive v3 API with the
//! application-data scope, but the trait is provider-agnostic.
//!
//! ## Design Notes
//!
//! - Uses a typed [`RemoteStoreError`] rather than `anyhow` at this boundary:
//!   the sync engine's policy depends on distinguishing precondition
//!   failures (`Unauthenticated`, `NoRemoteFile`) from transport failures.
//! - No retries here; retry policy belongs to the engine (currently: none
//!   automatic; the next edit or a manual sync re-attempts).
//! - `find` must be idempotent and side-effect-free.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::newtypes::FileId;

/// Handle to the remote ledger file
///
/// Port-level DTO: the id is cached by the engine for the session once
/// discovered; the modification time drives conflict arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Provider-assigned opaque identifier
    pub id: FileId,
    /// Server-side last-modified timestamp
    pub modified_time: DateTime<Utc>,
}

/// Failures surfaced by remote store adapters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteStoreError {
    /// No bearer token available; the call was never attempted
    #[error("no authenticated session")]
    Unauthenticated,

    /// An operation that needs a file handle was called without one
    #[error("no remote file available")]
    NoRemoteFile,

    /// The remote returned a non-success HTTP status
    #[error("remote returned HTTP {status}")]
    Http { status: u16 },

    /// Network-level failure: DNS, timeout, connection refused, offline
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The response body did not have the expected shape
    #[error("unexpected remote payload: {0}")]
    Payload(String),
}

impl RemoteStoreError {
    /// True for the precondition variants that short-circuit without I/O
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RemoteStoreError::Unauthenticated | RemoteStoreError::NoRemoteFile
        )
    }
}

/// Port trait for the remote single-file object store
///
/// Every method requires a valid bearer token at call time; implementations
/// must short-circuit with [`RemoteStoreError::Unauthenticated`] (no HTTP
/// attempted) when none is available.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Searches for the application's ledger file by its fixed name
    ///
    /// Returns the first match, or `None` when no file exists yet.
    async fn find(&self) -> Result<Option<RemoteFile>, RemoteStoreError>;

    /// Creates the ledger file and returns its newly assigned handle
    ///
    /// # Arguments
    /// * `payload` - JSON snapshot bytes
    async fn create(&self, payload: &[u8]) -> Result<RemoteFile, RemoteStoreError>;

    /// Replaces the content of an existing file in place, preserving its id
    ///
    /// # Arguments
    /// * `id` - Handle of the file to overwrite
    /// * `payload` - JSON snapshot bytes
    async fn update(&self, id: &FileId, payload: &[u8]) -> Result<(), RemoteStoreError>;

    /// Fetches the full content of the file by id
    async fn download(&self, id: &FileId) -> Result<Vec<u8>, RemoteStoreError>;
}
