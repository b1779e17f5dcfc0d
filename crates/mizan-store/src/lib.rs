//! Mizan Store - device-local persistence
//!
//! SQLite-backed implementation of the local store port. Two logical records
//! live here: the ledger snapshot (for offline reload) and the sync metadata
//! (for conflict comparison), stored as JSON strings under separate keys.
//!
//! ## Modules
//!
//! - [`pool`] - connection pool with WAL mode and embedded migration
//! - [`repository`] - the key/value record store

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteLocalStore;

use thiserror::Error;

/// Errors that can occur in the local store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A query failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),
}
