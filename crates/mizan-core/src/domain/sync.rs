//! Sync-related domain values
//!
//! [`SyncMeta`] is the tiny record the conflict comparison hinges on: the
//! wall-clock time of this device's last successful sync. It is persisted
//! under its own storage key, separate from the ledger snapshot, so that
//! operations which rewrite the ledger (e.g. a file import) cannot disturb
//! conflict detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp of the last successful sync on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMeta {
    pub last_modified: DateTime<Utc>,
}

impl SyncMeta {
    /// Creates a record stamped with the current time
    #[must_use]
    pub fn now() -> Self {
        Self {
            last_modified: Utc::now(),
        }
    }

    /// Parses a persisted record, treating corrupt JSON as "no record"
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Serializes the record for persistence
    pub fn to_json(&self) -> String {
        // Two fixed fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Observable projection of the sync engine's current activity
///
/// Derived, never persisted. `Offline` covers both "no session" and
/// "signed out"; conflict-pending is carried separately by the engine while
/// the status remains `Syncing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Offline,
    Syncing,
    Synced,
    Error,
}

impl SyncStatus {
    /// Returns the stable string key for display / IPC
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Offline => "offline",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
