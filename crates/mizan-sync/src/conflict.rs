//! Conflict arbitration
//!
//! Decides which side of a divergence wins by comparing the remote file's
//! server-side modification time against the timestamp this device recorded
//! at its last successful sync (never the live ledger's stamp, which moves
//! on every local edit and would mask genuine remote changes).
//!
//! The asymmetry is deliberate data-loss avoidance: a strictly newer remote
//! suspends automatic resolution and waits for the user, while a newer or
//! equal local record wins silently (the remote copy was already known to
//! be older).

use chrono::{DateTime, Utc};

use mizan_core::ports::remote_store::RemoteFile;

/// Outcome of comparing remote and recorded timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// Remote is strictly newer (or nothing was ever recorded here):
    /// suspend and ask the user before touching local data
    RemoteNewer,
    /// Local is newer or equal: upload silently
    LocalAuthoritative,
}

/// A divergence awaiting an explicit user decision
///
/// Carried by the engine while suspended; the remote handle is retained so
/// a "use cloud" resolution can download without re-querying.
#[derive(Debug, Clone)]
pub struct PendingConflict {
    /// The remote file the local ledger diverged from
    pub remote: RemoteFile,
}

impl PendingConflict {
    /// The remote timestamp surfaced to the user in the conflict prompt
    pub fn remote_modified(&self) -> DateTime<Utc> {
        self.remote.modified_time
    }
}

/// Arbitrates between the remote modification time and the locally
/// recorded last-sync timestamp
///
/// A missing local record means this device has never completed a sync, so
/// the remote copy must be treated as potentially newer.
pub fn arbitrate(remote_modified: DateTime<Utc>, recorded: Option<DateTime<Utc>>) -> Arbitration {
    match recorded {
        None => Arbitration::RemoteNewer,
        Some(local) if remote_modified > local => Arbitration::RemoteNewer,
        Some(_) => Arbitration::LocalAuthoritative,
    }
}
