//! Auth gate port (driven/secondary port)
//!
//! The sync engine treats authentication as a capability, not as something
//! it manages: it can read the current bearer token, observe token arrival
//! and departure, and ask for an interactive sign-in. How tokens are
//! actually acquired (OAuth handshake, silent restoration) is outside this
//! interface.
//!
//! ## Design Notes
//!
//! - Token availability is published over a `tokio::sync::watch` channel
//!   rather than registered callbacks; subscribers observe sign-in, silent
//!   restoration, and sign-out as channel updates.
//! - Sign-in completion is an explicit, inspectable outcome rather than a
//!   pair of success/error callbacks.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::newtypes::BearerToken;

/// Result of an attempted sign-in (interactive or silent)
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    /// A token was obtained; `expires_at` is the provider-reported expiry
    Granted {
        token: BearerToken,
        expires_at: Option<DateTime<Utc>>,
    },
    /// The user or provider refused the request
    Denied { reason: String },
    /// A silent restoration attempt failed; the cached session is stale
    SilentRestoreFailed,
}

/// Port trait for the authentication capability
pub trait IAuthGate: Send + Sync {
    /// Returns the current bearer token, if a session is active
    fn current_token(&self) -> Option<BearerToken>;

    /// Subscribes to token changes
    ///
    /// The receiver yields `Some(token)` on sign-in (including silent
    /// restoration) and `None` on sign-out or failed restoration.
    fn subscribe(&self) -> watch::Receiver<Option<BearerToken>>;

    /// Requests an interactive sign-in from the hosting application
    ///
    /// Fire-and-forget: the eventual outcome arrives through the watch
    /// channel.
    fn request_interactive_sign_in(&self);
}
