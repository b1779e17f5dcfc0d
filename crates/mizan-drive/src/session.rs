//! Bearer-token session
//!
//! [`TokenSession`] is the auth-gate implementation: a per-run slot holding
//! the current bearer token, published over a watch channel so the sync
//! engine can react to sign-in (including silent restoration) and sign-out.
//!
//! Token *acquisition* is out of scope: the hosting application performs
//! the OAuth dance and feeds the result in through
//! [`complete_sign_in`](TokenSession::complete_sign_in) as an explicit
//! [`SignInOutcome`]. Expired tokens read as "no session"; the host is
//! expected to restore silently and call `complete_sign_in` again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use mizan_core::domain::newtypes::BearerToken;
use mizan_core::ports::auth_gate::{IAuthGate, SignInOutcome};

/// Holds the session's bearer token and its expiry
struct TokenSlot {
    token: Option<BearerToken>,
    expires_at: Option<DateTime<Utc>>,
}

/// Auth-gate implementation backed by a watch channel
///
/// One instance per application run; cloneless sharing via `Arc`.
pub struct TokenSession {
    /// Publishes token arrival/departure to subscribers
    token_tx: watch::Sender<Option<BearerToken>>,
    /// Expiry bookkeeping for `current_token`
    slot: Mutex<TokenSlot>,
    /// Set when a consumer asked for an interactive sign-in
    sign_in_requested: AtomicBool,
}

impl TokenSession {
    /// Creates a session with no active token
    #[must_use]
    pub fn new() -> Self {
        let (token_tx, _rx) = watch::channel(None);
        Self {
            token_tx,
            slot: Mutex::new(TokenSlot {
                token: None,
                expires_at: None,
            }),
            sign_in_requested: AtomicBool::new(false),
        }
    }

    /// Creates a session pre-seeded with a token (no expiry)
    ///
    /// Convenient for one-shot CLI invocations where the token comes from
    /// the environment.
    #[must_use]
    pub fn with_token(token: BearerToken) -> Self {
        let session = Self::new();
        session.complete_sign_in(SignInOutcome::Granted {
            token,
            expires_at: None,
        });
        session
    }

    /// Applies the outcome of a sign-in attempt
    ///
    /// `Granted` installs the token and notifies subscribers; `Denied` and
    /// `SilentRestoreFailed` clear any stale session so the engine falls
    /// back to offline operation.
    pub fn complete_sign_in(&self, outcome: SignInOutcome) {
        match outcome {
            SignInOutcome::Granted { token, expires_at } => {
                info!(has_expiry = expires_at.is_some(), "Session token granted");
                {
                    let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
                    slot.token = Some(token.clone());
                    slot.expires_at = expires_at;
                }
                let _ = self.token_tx.send(Some(token));
            }
            SignInOutcome::Denied { reason } => {
                warn!(%reason, "Sign-in denied");
                self.clear();
            }
            SignInOutcome::SilentRestoreFailed => {
                debug!("Silent session restoration failed, clearing stale session");
                self.clear();
            }
        }
    }

    /// Ends the session, notifying subscribers
    ///
    /// Remote data is untouched; only the in-memory credential is dropped.
    pub fn sign_out(&self) {
        info!("Session signed out");
        self.clear();
    }

    /// Returns and resets the pending interactive sign-in request flag
    ///
    /// Polled by the hosting application to learn that a consumer (e.g. a
    /// manual sync without a session) wants an interactive sign-in.
    pub fn take_sign_in_request(&self) -> bool {
        self.sign_in_requested.swap(false, Ordering::AcqRel)
    }

    fn clear(&self) {
        {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.token = None;
            slot.expires_at = None;
        }
        let _ = self.token_tx.send(None);
    }
}

impl Default for TokenSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IAuthGate for TokenSession {
    fn current_token(&self) -> Option<BearerToken> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(expires_at) = slot.expires_at {
            if Utc::now() >= expires_at {
                debug!("Session token expired");
                return None;
            }
        }
        slot.token.clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<BearerToken>> {
        self.token_tx.subscribe()
    }

    fn request_interactive_sign_in(&self) {
        debug!("Interactive sign-in requested");
        self.sign_in_requested.store(true, Ordering::Release);
    }
}
