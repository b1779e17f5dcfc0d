//! Notification port (driven/secondary port)
//!
//! Side channel for user-visible feedback: sync results, conflict prompts,
//! storage warnings. Implementations may render toasts, desktop
//! notifications, or plain terminal output.
//!
//! ## Design Notes
//!
//! - Notifications are fire-and-forget; delivery failures must never
//!   propagate into the caller's control flow.
//! - Uses `anyhow::Result` because delivery errors are adapter-specific.

use serde::{Deserialize, Serialize};

/// Severity of a toast message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToastLevel::Success => "success",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A short user-facing message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub body: String,
    pub level: ToastLevel,
}

impl Toast {
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            level: ToastLevel::Success,
        }
    }

    pub fn warning(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            level: ToastLevel::Warning,
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            level: ToastLevel::Error,
        }
    }
}

/// Port trait for the user-feedback side channel
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Delivers a toast; implementations swallow their own failures
    async fn toast(&self, toast: &Toast) -> anyhow::Result<()>;
}
