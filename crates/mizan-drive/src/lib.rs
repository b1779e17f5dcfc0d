//! Mizan Drive - Google Drive remote store adapter
//!
//! Talks to the Google Drive v3 API with the application-data scope
//! (`appDataFolder`), where at most one ledger file exists per account:
//!
//! - name search with `files(id,modifiedTime)` projection
//! - multipart create (metadata + JSON content)
//! - in-place media update preserving the file id
//! - `alt=media` download
//!
//! ## Modules
//!
//! - [`client`] - the typed HTTP client (base URLs injectable for tests)
//! - [`provider`] - [`IRemoteStore`](mizan_core::ports::IRemoteStore)
//!   implementation reading the bearer token from the auth gate per call
//! - [`session`] - the bearer-token session implementing the auth-gate port

pub mod client;
pub mod provider;
pub mod session;

pub use client::DriveClient;
pub use provider::DriveRemoteStore;
pub use session::TokenSession;
