//! Ports: the interfaces the domain exposes to adapters
//!
//! Driven (secondary) ports implemented by the adapter crates:
//! - [`remote_store`] - the single-file remote object store
//! - [`local_store`] - device-local key/value persistence
//! - [`auth_gate`] - the bearer-token capability
//! - [`notification`] - the user-feedback side channel

pub mod auth_gate;
pub mod local_store;
pub mod notification;
pub mod remote_store;

pub use auth_gate::{IAuthGate, SignInOutcome};
pub use local_store::{ILocalStore, LocalStoreError, LEDGER_KEY, SYNC_META_KEY};
pub use notification::{INotifier, Toast, ToastLevel};
pub use remote_store::{IRemoteStore, RemoteFile, RemoteStoreError};
