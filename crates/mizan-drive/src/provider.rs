//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Wraps the [`DriveClient`] behind the remote store port. The bearer token
//! is read from the auth gate at call time, so a missing or signed-out
//! session short-circuits with `Unauthenticated` before any HTTP is
//! attempted, and a refreshed token is picked up automatically on the next
//! call.

use std::sync::Arc;

use tracing::debug;

use mizan_core::domain::newtypes::{BearerToken, FileId};
use mizan_core::ports::auth_gate::IAuthGate;
use mizan_core::ports::remote_store::{IRemoteStore, RemoteFile, RemoteStoreError};

use crate::client::DriveClient;

/// Remote store implementation backed by the Drive v3 API
pub struct DriveRemoteStore {
    /// The underlying Drive API client
    client: DriveClient,
    /// Source of the per-call bearer token
    auth: Arc<dyn IAuthGate>,
}

impl DriveRemoteStore {
    /// Creates a new `DriveRemoteStore`
    ///
    /// # Arguments
    /// * `client` - Configured Drive API client
    /// * `auth` - Auth gate supplying bearer tokens
    pub fn new(client: DriveClient, auth: Arc<dyn IAuthGate>) -> Self {
        Self { client, auth }
    }

    /// Reads the current token or short-circuits the call
    fn require_token(&self) -> Result<BearerToken, RemoteStoreError> {
        self.auth
            .current_token()
            .ok_or(RemoteStoreError::Unauthenticated)
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn find(&self) -> Result<Option<RemoteFile>, RemoteStoreError> {
        let token = self.require_token()?;
        debug!("DriveRemoteStore::find");
        self.client.find_file(&token).await
    }

    async fn create(&self, payload: &[u8]) -> Result<RemoteFile, RemoteStoreError> {
        let token = self.require_token()?;
        debug!(bytes = payload.len(), "DriveRemoteStore::create");
        self.client.create_file(&token, payload).await
    }

    async fn update(&self, id: &FileId, payload: &[u8]) -> Result<(), RemoteStoreError> {
        let token = self.require_token()?;
        debug!(id = %id, bytes = payload.len(), "DriveRemoteStore::update");
        self.client.update_file(&token, id, payload).await
    }

    async fn download(&self, id: &FileId) -> Result<Vec<u8>, RemoteStoreError> {
        let token = self.require_token()?;
        debug!(id = %id, "DriveRemoteStore::download");
        self.client.download_file(&token, id).await
    }
}
