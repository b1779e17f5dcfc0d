//! Google Drive API client
//!
//! Provides a typed HTTP client for the Drive v3 endpoints Mizan uses.
//! Handles authentication headers, JSON deserialization, and endpoint
//! construction. Drive splits metadata and upload traffic across two hosts,
//! so the client carries two base URLs; both are injectable for testing
//! against a mock server.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mizan_core::domain::BearerToken;
//! use mizan_drive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("mizan-ledger.json");
//! let token = BearerToken::new("access-token-here")?;
//! if let Some(file) = client.find_file(&token).await? {
//!     println!("ledger last modified {}", file.modified_time);
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use mizan_core::domain::newtypes::{BearerToken, FileId};
use mizan_core::ports::remote_store::{RemoteFile, RemoteStoreError};

/// Base URL for Drive v3 metadata and content requests
const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 upload requests
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Private per-application scope; files here are invisible to the user's
/// normal Drive view and to other applications
const APP_DATA_SPACE: &str = "appDataFolder";

// ============================================================================
// Drive API response types
// ============================================================================

/// Response from the file search endpoint
#[derive(Debug, Deserialize)]
struct FileListResponse {
    /// Matching files; Mizan keeps at most one, so only the first is used
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// A file entry as returned by search and create endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    /// Drive-assigned file identifier
    id: String,
    /// Server-side modification timestamp (absent in some create responses)
    modified_time: Option<DateTime<Utc>>,
}

impl DriveFile {
    fn into_remote_file(self) -> Result<RemoteFile, RemoteStoreError> {
        let id = FileId::new(self.id)
            .map_err(|e| RemoteStoreError::Payload(format!("invalid file id: {e}")))?;
        Ok(RemoteFile {
            id,
            modified_time: self.modified_time.unwrap_or_else(Utc::now),
        })
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Maps a transport-level reqwest failure into the port taxonomy
///
/// Anything that never produced a status line (DNS, refused connection,
/// timeout) is `Unavailable`; response-body decode failures are `Payload`.
fn transport_error(err: reqwest::Error) -> RemoteStoreError {
    if let Some(status) = err.status() {
        RemoteStoreError::Http {
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        RemoteStoreError::Payload(err.to_string())
    } else {
        RemoteStoreError::Unavailable(err.to_string())
    }
}

/// Converts a non-success status into the port taxonomy
fn status_error(status: StatusCode) -> RemoteStoreError {
    RemoteStoreError::Http {
        status: status.as_u16(),
    }
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for the Drive v3 endpoints
///
/// Holds no credentials: every method takes the bearer token for that call,
/// so a token refresh never invalidates the client.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata/content requests
    api_base_url: String,
    /// Base URL for upload requests
    upload_base_url: String,
    /// Fixed name of the ledger file within the app-data scope
    file_name: String,
}

impl DriveClient {
    /// Creates a client against the production Drive endpoints
    ///
    /// # Arguments
    /// * `file_name` - Fixed ledger file name within the app-data scope
    pub fn new(file_name: impl Into<String>) -> Self {
        Self::with_base_urls(file_name, API_BASE_URL, UPLOAD_BASE_URL)
    }

    /// Creates a client with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `file_name` - Fixed ledger file name
    /// * `api_base_url` - Replacement for the metadata/content host
    /// * `upload_base_url` - Replacement for the upload host
    pub fn with_base_urls(
        file_name: impl Into<String>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into(),
            upload_base_url: upload_base_url.into(),
            file_name: file_name.into(),
        }
    }

    /// Returns the configured ledger file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Creates an authenticated request builder against the metadata host
    fn api_request(&self, method: Method, path: &str, token: &BearerToken) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client.request(method, &url).bearer_auth(token.as_str())
    }

    /// Creates an authenticated request builder against the upload host
    fn upload_request(&self, method: Method, path: &str, token: &BearerToken) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client.request(method, &url).bearer_auth(token.as_str())
    }

    /// Searches the app-data scope for the ledger file by name
    ///
    /// Returns the first match's handle, or `None` when the file does not
    /// exist yet. Idempotent and side-effect-free.
    pub async fn find_file(
        &self,
        token: &BearerToken,
    ) -> Result<Option<RemoteFile>, RemoteStoreError> {
        debug!(name = %self.file_name, "Searching app-data scope for ledger file");

        let response = self
            .api_request(Method::GET, "/files", token)
            .query(&[
                ("spaces", APP_DATA_SPACE),
                ("q", &format!("name='{}'", self.file_name)),
                ("fields", "files(id,modifiedTime)"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let list: FileListResponse = response
            .json()
            .await
            .map_err(|e| RemoteStoreError::Payload(e.to_string()))?;

        match list.files.into_iter().next() {
            Some(file) => {
                let remote = file.into_remote_file()?;
                debug!(id = %remote.id, modified = %remote.modified_time, "Ledger file found");
                Ok(Some(remote))
            }
            None => {
                debug!("No ledger file in app-data scope");
                Ok(None)
            }
        }
    }

    /// Creates the ledger file via a multipart (metadata + content) upload
    ///
    /// The metadata part pins the fixed file name and the app-data parent;
    /// the content part carries the JSON snapshot. Returns the newly
    /// assigned handle.
    pub async fn create_file(
        &self,
        token: &BearerToken,
        payload: &[u8],
    ) -> Result<RemoteFile, RemoteStoreError> {
        debug!(bytes = payload.len(), "Creating ledger file (multipart)");

        let metadata = serde_json::json!({
            "name": self.file_name,
            "parents": [APP_DATA_SPACE],
        });

        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| RemoteStoreError::Payload(e.to_string()))?;
        let content_part = reqwest::multipart::Part::bytes(payload.to_vec())
            .mime_str("application/json")
            .map_err(|e| RemoteStoreError::Payload(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("file", content_part);

        let response = self
            .upload_request(Method::POST, "/files", token)
            .query(&[("uploadType", "multipart"), ("fields", "id,modifiedTime")])
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let created: DriveFile = response
            .json()
            .await
            .map_err(|e| RemoteStoreError::Payload(e.to_string()))?;

        let remote = created.into_remote_file()?;
        debug!(id = %remote.id, "Ledger file created");
        Ok(remote)
    }

    /// Replaces the content of an existing file in place
    ///
    /// Uses a media upload against the known id, so the handle cached by the
    /// session stays valid.
    pub async fn update_file(
        &self,
        token: &BearerToken,
        id: &FileId,
        payload: &[u8],
    ) -> Result<(), RemoteStoreError> {
        debug!(id = %id, bytes = payload.len(), "Updating ledger file in place");

        let path = format!("/files/{}", id.as_str());
        let response = self
            .upload_request(Method::PATCH, &path, token)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        debug!(id = %id, "Ledger file updated");
        Ok(())
    }

    /// Downloads the full file content by id
    pub async fn download_file(
        &self,
        token: &BearerToken,
        id: &FileId,
    ) -> Result<Vec<u8>, RemoteStoreError> {
        debug!(id = %id, "Downloading ledger file");

        let path = format!("/files/{}", id.as_str());
        let response = self
            .api_request(Method::GET, &path, token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteStoreError::Unavailable(e.to_string()))?;

        debug!(id = %id, bytes = bytes.len(), "Ledger file downloaded");
        Ok(bytes.to_vec())
    }
}
