//! Shared test helpers for Drive API integration tests
//!
//! Provides wiremock-based mock server setup for the Drive v3 endpoints.
//! Each helper mounts the necessary mock endpoints; tests build a
//! `DriveClient` pointing both base URLs at the mock server.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mizan_core::domain::newtypes::BearerToken;
use mizan_drive::client::DriveClient;

/// Fixed ledger file name used across the integration tests
pub const TEST_FILE_NAME: &str = "mizan-ledger.json";

/// Starts a mock server and returns it with a client pointed at it
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls(TEST_FILE_NAME, server.uri(), server.uri());
    (server, client)
}

/// A valid bearer token for test requests
pub fn test_token() -> BearerToken {
    BearerToken::new("test-access-token").expect("valid test token")
}

/// Mounts the search endpoint returning the given file entries
pub async fn mount_find(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("spaces", "appDataFolder"))
        .and(query_param("q", format!("name='{TEST_FILE_NAME}'")))
        .and(query_param("fields", "files(id,modifiedTime)"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": files })),
        )
        .mount(server)
        .await;
}

/// Mounts the multipart create endpoint
pub async fn mount_create(server: &MockServer, response_id: &str, modified_time: &str) {
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": response_id,
            "modifiedTime": modified_time
        })))
        .mount(server)
        .await;
}

/// Mounts the media update endpoint for a specific file id
pub async fn mount_update(server: &MockServer, file_id: &str) {
    Mock::given(method("PATCH"))
        .and(path(format!("/files/{file_id}")))
        .and(query_param("uploadType", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": file_id
        })))
        .mount(server)
        .await;
}

/// Mounts the download endpoint for a specific file id
pub async fn mount_download(server: &MockServer, file_id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{file_id}")))
        .and(query_param("alt", "media"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/json"),
        )
        .mount(server)
        .await;
}
