//! Integration tests for the ledger file search
//!
//! Verifies the name-query wire shape and the "first match or none"
//! contract against a wiremock Drive API.

use chrono::{TimeZone, Utc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mizan_core::ports::remote_store::RemoteStoreError;
use mizan_drive::client::DriveClient;

use crate::common;

#[tokio::test]
async fn test_find_returns_first_match() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_find(
        &server,
        serde_json::json!([
            { "id": "file-001", "modifiedTime": "2026-04-01T12:00:00Z" },
            { "id": "file-002", "modifiedTime": "2026-04-02T12:00:00Z" }
        ]),
    )
    .await;

    let found = client
        .find_file(&common::test_token())
        .await
        .expect("find should succeed")
        .expect("a file should be found");

    assert_eq!(found.id.as_str(), "file-001");
    assert_eq!(
        found.modified_time,
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_find_returns_none_when_no_file_exists() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_find(&server, serde_json::json!([])).await;

    let found = client
        .find_file(&common::test_token())
        .await
        .expect("find should succeed");

    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_tolerates_missing_files_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let found = client
        .find_file(&common::test_token())
        .await
        .expect("find should succeed");

    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_maps_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "Insufficient permissions" }
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let result = client.find_file(&common::test_token()).await;

    assert_eq!(result, Err(RemoteStoreError::Http { status: 403 }));
}

#[tokio::test]
async fn test_find_maps_connection_failure_to_unavailable() {
    // Nothing is listening on this port.
    let client =
        DriveClient::with_base_urls(common::TEST_FILE_NAME, "http://127.0.0.1:1", "http://127.0.0.1:1");

    let result = client.find_file(&common::test_token()).await;
    assert!(matches!(result, Err(RemoteStoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_find_maps_malformed_body_to_payload_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let result = client.find_file(&common::test_token()).await;

    assert!(matches!(result, Err(RemoteStoreError::Payload(_))));
}
