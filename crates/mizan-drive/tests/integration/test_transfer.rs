//! Integration tests for upload and download operations
//!
//! Verifies the multipart create, in-place media update, and alt=media
//! download wire shapes, plus the provider's unauthenticated short-circuit.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mizan_core::domain::newtypes::FileId;
use mizan_core::ports::remote_store::{IRemoteStore, RemoteStoreError};
use mizan_drive::client::DriveClient;
use mizan_drive::provider::DriveRemoteStore;
use mizan_drive::session::TokenSession;

use crate::common;

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_returns_new_handle() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_create(&server, "created-001", "2026-05-01T08:30:00Z").await;

    let payload = br#"{"version":1,"calculator":{}}"#;
    let created = client
        .create_file(&common::test_token(), payload)
        .await
        .expect("create should succeed");

    assert_eq!(created.id.as_str(), "created-001");
}

#[tokio::test]
async fn test_create_sends_multipart_metadata_with_app_data_parent() {
    let server = MockServer::start().await;

    // The metadata part must pin the fixed name and the app-data parent.
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("appDataFolder"))
        .and(body_string_contains(common::TEST_FILE_NAME))
        .and(body_string_contains("\"cash\":100000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "created-002"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let payload = br#"{"version":1,"calculator":{"assets":{"cash":100000}}}"#;

    client
        .create_file(&common::test_token(), payload)
        .await
        .expect("create should succeed");
}

#[tokio::test]
async fn test_create_maps_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(507))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let result = client.create_file(&common::test_token(), b"{}").await;

    assert_eq!(result, Err(RemoteStoreError::Http { status: 507 }));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_patches_content_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/files/existing-001"))
        .and(query_param("uploadType", "media"))
        .and(header("Content-Type", "application/json"))
        .and(body_string_contains("\"version\":1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "existing-001"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let id = FileId::new("existing-001").unwrap();

    client
        .update_file(&common::test_token(), &id, br#"{"version":1}"#)
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn test_update_maps_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/files/existing-001"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let id = FileId::new("existing-001").unwrap();
    let result = client.update_file(&common::test_token(), &id, b"{}").await;

    assert_eq!(result, Err(RemoteStoreError::Http { status: 401 }));
}

// ============================================================================
// Download
// ============================================================================

#[tokio::test]
async fn test_download_returns_content() {
    let (server, client) = common::setup_drive_mock().await;

    let content = br#"{"version":1,"tracker":{"payments":[]}}"#;
    common::mount_download(&server, "dl-001", content).await;

    let id = FileId::new("dl-001").unwrap();
    let data = client
        .download_file(&common::test_token(), &id)
        .await
        .expect("download should succeed");

    assert_eq!(data, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_download(&server, "empty-001", &[]).await;

    let id = FileId::new("empty-001").unwrap();
    let data = client
        .download_file(&common::test_token(), &id)
        .await
        .expect("download should succeed");

    assert!(data.is_empty());
}

#[tokio::test]
async fn test_download_maps_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": 404, "message": "File not found" }
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let id = FileId::new("ghost").unwrap();
    let result = client.download_file(&common::test_token(), &id).await;

    assert_eq!(result, Err(RemoteStoreError::Http { status: 404 }));
}

// ============================================================================
// Provider: unauthenticated short-circuit
// ============================================================================

#[tokio::test]
async fn test_provider_short_circuits_without_token() {
    let server = MockServer::start().await;

    // No session: the provider must not issue any HTTP request.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = DriveClient::with_base_urls(common::TEST_FILE_NAME, server.uri(), server.uri());
    let store = DriveRemoteStore::new(client, Arc::new(TokenSession::new()));

    assert_eq!(store.find().await, Err(RemoteStoreError::Unauthenticated));
    assert_eq!(
        store.create(b"{}").await,
        Err(RemoteStoreError::Unauthenticated)
    );

    let id = FileId::new("any").unwrap();
    assert_eq!(
        store.update(&id, b"{}").await,
        Err(RemoteStoreError::Unauthenticated)
    );
    assert_eq!(
        store.download(&id).await,
        Err(RemoteStoreError::Unauthenticated)
    );
}

#[tokio::test]
async fn test_provider_delegates_with_token() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_find(
        &server,
        serde_json::json!([{ "id": "file-xyz", "modifiedTime": "2026-06-01T00:00:00Z" }]),
    )
    .await;

    let session = Arc::new(TokenSession::with_token(common::test_token()));
    let store = DriveRemoteStore::new(client, session);

    let found = store.find().await.expect("find should succeed");
    assert_eq!(found.expect("file present").id.as_str(), "file-xyz");
}
