//! Tests for the HTTP transport module

use super::*;
use crate::config::{ClientConfig, Credentials};
use crate::error::Error;
use bytes::Bytes;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_bytes, body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .api_url(format!("{}/graphql", server.uri()))
        .token_url(format!("{}/oauth/token", server.uri()))
        .build()
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_token(config_for(server), "test-token", "org-123").unwrap()
}

#[test]
fn test_client_requires_organization_context() {
    let result = ApiClient::with_token(ClientConfig::default(), "t", "");
    assert!(matches!(result, Err(Error::MissingConfigField { .. })));
}

#[test]
fn test_client_rejects_invalid_config() {
    let config = ClientConfig::builder().api_url("::not-a-url").build();
    let result = ApiClient::with_token(config, "t", "org");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_client_debug_hides_token() {
    let client = ApiClient::with_token(ClientConfig::default(), "secret-token", "org").unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("ApiClient"));
    assert!(!debug_str.contains("secret-token"));
}

#[tokio::test]
async fn test_send_attaches_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Organization-Context", "org-123"))
        .and(body_json(json!({
            "query": "query { allUsers { id } }",
            "variables": {"first": 10}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"allUsers": [{"id": "u1"}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = client
        .send("query { allUsers { id } }", &json!({"first": 10}))
        .await
        .unwrap();

    assert_eq!(body["data"]["allUsers"][0]["id"], "u1");
}

#[tokio::test]
async fn test_send_fetches_token_with_client_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "issued-token",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(
        config_for(&mock_server),
        Credentials::new("id", "secret", "org-123"),
    )
    .unwrap();

    client.send("query { a }", &json!({})).await.unwrap();
    client.send("query { b }", &json!({})).await.unwrap();
}

#[tokio::test]
async fn test_send_non_200_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.send("query { x }", &json!({})).await {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_send_other_2xx_is_still_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.send("query { x }", &json!({})).await.unwrap_err();
    assert_eq!(err.status(), Some(202));
}

#[tokio::test]
async fn test_send_graphql_errors_with_200() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errors": [{"message": "x"}]})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.send("query { x }", &json!({})).await.unwrap_err();
    assert!(matches!(err, Error::Graphql { .. }));
    assert_eq!(err.graphql_messages(), vec!["x"]);
}

#[tokio::test]
async fn test_send_empty_errors_array_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"ok": true},
            "errors": []
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = client.send("query { ok }", &json!({})).await.unwrap();
    assert_eq!(body["data"]["ok"], true);
}

#[tokio::test]
async fn test_send_invalid_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.send("query { x }", &json!({})).await;
    assert!(matches!(result, Err(Error::JsonParse(_))));
}

#[tokio::test]
async fn test_put_object_returns_etag_without_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/bucket/part-1"))
        .and(body_bytes(b"chunk-bytes".to_vec()))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc123\""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let etag = client
        .put_object(
            &format!("{}/bucket/part-1", mock_server.uri()),
            Bytes::from_static(b"chunk-bytes"),
        )
        .await
        .unwrap();

    assert_eq!(etag.as_deref(), Some("\"abc123\""));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_put_object_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("SignatureDoesNotMatch"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .put_object(&format!("{}/bucket/x", mock_server.uri()), Bytes::new())
        .await;

    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("SignatureDoesNotMatch"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_put_file_streams_entire_contents() {
    let mock_server = MockServer::start().await;
    let contents = vec![7u8; 200 * 1024];

    Mock::given(method("PUT"))
        .and(path("/results"))
        .and(header_exists("content-length"))
        .and(body_bytes(contents.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&contents).unwrap();

    let client = client_for(&mock_server);
    client
        .put_file(&format!("{}/results", mock_server.uri()), file.path())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_file_missing_source() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    let result = client
        .put_file(
            &format!("{}/results", mock_server.uri()),
            std::path::Path::new("/no/such/file.json"),
        )
        .await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_download_to_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exports/report.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.csv");

    let client = client_for(&mock_server);
    let written = client
        .download_to_file(&format!("{}/exports/report.csv", mock_server.uri()), &target)
        .await
        .unwrap();

    assert_eq!(written, 8);
    assert_eq!(std::fs::read(&target).unwrap(), b"a,b\n1,2\n");
}

#[tokio::test]
async fn test_download_failure_does_not_create_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("NoSuchKey"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.csv");

    let client = client_for(&mock_server);
    let result = client
        .download_to_file(&format!("{}/missing", mock_server.uri()), &target)
        .await;

    assert_eq!(result.unwrap_err().status(), Some(404));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_interrupted_download_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.csv");
    std::fs::write(&target, b"previous").unwrap();

    let body = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"a,b\n")),
        Err(Error::Other("connection reset".to_string())),
    ]);
    let err = super::client::write_atomically(&target, body).await.unwrap_err();

    assert!(matches!(err, Error::Other(_)));
    assert_eq!(std::fs::read(&target).unwrap(), b"previous");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_completed_download_replaces_target() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.csv");
    std::fs::write(&target, b"previous").unwrap();

    let body = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"a,b\n")),
        Ok(Bytes::from_static(b"1,2\n")),
    ]);
    let written = super::client::write_atomically(&target, body).await.unwrap();

    assert_eq!(written, 8);
    assert_eq!(std::fs::read(&target).unwrap(), b"a,b\n1,2\n");
    assert!(!dir.path().join("report.csv.part").exists());
}

#[test]
fn test_organization_context_accessor() {
    let client = ApiClient::with_token(ClientConfig::default(), "t", "org-9").unwrap();
    assert_eq!(client.organization_context(), "org-9");
}
