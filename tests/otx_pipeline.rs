//! End-to-end OTX runs against a mocked API.

use std::sync::Mutex;

use async_trait::async_trait;
use intel_etl::error::{AppError, Result};
use intel_etl::models::{IngestedRecord, OtxConfig};
use intel_etl::pipeline::run_otx;
use intel_etl::services::{API_KEY_HEADER, OtxClient};
use intel_etl::storage::{LocalStore, RecordStore};
use intel_etl::utils::http::ApiClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn otx_client(server: &MockServer) -> OtxClient {
    let api = ApiClient::with_client(reqwest::Client::new());
    let config = OtxConfig {
        base_url: format!("{}/api/v1/indicators", server.uri()),
        api_key: Some("test-key".into()),
    };
    OtxClient::new(api, &config).unwrap()
}

async fn mock_ip(server: &MockServer, ip: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/indicators/IPv4/{ip}/general")))
        .and(header(API_KEY_HEADER, "test-key"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn ips(list: &[&str]) -> Vec<String> {
    list.iter().map(|ip| ip.to_string()).collect()
}

/// Store that counts what it is given and then fails the write.
#[derive(Default)]
struct FailingStore {
    attempted: Mutex<usize>,
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn ensure_index(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_one(&self, _record: &IngestedRecord) -> Result<()> {
        Err(AppError::Io(std::io::Error::other("write refused")))
    }

    async fn insert_many(&self, records: &[IngestedRecord]) -> Result<usize> {
        *self.attempted.lock().unwrap() += records.len();
        Err(AppError::Io(std::io::Error::other("write refused")))
    }
}

#[tokio::test]
async fn test_example_record() {
    let server = MockServer::start().await;
    let body = json!({"pulse_info": {"count": 3}, "reputation": {"malicious": true}});
    mock_ip(&server, "8.8.8.8", ResponseTemplate::new(200).set_body_json(&body)).await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let summary = run_otx(&otx_client(&server), &store, &ips(&["8.8.8.8"]))
        .await
        .unwrap();
    assert_eq!(summary.inserted, 1);

    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].input, "8.8.8.8");
    assert_eq!(records[0].pulse_count, Some(3));
    assert_eq!(records[0].is_malicious, Some(true));
    assert_eq!(records[0].raw, body);
}

#[tokio::test]
async fn test_failures_are_skipped() {
    let server = MockServer::start().await;
    mock_ip(
        &server,
        "8.8.8.8",
        ResponseTemplate::new(200).set_body_json(json!({"pulse_info": {"count": 1}})),
    )
    .await;
    mock_ip(
        &server,
        "10.0.0.1",
        ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})),
    )
    .await;
    mock_ip(
        &server,
        "9.9.9.9",
        ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"),
    )
    .await;
    mock_ip(
        &server,
        "1.1.1.1",
        ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])),
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());
    let input = ips(&["8.8.8.8", "10.0.0.1", "8.8.8.8", "9.9.9.9", "1.1.1.1"]);

    let summary = run_otx(&otx_client(&server), &store, &input).await.unwrap();

    assert_eq!(summary.requested, 5);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.inserted, 2);

    // Duplicate inputs land as two independent records
    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.input == "8.8.8.8"));
}

#[tokio::test]
async fn test_all_failures_insert_nothing() {
    let server = MockServer::start().await;
    mock_ip(&server, "10.0.0.1", ResponseTemplate::new(403)).await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let summary = run_otx(&otx_client(&server), &store, &ips(&["10.0.0.1"]))
        .await
        .unwrap();

    assert_eq!(summary.attempted, 0);
    assert_eq!(summary.inserted, 0);
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_skips_ip_without_second_request() {
    let server = MockServer::start().await;
    // Mounted first so it answers the only request; the 200 would match a second one
    Mock::given(method("GET"))
        .and(path("/api/v1/indicators/IPv4/10.0.0.9/general"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mock_ip(
        &server,
        "10.0.0.9",
        ResponseTemplate::new(200).set_body_json(json!({"pulse_info": {"count": 1}})),
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let summary = run_otx(&otx_client(&server), &store, &ips(&["10.0.0.9"]))
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.inserted, 0);
    assert!(store.load_all().await.unwrap().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_error_does_not_fail_run() {
    let server = MockServer::start().await;
    mock_ip(
        &server,
        "8.8.8.8",
        ResponseTemplate::new(200).set_body_json(json!({"indicator": "8.8.8.8"})),
    )
    .await;

    let store = FailingStore::default();
    let summary = run_otx(&otx_client(&server), &store, &ips(&["8.8.8.8", "8.8.8.8"]))
        .await
        .unwrap();

    assert_eq!(*store.attempted.lock().unwrap(), 2);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.inserted, 0);
}
