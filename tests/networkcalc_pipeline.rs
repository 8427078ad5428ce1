//! End-to-end NetworkCalc runs against a mocked API.


use intel_etl::error::AppError;
use intel_etl::models::{NetworkCalcConfig, SampleInputs, Source};
use intel_etl::pipeline::run_networkcalc;
use intel_etl::services::{Endpoint, Mode, NetworkCalcClient};
use intel_etl::storage::LocalStore;
use intel_etl::utils::http::ApiClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn networkcalc_client(server: &MockServer) -> NetworkCalcClient {
    let api = ApiClient::with_client(reqwest::Client::new());
    let config = NetworkCalcConfig {
        base_url: format!("{}/api", server.uri()),
        ..NetworkCalcConfig::default()
    };
    NetworkCalcClient::new(api, &config).unwrap()
}

#[tokio::test]
async fn test_binary_mode_stores_record() {
    let server = MockServer::start().await;
    let body = json!({"status": "OK", "converted": "11111111"});
    Mock::given(method("GET"))
        .and(path("/api/binary/255"))
        .and(query_param("from", "10"))
        .and(query_param("to", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let summary = run_networkcalc(
        &networkcalc_client(&server),
        &store,
        Mode::Single(Endpoint::Binary),
        Some("255"),
        &SampleInputs::default(),
    )
    .await
    .unwrap();
    assert_eq!(summary.inserted, 1);

    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, Source::NetworkCalc);
    assert_eq!(records[0].endpoint, "binary");
    assert_eq!(records[0].input, "255");
    assert_eq!(records[0].raw, body);
}

#[tokio::test]
async fn test_binary_not_found_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/binary/255"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let err = run_networkcalc(
        &networkcalc_client(&server),
        &store,
        Mode::Single(Endpoint::Binary),
        Some("255"),
        &SampleInputs::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Status { status: 404, .. }));
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_all_mode_stops_at_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ip/192.168.1.1/24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/binary/255"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/security/certificate/networkcalc.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let err = run_networkcalc(
        &networkcalc_client(&server),
        &store,
        Mode::All,
        None,
        &SampleInputs::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NonJson { .. }));

    // The subnet record was stored before the binary lookup failed
    let records = store.load_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].endpoint, "ip");
}

#[tokio::test]
async fn test_all_mode_fetches_every_endpoint() {
    let server = MockServer::start().await;
    for route in [
        "/api/ip/192.168.1.1/24",
        "/api/binary/255",
        "/api/security/certificate/networkcalc.com",
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"route": route})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());

    let summary = run_networkcalc(
        &networkcalc_client(&server),
        &store,
        Mode::All,
        None,
        &SampleInputs::default(),
    )
    .await
    .unwrap();
    assert_eq!(summary.inserted, 3);

    let endpoints: Vec<String> = store
        .load_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.endpoint)
        .collect();
    assert_eq!(endpoints, vec!["ip", "binary", "certificate"]);
}
