//! Integration tests for the lookup client

mod common;

use common::lookup_settings;
use corvus::error::ReconError;
use corvus::lookup::LookupClient;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_api_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api-info"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query_credits": 100,
            "scan_credits": 100
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_key_verified_at_construction() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    let client = LookupClient::new(&lookup_settings(&server.uri())).await;
    assert!(client.is_ok());
}

#[tokio::test]
async fn test_rejected_key_is_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api-info"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let result = LookupClient::new(&lookup_settings(&server.uri())).await;
    assert!(matches!(result, Err(ReconError::ConfigError(_))));
}

#[tokio::test]
async fn test_missing_key_is_hard_error() {
    let mut settings = common::test_settings();
    settings.shodan_api_key = None;

    let result = LookupClient::new(&settings).await;
    assert!(matches!(result, Err(ReconError::ConfigError(_))));
}

#[tokio::test]
async fn test_empty_target_list_is_contract_violation() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    let client = LookupClient::new(&lookup_settings(&server.uri()))
        .await
        .expect("Failed to create client");

    let result = client.scan_names(&[]).await;
    assert!(matches!(result, Err(ReconError::EmptyTargetList)));
}

#[tokio::test]
async fn test_host_record_normalization() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    Mock::given(method("GET"))
        .and(path("/shodan/host/192.0.2.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "country_name": "Germany",
            "country_code": "DE",
            "city": "Berlin",
            "latitude": 52.52,
            "longitude": 13.40,
            "org": "Example Org",
            "isp": "Example ISP",
            "ports": [80, 443],
            "vulns": ["CVE-2021-1234"],
            "hostnames": ["www.example.com"],
            "tags": ["cdn"],
            "last_update": "2026-08-01T00:00:00",
            "data": [
                {
                    "port": 443,
                    "_shodan": {"module": "https"},
                    "data": "HTTP/1.1 200 OK",
                    "product": "nginx",
                    "version": "1.24.0",
                    "ssl": {"versions": ["TLSv1.2", "TLSv1.3"]}
                },
                {
                    "port": 80,
                    "data": "HTTP/1.1 301 Moved Permanently"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = LookupClient::new(&lookup_settings(&server.uri()))
        .await
        .expect("Failed to create client");

    let record = client.host("192.0.2.10").await;
    assert!(record.error.is_none());
    assert_eq!(record.country, "Germany");
    assert_eq!(record.organization, "Example Org");
    assert_eq!(record.ports, vec![80, 443]);
    assert_eq!(record.vulnerabilities, vec!["CVE-2021-1234"]);
    assert_eq!(record.services.len(), 2);

    let https = &record.services[0];
    assert_eq!(https.port, Some(443));
    assert_eq!(https.protocol, "https");
    assert_eq!(https.product.as_deref(), Some("nginx"));
    assert!(https.ssl);

    let http = &record.services[1];
    assert_eq!(http.protocol, "unknown");
    assert!(!http.ssl);
}

#[tokio::test]
async fn test_lookup_error_captured_per_address() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    Mock::given(method("GET"))
        .and(path("/shodan/host/203.0.113.7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = LookupClient::new(&lookup_settings(&server.uri()))
        .await
        .expect("Failed to create client");

    let record = client.host("203.0.113.7").await;
    assert!(record.error.is_some());
    assert!(record.services.is_empty());
    assert_eq!(record.ip, "203.0.113.7");
}

#[tokio::test]
async fn test_failed_lookup_excluded_from_scanned_count() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    // Whatever localhost resolves to, the lookup call fails.
    Mock::given(method("GET"))
        .and(path_regex(r"^/shodan/host/.+"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = LookupClient::new(&lookup_settings(&server.uri()))
        .await
        .expect("Failed to create client");

    let names = vec![
        "localhost".to_string(),
        "definitely-not-a-real-host.invalid".to_string(),
    ];
    let batch = client.scan_names(&names).await.expect("Batch failed");

    assert_eq!(batch.total, 2);
    assert_eq!(batch.scanned, 0);

    let resolved = &batch.targets["localhost"];
    assert!(resolved.resolved);
    assert!(resolved.error.is_some());

    let unresolved = &batch.targets["definitely-not-a-real-host.invalid"];
    assert!(!unresolved.resolved);
    assert_eq!(
        unresolved.error.as_deref(),
        Some("could not resolve hostname")
    );
    // The sibling entries are independent of each other.
    assert!(resolved.ip.is_some());
    assert!(unresolved.ip.is_none());
}

#[tokio::test]
async fn test_successful_lookup_counts_scanned() {
    let server = MockServer::start().await;
    mock_api_info(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/shodan/host/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ports": [22],
            "org": "Loopback"
        })))
        .mount(&server)
        .await;

    let client = LookupClient::new(&lookup_settings(&server.uri()))
        .await
        .expect("Failed to create client");

    let names = vec!["localhost".to_string()];
    let batch = client.scan_names(&names).await.expect("Batch failed");

    assert_eq!(batch.scanned, 1);
    let entry = &batch.targets["localhost"];
    assert!(entry.resolved);
    assert!(entry.error.is_none());
    let host = entry.host.as_ref().expect("host record expected");
    assert_eq!(host.organization, "Loopback");
    assert_eq!(host.country, "Unknown");
}
