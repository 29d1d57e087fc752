//! Integration tests for report serialization

use corvus::models::{PipelineResult, PortScanReport, ScanReport};
use corvus::report;

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("result.json");

    let mut result = PipelineResult::new("example.com");
    result.subdomains = vec!["www.example.com".to_string()];
    result.subdomains_found = 1;
    result.finish(1.5);

    report::json::export(&result, &path).expect("Export failed");
    let loaded: PipelineResult = report::json::load(&path).expect("Load failed");

    assert_eq!(loaded.domain, "example.com");
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.subdomains, result.subdomains);
    assert_eq!(loaded.duration_secs, 1.5);
}

#[test]
fn test_export_creates_parent_directories() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("reports").join("nested").join("scan.json");

    let report = ScanReport::new("example.com");
    report::json::export(&report, &path).expect("Export failed");

    assert!(path.exists());
}

#[test]
fn test_text_report_written_to_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("out").join("scan.txt");

    let mut report = ScanReport::new("example.com");
    let mut ports = PortScanReport::new("example.com");
    ports.open_ports = vec![80];
    ports.services.insert(80, "http".to_string());
    report.port_scan = Some(ports);

    report::text::write_scan_report(&report, &path).expect("Write failed");

    let content = std::fs::read_to_string(&path).expect("Read failed");
    assert!(content.contains("NMAP SCAN RESULTS"));
    assert!(content.contains("Port 80: http"));
}
