//! Plain-text scan report export

use crate::error::Result;
use crate::models::ScanReport;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// Writes a formatted plain-text scan report, creating parent
/// directories as needed
pub fn write_scan_report(report: &ScanReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, render_scan_report(report))?;
    info!("Results saved to {}", output_path.display());
    Ok(())
}

/// Renders a scan report in the conventional sectioned layout
pub fn render_scan_report(report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "NMAP SCAN RESULTS");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Target: {}", report.target);
    let _ = writeln!(out, "Timestamp: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out);

    if let Some(port_scan) = &report.port_scan {
        let _ = writeln!(out, "PORT SCAN RESULTS");
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "Open Ports: {}", port_scan.open_ports.len());
        if !port_scan.open_ports.is_empty() {
            let ports: Vec<String> = port_scan.open_ports.iter().map(u16::to_string).collect();
            let _ = writeln!(out, "  {}", ports.join(", "));
            let _ = writeln!(out);
            let _ = writeln!(out, "Services:");
            for (port, service) in &port_scan.services {
                let _ = writeln!(out, "  Port {port}: {service}");
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Closed Ports: {}", port_scan.closed_ports.len());
        let _ = writeln!(out, "Filtered Ports: {}", port_scan.filtered_ports.len());
        let _ = writeln!(out);
    }

    if let Some(ssl_scan) = &report.ssl_scan {
        let _ = writeln!(out, "SSL/TLS ANALYSIS");
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "SSL/TLS Enabled: {}", ssl_scan.ssl_enabled);
        if !ssl_scan.certificate_info.is_empty() {
            let _ = writeln!(out, "Certificate Information:");
            if let Some(subject) = &ssl_scan.certificate_info.subject {
                let _ = writeln!(out, "  Subject: {subject}");
            }
            if let Some(issuer) = &ssl_scan.certificate_info.issuer {
                let _ = writeln!(out, "  Issuer: {issuer}");
            }
        }
        if !ssl_scan.protocols.is_empty() {
            let _ = writeln!(out, "Protocols: {}", ssl_scan.protocols.join(", "));
        }
        if !ssl_scan.ciphers.is_empty() {
            let _ = writeln!(out, "Ciphers: {} found", ssl_scan.ciphers.len());
        }
        let _ = writeln!(out);
    }

    if !report.errors.is_empty() {
        let _ = writeln!(out, "ERRORS");
        let _ = writeln!(out, "{THIN_RULE}");
        for error in &report.errors {
            let _ = writeln!(out, "  - {error}");
        }
    }

    out
}
