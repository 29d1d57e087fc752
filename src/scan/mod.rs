//! Port and SSL/TLS scanning via a containerized scanner
//!
//! Runs Nmap through the container runtime with fixed flag sets and
//! extracts results from its XML output. The runtime binary is probed
//! once at construction.

pub mod extract;

use crate::config::Settings;
use crate::enumerate::normalize_target;
use crate::error::{ReconError, Result};
use crate::exec::{self, CommandOutput};
use crate::models::{PortEntry, PortScanReport, PortState, ScanReport, SslScanReport};
use tracing::{error, info};

/// Wraps the containerized port scanner
pub struct PortScanner {
    docker_path: String,
    image: String,
    timeout_secs: u64,
}

impl PortScanner {
    /// Verifies the container runtime is reachable and builds the
    /// scanner. A missing runtime is a hard `ToolMissing` error.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let banner = exec::verify_tool(&settings.docker_path, &["--version"]).await?;
        info!("Container runtime available: {}", banner);
        Ok(Self {
            docker_path: settings.docker_path.clone(),
            image: settings.scanner_image.clone(),
            timeout_secs: settings.scan_timeout_secs,
        })
    }

    async fn run_scanner(&self, scanner_args: &[&str]) -> Result<CommandOutput> {
        let mut args = vec!["run", "--rm", self.image.as_str()];
        args.extend_from_slice(scanner_args);

        let output = exec::run_command(&self.docker_path, &args, self.timeout_secs).await?;

        // Exit code 1 still means "scan completed with findings".
        if !matches!(output.code, Some(0) | Some(1)) {
            return Err(ReconError::ToolFailed {
                tool: "nmap".to_string(),
                detail: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Scans a port range on the target and partitions the results by
    /// state. Open-port entries populate the port-to-service mapping.
    pub async fn port_scan(
        &self,
        target: &str,
        ports: &str,
        service_detection: bool,
    ) -> Result<PortScanReport> {
        let target = normalize_target(target)?;
        info!("Starting port scan on {} (ports: {})", target, ports);

        let probe = if service_detection { "-sV" } else { "-sS" };
        let args = ["nmap", "-p", ports, probe, "-oX", "-", target.as_str()];
        let output = self.run_scanner(&args).await?;

        let report = partition_ports(&target, extract::parse_port_entries(&output.stdout));
        info!(
            "Port scan complete: {} open ports found",
            report.open_ports.len()
        );
        Ok(report)
    }

    /// Runs the SSL/TLS script scan against one port and extracts
    /// certificate, cipher, and protocol details.
    pub async fn ssl_scan(&self, target: &str, port: u16) -> Result<SslScanReport> {
        let target = normalize_target(target)?;
        info!("Starting SSL/TLS scan on {}:{}", target, port);

        let port_arg = port.to_string();
        let args = [
            "nmap",
            "-p",
            port_arg.as_str(),
            "--script",
            "ssl-enum-ciphers,ssl-cert",
            "-sV",
            "-oX",
            "-",
            target.as_str(),
        ];
        let output = self.run_scanner(&args).await?;

        let mut report = SslScanReport::new(&target, port);
        report.ssl_enabled = extract::ssl_enabled(&output.stdout);
        report.certificate_info = extract::extract_certificate(&output.stdout);
        report.ciphers = extract::extract_ciphers(&output.stdout);
        report.protocols = extract::extract_protocols(&output.stdout);

        info!("SSL/TLS scan complete");
        Ok(report)
    }

    /// Runs both the port scan and the SSL/TLS scan. Each sub-scan's
    /// failure is recorded in the report's error list; the report itself
    /// always returns.
    pub async fn full_scan(&self, target: &str, ports: &str, ssl_port: u16) -> ScanReport {
        info!("Starting full scan on {}", target);
        let mut report = ScanReport::new(target);

        match self.port_scan(target, ports, true).await {
            Ok(ports_report) => report.port_scan = Some(ports_report),
            Err(e) => {
                error!("Port scan error: {}", e);
                report.errors.push(format!("Port scan: {e}"));
            }
        }

        match self.ssl_scan(target, ssl_port).await {
            Ok(ssl_report) => report.ssl_scan = Some(ssl_report),
            Err(e) => {
                error!("SSL/TLS scan error: {}", e);
                report.errors.push(format!("SSL/TLS scan: {e}"));
            }
        }

        info!("Full scan complete");
        report
    }
}

/// Partitions port entries by state into a report. Open-port entries
/// populate the port-to-service mapping; all lists come back sorted
/// ascending.
pub fn partition_ports(target: &str, entries: Vec<PortEntry>) -> PortScanReport {
    let mut report = PortScanReport::new(target);
    for entry in entries {
        match entry.state {
            PortState::Open => {
                report.open_ports.push(entry.port);
                report.services.insert(entry.port, entry.service);
            }
            PortState::Closed => report.closed_ports.push(entry.port),
            PortState::Filtered => report.filtered_ports.push(entry.port),
        }
    }
    report.open_ports.sort_unstable();
    report.closed_ports.sort_unstable();
    report.filtered_ports.sort_unstable();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(port: u16, state: PortState, service: &str) -> PortEntry {
        PortEntry {
            port,
            state,
            service: service.to_string(),
        }
    }

    #[test]
    fn test_partition_ports() {
        let entries = vec![
            entry(443, PortState::Open, "https"),
            entry(22, PortState::Closed, "unknown"),
            entry(80, PortState::Open, "http"),
        ];

        let report = partition_ports("example.com", entries);
        assert_eq!(report.open_ports, vec![80, 443]);
        assert_eq!(report.closed_ports, vec![22]);
        assert!(report.filtered_ports.is_empty());
        assert_eq!(report.services.len(), 2);
        assert_eq!(report.services.get(&80).map(String::as_str), Some("http"));
        assert_eq!(report.services.get(&443).map(String::as_str), Some("https"));
    }

    #[test]
    fn test_partition_ports_counts_by_state() {
        let entries = vec![
            entry(25, PortState::Filtered, "unknown"),
            entry(8080, PortState::Open, "http-alt"),
            entry(21, PortState::Closed, "unknown"),
            entry(23, PortState::Closed, "unknown"),
        ];

        let report = partition_ports("example.com", entries);
        assert_eq!(report.open_ports.len(), 1);
        assert_eq!(report.closed_ports.len(), 2);
        assert_eq!(report.filtered_ports.len(), 1);
        assert_eq!(report.services.len(), 1);
        assert_eq!(report.closed_ports, vec![21, 23]);
    }
}
