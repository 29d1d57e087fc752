//! Core data models for the Corvus pipeline

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// State of a scanned port
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

impl PortState {
    /// Maps a state token from scanner output; anything else is dropped
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "open" => Some(PortState::Open),
            "closed" => Some(PortState::Closed),
            "filtered" => Some(PortState::Filtered),
            _ => None,
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::Closed => write!(f, "closed"),
            PortState::Filtered => write!(f, "filtered"),
        }
    }
}

/// A single port observation from a scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortEntry {
    pub port: u16,
    pub state: PortState,
    pub service: String,
}

/// One enumeration record with resolution metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRecord {
    /// Discovered hostname
    #[serde(default)]
    pub name: String,
    /// DNS record type
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    /// Data source that disclosed the name
    #[serde(default)]
    pub source: Option<String>,
    /// Source classification tag
    #[serde(default)]
    pub tag: Option<String>,
    /// Resolved addresses; empty when unresolved
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Certificate fields extracted from scan output.
/// `None` means no matching line was found, not that none exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub subject: Option<String>,
    pub issuer: Option<String>,
}

impl CertificateInfo {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.issuer.is_none()
    }
}

/// Result of a port scan against one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortScanReport {
    pub target: String,
    pub timestamp: DateTime<Local>,
    /// Open port numbers, ascending
    pub open_ports: Vec<u16>,
    /// Closed port numbers, ascending
    pub closed_ports: Vec<u16>,
    /// Filtered port numbers, ascending
    pub filtered_ports: Vec<u16>,
    /// Service name per open port
    pub services: BTreeMap<u16, String>,
}

impl PortScanReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timestamp: Local::now(),
            open_ports: Vec::new(),
            closed_ports: Vec::new(),
            filtered_ports: Vec::new(),
            services: BTreeMap::new(),
        }
    }
}

/// Result of an SSL/TLS scan against one target port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslScanReport {
    pub target: String,
    pub port: u16,
    pub timestamp: DateTime<Local>,
    /// Coarse substring-based detection, not a protocol-level confirmation
    pub ssl_enabled: bool,
    pub certificate_info: CertificateInfo,
    /// Cipher suite names, first occurrence order
    pub ciphers: Vec<String>,
    /// Negotiated protocol names, first occurrence order
    pub protocols: Vec<String>,
}

impl SslScanReport {
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
            timestamp: Local::now(),
            ssl_enabled: false,
            certificate_info: CertificateInfo::default(),
            ciphers: Vec::new(),
            protocols: Vec::new(),
        }
    }
}

/// Combined scan report for one target. Sub-scan failures land in
/// `errors`; they never abort the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub timestamp: DateTime<Local>,
    pub port_scan: Option<PortScanReport>,
    pub ssl_scan: Option<SslScanReport>,
    pub errors: Vec<String>,
}

impl ScanReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timestamp: Local::now(),
            port_scan: None,
            ssl_scan: None,
            errors: Vec::new(),
        }
    }
}

/// One disclosed service on a looked-up address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub port: Option<u16>,
    /// Protocol/module label reported by the lookup service
    pub protocol: String,
    /// Raw banner text
    pub banner: String,
    pub product: Option<String>,
    pub version: Option<String>,
    /// Whether the service disclosed TLS metadata
    pub ssl: bool,
    pub timestamp: Option<String>,
}

/// Normalized lookup-service metadata for one address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    pub ip: String,
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organization: String,
    pub isp: String,
    pub ports: Vec<u16>,
    pub services: Vec<ServiceDetail>,
    pub vulnerabilities: Vec<String>,
    pub hostnames: Vec<String>,
    pub os: Option<String>,
    pub tags: Vec<String>,
    pub last_update: String,
    /// Populated when the lookup call for this address failed
    pub error: Option<String>,
}

impl HostRecord {
    /// Record carrying only an error, for a failed lookup
    pub fn from_error(ip: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            country: "Unknown".to_string(),
            country_code: "N/A".to_string(),
            city: "Unknown".to_string(),
            latitude: None,
            longitude: None,
            organization: "Unknown".to_string(),
            isp: "Unknown".to_string(),
            ports: Vec::new(),
            services: Vec::new(),
            vulnerabilities: Vec::new(),
            hostnames: Vec::new(),
            os: None,
            tags: Vec::new(),
            last_update: "N/A".to_string(),
            error: Some(error.into()),
        }
    }
}

/// Per-name result of a resolve-and-lookup pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetLookup {
    pub name: String,
    pub ip: Option<String>,
    pub resolved: bool,
    pub host: Option<HostRecord>,
    pub error: Option<String>,
}

impl TargetLookup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: None,
            resolved: false,
            host: None,
            error: None,
        }
    }
}

/// Batch lookup result keyed by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupBatch {
    pub timestamp: DateTime<Local>,
    pub total: usize,
    /// Names that resolved and were queried without error
    pub scanned: usize,
    pub targets: BTreeMap<String, TargetLookup>,
}

impl LookupBatch {
    pub fn new(total: usize) -> Self {
        Self {
            timestamp: Local::now(),
            total,
            scanned: 0,
            targets: BTreeMap::new(),
        }
    }
}

/// A named report attachment forwarded to the webhook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportFile {
    pub name: String,
    pub content: String,
}

impl ReportFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Outcome status for delivery and pipeline runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of one webhook delivery attempt. Never constructed by
/// raising; failures are reported in `reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub status: OutcomeStatus,
    pub code: Option<u16>,
    pub reason: Option<String>,
    /// Endpoint response, JSON when parseable, raw text otherwise
    pub response: Option<serde_json::Value>,
}

impl DeliveryOutcome {
    pub fn success(code: u16, response: serde_json::Value) -> Self {
        Self {
            status: OutcomeStatus::Success,
            code: Some(code),
            reason: None,
            response: Some(response),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            code: None,
            reason: Some(reason.into()),
            response: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// One failed pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepError {
    pub step: String,
    pub message: String,
}

impl StepError {
    pub fn new(step: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            step: step.into(),
            message: message.to_string(),
        }
    }
}

/// Top-level result of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: OutcomeStatus,
    pub domain: String,
    /// Unique run identifier
    pub run_id: String,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub duration_secs: f64,
    pub subdomains: Vec<String>,
    pub subdomains_found: usize,
    pub lookup: Option<LookupBatch>,
    pub scan: Option<ScanReport>,
    /// Path of the plain-text scan report written during the run
    pub scan_report_path: Option<String>,
    pub delivery: Option<DeliveryOutcome>,
    pub errors: Vec<StepError>,
}

impl PipelineResult {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            domain: domain.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Local::now(),
            finished_at: None,
            duration_secs: 0.0,
            subdomains: Vec::new(),
            subdomains_found: 0,
            lookup: None,
            scan: None,
            scan_report_path: None,
            delivery: None,
            errors: Vec::new(),
        }
    }

    /// Marks the run as finished
    pub fn finish(&mut self, duration_secs: f64) {
        self.finished_at = Some(Local::now());
        self.duration_secs = duration_secs;
    }
}
