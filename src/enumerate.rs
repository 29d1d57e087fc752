//! Passive subdomain enumeration via an external enumerator
//!
//! Shells out to Amass in passive mode and parses its line-oriented
//! output. Text mode returns bare names; record mode asks the tool for
//! one JSON record per line and returns the decoded records.

use crate::config::Settings;
use crate::error::{ReconError, Result};
use crate::exec;
use crate::models::NamedRecord;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Wraps the external enumeration tool
pub struct Enumerator {
    tool_path: String,
    timeout_secs: u64,
}

impl Enumerator {
    /// Verifies the enumeration binary is reachable and builds the wrapper.
    /// A missing binary is a hard `ToolMissing` error.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let banner = exec::verify_tool(&settings.enum_tool_path, &["-version"]).await?;
        info!("Enumerator found: {}", banner);
        Ok(Self {
            tool_path: settings.enum_tool_path.clone(),
            timeout_secs: settings.enum_timeout_secs,
        })
    }

    /// Enumerates subdomains for a domain in passive mode.
    /// Returns a sorted, deduplicated list of discovered names.
    pub async fn enumerate(&self, domain: &str) -> Result<Vec<String>> {
        let domain = normalize_target(domain)?;
        info!("Starting subdomain enumeration for: {}", domain);

        let args = ["enum", "-passive", "-d", domain.as_str()];
        let output = exec::run_command(&self.tool_path, &args, self.timeout_secs).await?;

        if !output.success() {
            return Err(ReconError::ToolFailed {
                tool: self.tool_path.clone(),
                detail: output.stderr.trim().to_string(),
            });
        }

        let subdomains = parse_text_output(&output.stdout);
        info!("Found {} subdomains", subdomains.len());
        Ok(subdomains)
    }

    /// Enumerates subdomains and returns per-name records with metadata.
    /// The tool writes one JSON record per line to a temporary file,
    /// removed when this call returns regardless of outcome.
    pub async fn enumerate_records(&self, domain: &str) -> Result<Vec<NamedRecord>> {
        let domain = normalize_target(domain)?;
        info!("Starting record enumeration for: {}", domain);

        let tmp = tempfile::Builder::new()
            .prefix("corvus-enum-")
            .suffix(".json")
            .tempfile()?;
        let json_path = tmp.path().to_string_lossy().into_owned();

        let args = [
            "enum",
            "-passive",
            "-d",
            domain.as_str(),
            "-json",
            json_path.as_str(),
        ];
        let output = exec::run_command(&self.tool_path, &args, self.timeout_secs).await?;

        if !output.success() {
            return Err(ReconError::ToolFailed {
                tool: self.tool_path.clone(),
                detail: output.stderr.trim().to_string(),
            });
        }

        let records = match std::fs::read_to_string(tmp.path()) {
            Ok(content) => parse_record_lines(&content),
            Err(e) => {
                warn!("Record output file not readable: {}", e);
                Vec::new()
            }
        };

        info!("Found {} subdomains with metadata", records.len());
        Ok(records)
    }
}

/// Validates and canonicalizes a target name: trimmed, lowercased,
/// non-empty. Fails fast before any external call.
pub fn normalize_target(target: &str) -> Result<String> {
    let normalized = target.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ReconError::InvalidTarget(
            "target must be a non-empty string".to_string(),
        ));
    }
    Ok(normalized)
}

/// Extracts discovered names from raw enumerator stdout.
/// Lines starting with `[` are tool log markers and are discarded;
/// the result is deduplicated and lexicographically sorted.
pub fn parse_text_output(output: &str) -> Vec<String> {
    let mut names = BTreeSet::new();

    for line in output.lines() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('[') {
            names.insert(line.to_string());
        }
    }

    names.into_iter().collect()
}

/// Decodes one-record-per-line JSON output, preserving input order.
/// Lines that fail to decode are skipped; records without a name are
/// dropped.
pub fn parse_record_lines(content: &str) -> Vec<NamedRecord> {
    let mut records = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<NamedRecord>(line) {
            Ok(record) if !record.name.is_empty() => records.push(record),
            Ok(_) => continue,
            Err(_) => continue,
        }
    }

    records
}
