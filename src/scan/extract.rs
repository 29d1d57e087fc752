//! Pattern extraction from semi-structured scanner output
//!
//! Each pattern lives behind its own named function so that a change in
//! the tool's output format localizes to one place. A pattern that fails
//! to compile degrades to an empty/default result with a warning; it
//! never reaches the caller.

use crate::models::{CertificateInfo, PortEntry, PortState};
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

const PORT_PATTERN: &str =
    r#"(?s)<port protocol="tcp" portid="(\d+)"><state state="(\w+)"[^>]*>.*?</state>(?:<service name="([^"]*)"[^>]*>)?"#;
const SUBJECT_PATTERN: &str = r"Subject: ([^\n]*)";
const ISSUER_PATTERN: &str = r"Issuer: ([^\n]*)";
const CIPHER_PATTERN: &str = r"TLSv[\d.]+ ([A-Z0-9_-]+)";
const PROTOCOL_PATTERN: &str = r"(TLSv[\d.]+|SSLv[\d.]+)";

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Scan pattern failed to compile: {}", e);
            None
        }
    }
}

/// Extracts port observations from XML-ish scan output.
/// Entries with an out-of-range port number or an unrecognized state
/// token are dropped; at most one entry per port number is kept.
pub fn parse_port_entries(output: &str) -> Vec<PortEntry> {
    let Some(re) = compile(PORT_PATTERN) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for caps in re.captures_iter(output) {
        let port: u16 = match caps[1].parse() {
            Ok(p) if p > 0 => p,
            _ => continue,
        };
        let Some(state) = PortState::from_token(&caps[2]) else {
            continue;
        };
        if !seen.insert(port) {
            continue;
        }
        let service = caps
            .get(3)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string();
        entries.push(PortEntry {
            port,
            state,
            service,
        });
    }

    entries
}

/// Extracts certificate subject and issuer; the first match of each
/// line prefix wins, later duplicates are ignored
pub fn extract_certificate(output: &str) -> CertificateInfo {
    CertificateInfo {
        subject: extract_subject(output),
        issuer: extract_issuer(output),
    }
}

/// First `Subject:` line, trimmed
pub fn extract_subject(output: &str) -> Option<String> {
    let re = compile(SUBJECT_PATTERN)?;
    re.captures(output)
        .map(|caps| caps[1].trim().to_string())
}

/// First `Issuer:` line, trimmed
pub fn extract_issuer(output: &str) -> Option<String> {
    let re = compile(ISSUER_PATTERN)?;
    re.captures(output)
        .map(|caps| caps[1].trim().to_string())
}

/// Every distinct cipher-suite token, first occurrence order
pub fn extract_ciphers(output: &str) -> Vec<String> {
    collect_distinct(output, CIPHER_PATTERN)
}

/// Every distinct protocol token (`TLSv*`/`SSLv*`), first occurrence order
pub fn extract_protocols(output: &str) -> Vec<String> {
    collect_distinct(output, PROTOCOL_PATTERN)
}

fn collect_distinct(output: &str, pattern: &str) -> Vec<String> {
    let Some(re) = compile(pattern) else {
        return Vec::new();
    };

    let mut tokens: Vec<String> = Vec::new();
    for caps in re.captures_iter(output) {
        let token = caps[1].to_string();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Coarse SSL/TLS presence test: a case-insensitive substring match,
/// an approximation rather than a protocol-level confirmation
pub fn ssl_enabled(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("ssl") || lower.contains("tls")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORT_XML: &str = concat!(
        r#"<port protocol="tcp" portid="80"><state state="open" reason="syn-ack"></state><service name="http" method="probed"></service></port>"#,
        r#"<port protocol="tcp" portid="443"><state state="open" reason="syn-ack"></state><service name="https" method="probed"></service></port>"#,
        r#"<port protocol="tcp" portid="22"><state state="closed" reason="reset"></state></port>"#,
    );

    #[test]
    fn test_parse_port_entries() {
        let entries = parse_port_entries(PORT_XML);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].port, 80);
        assert_eq!(entries[0].state, PortState::Open);
        assert_eq!(entries[0].service, "http");
        assert_eq!(entries[2].port, 22);
        assert_eq!(entries[2].state, PortState::Closed);
        assert_eq!(entries[2].service, "unknown");
    }

    #[test]
    fn test_parse_port_entries_dedup_and_bounds() {
        let xml = concat!(
            r#"<port protocol="tcp" portid="80"><state state="open"></state><service name="http"></service></port>"#,
            r#"<port protocol="tcp" portid="80"><state state="closed"></state></port>"#,
            r#"<port protocol="tcp" portid="0"><state state="open"></state></port>"#,
            r#"<port protocol="tcp" portid="70000"><state state="open"></state></port>"#,
        );
        let entries = parse_port_entries(xml);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].port, 80);
        assert_eq!(entries[0].state, PortState::Open);
    }

    #[test]
    fn test_extract_certificate_first_match_wins() {
        let output = "Subject: CN=example.com\nIssuer: CN=Example CA\nSubject: CN=second.example.com";
        let cert = extract_certificate(output);
        assert_eq!(cert.subject.as_deref(), Some("CN=example.com"));
        assert_eq!(cert.issuer.as_deref(), Some("CN=Example CA"));
    }

    #[test]
    fn test_extract_certificate_absent() {
        let cert = extract_certificate("no certificate lines here");
        assert!(cert.is_empty());
    }

    #[test]
    fn test_extract_ciphers_distinct_in_order() {
        let output = "TLSv1.2 ECDHE-RSA-AES128\nTLSv1.3 AES256-GCM\nTLSv1.2 ECDHE-RSA-AES128";
        let ciphers = extract_ciphers(output);
        assert_eq!(ciphers, vec!["ECDHE-RSA-AES128", "AES256-GCM"]);
    }

    #[test]
    fn test_extract_protocols_distinct_in_order() {
        let output = "TLSv1.2 CIPHER-A\nSSLv3 weak\nTLSv1.2 CIPHER-B\nTLSv1.3 CIPHER-C";
        let protocols = extract_protocols(output);
        assert_eq!(protocols, vec!["TLSv1.2", "SSLv3", "TLSv1.3"]);
    }

    #[test]
    fn test_ssl_enabled_case_insensitive() {
        assert!(ssl_enabled("negotiated TLSv1.2"));
        assert!(ssl_enabled("SSL session established"));
        assert!(!ssl_enabled("plain tcp banner"));
    }
}
