//! Configuration management for the Corvus pipeline
//!
//! All ambient process state (environment variables, optional TOML file)
//! is read once at startup into a `Settings` value; components receive
//! it by reference and never touch the environment themselves.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Environment variable carrying the webhook endpoint URL
pub const ENV_WEBHOOK_URL: &str = "CORVUS_WEBHOOK_URL";
/// Environment variable carrying the lookup-service API key
pub const ENV_SHODAN_KEY: &str = "SHODAN_API_KEY";
/// Environment variable carrying the AI-analysis API key
pub const ENV_GEMINI_KEY: &str = "GEMINI_API_KEY";
/// Environment variable carrying the document-creation API key
pub const ENV_GOOGLE_KEY: &str = "GOOGLE_API_KEY";

/// Process-wide settings, constructed once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    /// Webhook endpoint for report delivery
    pub webhook_url: Option<String>,
    /// Lookup-service API key
    pub shodan_api_key: Option<String>,
    /// AI-analysis API key
    pub gemini_api_key: Option<String>,
    /// Document-creation API key
    pub google_api_key: Option<String>,
    /// Lookup-service base URL
    pub lookup_base_url: String,
    /// Number of enumerated names forwarded to the lookup service
    pub lookup_limit: usize,
    /// AI-analysis endpoint URL
    pub analysis_url: String,
    /// AI-analysis request timeout in seconds
    pub analysis_timeout_secs: u64,
    /// Webhook request timeout in seconds
    pub webhook_timeout_secs: u64,
    /// Worker bound for batch webhook delivery
    pub delivery_workers: usize,
    /// Path of the enumeration binary
    pub enum_tool_path: String,
    /// Path of the container runtime binary
    pub docker_path: String,
    /// Container image carrying the port scanner
    pub scanner_image: String,
    /// Enumeration subprocess timeout in seconds
    pub enum_timeout_secs: u64,
    /// Scan subprocess timeout in seconds
    pub scan_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            shodan_api_key: None,
            gemini_api_key: None,
            google_api_key: None,
            lookup_base_url: "https://api.shodan.io".to_string(),
            lookup_limit: 5,
            analysis_url:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
                    .to_string(),
            analysis_timeout_secs: 30,
            webhook_timeout_secs: 30,
            delivery_workers: 3,
            enum_tool_path: "amass".to_string(),
            docker_path: "docker".to_string(),
            scanner_image: "nmap/nmap:latest".to_string(),
            enum_timeout_secs: 300,
            scan_timeout_secs: 300,
        }
    }
}

impl Settings {
    /// Builds settings from defaults plus environment variables.
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        Self {
            webhook_url: read_env(ENV_WEBHOOK_URL),
            shodan_api_key: read_env(ENV_SHODAN_KEY),
            gemini_api_key: read_env(ENV_GEMINI_KEY),
            google_api_key: read_env(ENV_GOOGLE_KEY),
            ..Self::default()
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// File-based configuration structure matching default.toml
#[derive(Debug, Deserialize)]
struct FileSettings {
    webhook: Option<WebhookSection>,
    lookup: Option<LookupSection>,
    analysis: Option<AnalysisSection>,
    tools: Option<ToolsSection>,
}

#[derive(Debug, Deserialize)]
struct WebhookSection {
    url: Option<String>,
    timeout_secs: Option<u64>,
    workers: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LookupSection {
    base_url: Option<String>,
    api_key: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct AnalysisSection {
    url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ToolsSection {
    enumerator: Option<String>,
    docker: Option<String>,
    scanner_image: Option<String>,
    enum_timeout_secs: Option<u64>,
    scan_timeout_secs: Option<u64>,
}

/// Loads a TOML configuration file and merges it over environment-derived
/// settings; file values win where both are present
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let file: FileSettings = toml::from_str(&content)?;

    let mut settings = Settings::from_env();

    if let Some(webhook) = file.webhook {
        if let Some(url) = webhook.url {
            settings.webhook_url = Some(url);
        }
        if let Some(timeout) = webhook.timeout_secs {
            settings.webhook_timeout_secs = timeout;
        }
        if let Some(workers) = webhook.workers {
            settings.delivery_workers = workers;
        }
    }

    if let Some(lookup) = file.lookup {
        if let Some(base_url) = lookup.base_url {
            settings.lookup_base_url = base_url;
        }
        if let Some(key) = lookup.api_key {
            settings.shodan_api_key = Some(key);
        }
        if let Some(limit) = lookup.limit {
            settings.lookup_limit = limit;
        }
    }

    if let Some(analysis) = file.analysis {
        if let Some(url) = analysis.url {
            settings.analysis_url = url;
        }
        if let Some(key) = analysis.api_key {
            settings.gemini_api_key = Some(key);
        }
        if let Some(timeout) = analysis.timeout_secs {
            settings.analysis_timeout_secs = timeout;
        }
    }

    if let Some(tools) = file.tools {
        if let Some(enumerator) = tools.enumerator {
            settings.enum_tool_path = enumerator;
        }
        if let Some(docker) = tools.docker {
            settings.docker_path = docker;
        }
        if let Some(image) = tools.scanner_image {
            settings.scanner_image = image;
        }
        if let Some(timeout) = tools.enum_timeout_secs {
            settings.enum_timeout_secs = timeout;
        }
        if let Some(timeout) = tools.scan_timeout_secs {
            settings.scan_timeout_secs = timeout;
        }
    }

    Ok(settings)
}
