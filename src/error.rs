//! Error types for the Corvus pipeline

use thiserror::Error;

/// Main error type for Corvus operations
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Target list cannot be empty")]
    EmptyTargetList,

    #[error("External tool '{0}' not available")]
    ToolMissing(String),

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("{what} timed out after {seconds} seconds")]
    Timeout { what: String, seconds: u64 },

    #[error("Lookup service error: {0}")]
    LookupError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(String),
}

/// Result type alias for Corvus operations
pub type Result<T> = std::result::Result<T, ReconError>;
