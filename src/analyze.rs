//! AI-powered analysis of recon results
//!
//! Renders the collected report files into a prompt, asks a generative
//! model for a security summary, and wraps the result in a document
//! record the way the downstream automation expects.

use crate::config::Settings;
use crate::error::{ReconError, Result};
use crate::models::{OutcomeStatus, ReportFile};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

/// Trait for analysis backends
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produces a Markdown security summary of the report files
    async fn analyze(&self, files: &[ReportFile]) -> Result<String>;

    /// Returns whether the analyzer is configured and usable
    fn is_available(&self) -> bool;
}

/// Analyzer backed by the Gemini generative-language API
pub struct GeminiAnalyzer {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiAnalyzer {
    /// Builds the analyzer. A missing API key is a hard configuration
    /// error for this feature.
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.gemini_api_key.clone().ok_or_else(|| {
            ReconError::ConfigError(format!(
                "analysis API key not provided; set {}",
                crate::config::ENV_GEMINI_KEY
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.analysis_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            endpoint: settings.analysis_url.clone(),
        })
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, files: &[ReportFile]) -> Result<String> {
        let prompt = build_prompt(&render_files(files));
        info!("Requesting analysis for {} files", files.len());

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "parts": [{"text": prompt}]
                }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Analysis API error: {} - {}", status.as_u16(), body.trim());
            return Err(ReconError::AnalysisError(format!(
                "analysis API failed with status {}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = response.json().await?;
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(|text| text.as_str())
            .map(|text| text.to_string())
            .ok_or_else(|| {
                ReconError::AnalysisError("analysis response carried no candidates".to_string())
            })
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Concatenates report files into the Markdown block fed to the model
pub fn render_files(files: &[ReportFile]) -> String {
    let mut rendered = String::from("# Recon Results Analysis\n\n");
    for file in files {
        rendered.push_str(&format!("## {}\n{}\n\n", file.name, file.content));
    }
    rendered
}

fn build_prompt(recon_content: &str) -> String {
    format!(
        "Analyze the following reconnaissance results and provide a comprehensive security report:\n\n\
         {recon_content}\n\n\
         Please provide:\n\
         1. **Critical Findings**: List any critical vulnerabilities or exposures\n\
         2. **Services & Ports**: Summarize all open ports and running services\n\
         3. **Certificate Analysis**: Extract and analyze SSL/TLS certificate details\n\
         4. **Recommendations**: Suggest next steps for security hardening\n\n\
         Format your response in clear Markdown with sections and bullet points."
    )
}

/// Metadata of a generated report document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub title: String,
    pub created_at: DateTime<Local>,
    pub target_domain: String,
}

/// Builds report documents from analysis output
pub struct DocumentCreator {
    #[allow(dead_code)]
    api_key: String,
}

impl DocumentCreator {
    /// Builds the creator. A missing API key is a hard configuration
    /// error for this feature.
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.google_api_key.clone().ok_or_else(|| {
            ReconError::ConfigError(format!(
                "document API key not provided; set {}",
                crate::config::ENV_GOOGLE_KEY
            ))
        })?;
        Ok(Self { api_key })
    }

    /// Builds the document record for one analysis. Content stays
    /// Markdown; the receiving automation handles presentation.
    pub fn create(&self, target_domain: &str, _content: &str) -> DocumentInfo {
        let now = Local::now();
        let title = format!(
            "Recon Report - {} - {}",
            target_domain,
            now.format("%Y-%m-%d %H:%M:%S")
        );
        info!("Creating report document: {}", title);

        DocumentInfo {
            document_id: uuid::Uuid::new_v4().to_string(),
            title,
            created_at: now,
            target_domain: target_domain.to_string(),
        }
    }
}

/// Outcome of a full analyze-and-document pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub status: OutcomeStatus,
    pub document: Option<DocumentInfo>,
    pub analysis: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// Runs the full bundle pass: render files, analyze, create the
/// document record. Any failure degrades to an error outcome rather
/// than propagating.
pub async fn process_report_bundle(
    analyzer: &dyn Analyzer,
    creator: &DocumentCreator,
    files: &[ReportFile],
    target_domain: &str,
) -> AnalysisOutcome {
    let timestamp = Local::now();

    if files.is_empty() {
        return AnalysisOutcome {
            status: OutcomeStatus::Error,
            document: None,
            analysis: None,
            error: Some("no files provided".to_string()),
            timestamp,
        };
    }

    info!(
        "Processing {} files for domain: {}",
        files.len(),
        target_domain
    );

    match analyzer.analyze(files).await {
        Ok(analysis) => {
            let document = creator.create(target_domain, &analysis);
            AnalysisOutcome {
                status: OutcomeStatus::Success,
                document: Some(document),
                analysis: Some(analysis),
                error: None,
                timestamp,
            }
        }
        Err(e) => {
            error!("Error processing report bundle: {}", e);
            AnalysisOutcome {
                status: OutcomeStatus::Error,
                document: None,
                analysis: None,
                error: Some(e.to_string()),
                timestamp,
            }
        }
    }
}
