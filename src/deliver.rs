//! Webhook delivery of recon reports
//!
//! Serializes a report bundle as JSON and POSTs it to the configured
//! endpoint. Delivery never raises: a missing endpoint, a non-2xx
//! response, and a transport failure all come back as error outcomes,
//! and nothing is retried.

use crate::error::Result;
use crate::models::{DeliveryOutcome, ReportFile};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// JSON body sent to the webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub target_domain: String,
    pub files: Vec<ReportFile>,
    pub timestamp: DateTime<Local>,
}

impl WebhookPayload {
    pub fn new(target_domain: impl Into<String>, files: Vec<ReportFile>) -> Self {
        Self {
            target_domain: target_domain.into(),
            files,
            timestamp: Local::now(),
        }
    }
}

/// Sink POSTing report bundles to a single configured webhook URL
#[derive(Clone)]
pub struct WebhookSink {
    http: Client,
    url: Option<String>,
    timeout_secs: u64,
}

impl WebhookSink {
    /// Builds the sink. A configured URL must parse; a missing URL is
    /// legal and reported per send.
    pub fn new(url: Option<String>, timeout_secs: u64) -> Result<Self> {
        if let Some(url) = &url {
            url::Url::parse(url)?;
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url,
            timeout_secs,
        })
    }

    /// Sends one payload. No endpoint configured means an error outcome
    /// without any network call.
    pub async fn send(&self, payload: &WebhookPayload) -> DeliveryOutcome {
        let Some(url) = &self.url else {
            warn!("Webhook URL not configured");
            return DeliveryOutcome::error("webhook URL not configured");
        };

        info!("Sending results for {} to webhook", payload.target_domain);

        let response = match self.http.post(url).json(payload).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                error!("Webhook request timed out");
                return DeliveryOutcome::error(format!(
                    "request timed out after {} seconds",
                    self.timeout_secs
                ));
            }
            Err(e) => {
                error!("Error sending to webhook: {}", e);
                return DeliveryOutcome::error(e.to_string());
            }
        };

        let code = response.status().as_u16();
        let success = response.status().is_success();
        let text = response.text().await.unwrap_or_default();
        let body: serde_json::Value = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::Value::String(text));

        if success {
            info!("Webhook accepted delivery (status {})", code);
            DeliveryOutcome::success(code, body)
        } else {
            error!("Webhook returned status {}", code);
            DeliveryOutcome {
                code: Some(code),
                response: Some(body),
                ..DeliveryOutcome::error(format!("webhook returned status {code}"))
            }
        }
    }

    /// Sends a batch of independent payloads with a bounded number of
    /// in-flight requests. Results are collected after all sends
    /// complete; completion order is not guaranteed.
    pub async fn send_batch(
        &self,
        payloads: Vec<WebhookPayload>,
        workers: usize,
    ) -> Vec<(String, DeliveryOutcome)> {
        let limit = Arc::new(Semaphore::new(workers.max(1)));
        let mut set = JoinSet::new();

        for payload in payloads {
            let sink = self.clone();
            let limit = Arc::clone(&limit);

            set.spawn(async move {
                // Semaphore is never closed, acquire cannot fail.
                let _permit = limit.acquire_owned().await.ok();
                let outcome = sink.send(&payload).await;
                (payload.target_domain, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => {
                    error!("Delivery task panicked: {}", e);
                }
            }
        }
        results
    }
}
