//! The full reconnaissance pipeline
//!
//! Fixed five-step sequence per invocation: enumerate, lookup, scan,
//! serialize, deliver. Each step's failure is recorded into the result's
//! error list at the call site; a completed result always comes back,
//! even when every step failed.

use crate::config::Settings;
use crate::deliver::{WebhookPayload, WebhookSink};
use crate::enumerate::{normalize_target, Enumerator};
use crate::error::Result;
use crate::lookup::LookupClient;
use crate::models::{LookupBatch, PipelineResult, ReportFile, ScanReport, StepError};
use crate::report;
use crate::scan::PortScanner;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{error, info};

const STEPS: u64 = 5;

/// Orchestrates the five pipeline steps for one target domain
pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs the complete pipeline. Only an invalid target fails fast;
    /// every step-level failure lands in the result's error list.
    pub async fn run(&self, domain: &str) -> Result<PipelineResult> {
        let domain = normalize_target(domain)?;
        info!("Starting full recon pipeline for {}", domain);

        let started = Instant::now();
        let mut result = PipelineResult::new(&domain);

        let pb = ProgressBar::new(STEPS);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        // Step 1: enumerate subdomains
        pb.set_message("Enumerating subdomains...");
        match self.enumerate_step(&domain).await {
            Ok(subdomains) => {
                info!("Step 1: found {} subdomains", subdomains.len());
                result.subdomains_found = subdomains.len();
                result.subdomains = subdomains;
            }
            Err(e) => {
                error!("Subdomain enumeration failed: {}", e);
                result.errors.push(StepError::new("enumerate", e));
            }
        }
        pb.inc(1);

        // Step 2: look up the first N names
        pb.set_message("Querying lookup service...");
        match self.lookup_step(&result.subdomains).await {
            Ok(batch) => {
                info!("Step 2: {}/{} names scanned", batch.scanned, batch.total);
                result.lookup = Some(batch);
            }
            Err(e) => {
                error!("Lookup failed: {}", e);
                result.errors.push(StepError::new("lookup", e));
            }
        }
        pb.inc(1);

        // Step 3: port and SSL scan of the apex target
        pb.set_message("Scanning ports...");
        match self.scan_step(&domain).await {
            Ok((scan, path)) => {
                info!("Step 3: scan complete");
                result.scan = Some(scan);
                result.scan_report_path = path;
            }
            Err(e) => {
                error!("Scan failed: {}", e);
                result.errors.push(StepError::new("scan", e));
            }
        }
        pb.inc(1);

        // Step 4: serialize the collected outputs
        pb.set_message("Preparing report files...");
        let files = prepare_files(&domain, &result.subdomains, &result.lookup, &result.scan);
        info!("Step 4: prepared {} report files", files.len());
        pb.inc(1);

        // Step 5: deliver to the webhook
        pb.set_message("Delivering results...");
        match WebhookSink::new(
            self.settings.webhook_url.clone(),
            self.settings.webhook_timeout_secs,
        ) {
            Ok(sink) => {
                let payload = WebhookPayload::new(&domain, files);
                result.delivery = Some(sink.send(&payload).await);
            }
            Err(e) => {
                error!("Delivery sink unavailable: {}", e);
                result.errors.push(StepError::new("deliver", e));
            }
        }
        pb.inc(1);
        pb.finish_with_message("Pipeline complete");

        result.finish(started.elapsed().as_secs_f64());
        info!("Pipeline completed in {:.2} seconds", result.duration_secs);
        Ok(result)
    }

    async fn enumerate_step(&self, domain: &str) -> Result<Vec<String>> {
        let enumerator = Enumerator::new(&self.settings).await?;
        enumerator.enumerate(domain).await
    }

    async fn lookup_step(&self, subdomains: &[String]) -> Result<LookupBatch> {
        let client = LookupClient::new(&self.settings).await?;
        let limit = self.settings.lookup_limit.min(subdomains.len());
        client.scan_names(&subdomains[..limit]).await
    }

    async fn scan_step(&self, domain: &str) -> Result<(ScanReport, Option<String>)> {
        let scanner = PortScanner::new(&self.settings).await?;
        let scan = scanner.full_scan(domain, "1-1000", 443).await;

        let path = report::timestamped_name(domain, "nmap", "txt");
        let path = match report::text::write_scan_report(&scan, std::path::Path::new(&path)) {
            Ok(()) => Some(path),
            Err(e) => {
                error!("Could not write scan report file: {}", e);
                None
            }
        };

        Ok((scan, path))
    }
}

/// Serializes step outputs into the webhook file set. Steps that
/// produced nothing contribute no file.
pub fn prepare_files(
    domain: &str,
    subdomains: &[String],
    lookup: &Option<LookupBatch>,
    scan: &Option<ScanReport>,
) -> Vec<ReportFile> {
    let mut files = Vec::new();

    if !subdomains.is_empty() {
        files.push(ReportFile::new(
            format!("{domain}_amass_results.txt"),
            subdomains.join("\n"),
        ));
    }

    if let Some(batch) = lookup {
        if let Ok(content) = serde_json::to_string_pretty(batch) {
            files.push(ReportFile::new(
                format!("{domain}_shodan_results.json"),
                content,
            ));
        }
    }

    if let Some(scan) = scan {
        if let Ok(content) = serde_json::to_string_pretty(scan) {
            files.push(ReportFile::new(
                format!("{domain}_nmap_results.json"),
                content,
            ));
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanReport;

    #[test]
    fn test_prepare_files_skips_empty_steps() {
        let files = prepare_files("example.com", &[], &None, &None);
        assert!(files.is_empty());
    }

    #[test]
    fn test_prepare_files_names() {
        let subdomains = vec!["a.example.com".to_string(), "b.example.com".to_string()];
        let scan = Some(ScanReport::new("example.com"));
        let files = prepare_files("example.com", &subdomains, &None, &scan);

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "example.com_amass_results.txt",
                "example.com_nmap_results.json"
            ]
        );
        assert_eq!(files[0].content, "a.example.com\nb.example.com");
    }
}
