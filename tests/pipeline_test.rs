//! Integration tests for the full pipeline
//!
//! External tools are pointed at nonexistent binaries and no
//! credentials are configured, so every step fails; the pipeline must
//! still return a completed result with the failures recorded.

mod common;

use corvus::error::ReconError;
use corvus::models::OutcomeStatus;
use corvus::pipeline::Pipeline;

#[tokio::test]
async fn test_pipeline_completes_when_every_step_fails() {
    let pipeline = Pipeline::new(common::test_settings());
    let result = pipeline
        .run("example.com")
        .await
        .expect("Pipeline should complete");

    assert_eq!(result.domain, "example.com");
    assert_eq!(result.subdomains_found, 0);
    assert!(result.subdomains.is_empty());
    assert!(result.lookup.is_none());
    assert!(result.scan.is_none());

    let steps: Vec<&str> = result.errors.iter().map(|e| e.step.as_str()).collect();
    assert!(steps.contains(&"enumerate"));
    assert!(steps.contains(&"lookup"));
    assert!(steps.contains(&"scan"));

    // Delivery degrades to an error outcome rather than a step error.
    let delivery = result.delivery.expect("delivery outcome expected");
    assert_eq!(delivery.status, OutcomeStatus::Error);
    assert!(delivery
        .reason
        .as_deref()
        .is_some_and(|r| r.contains("not configured")));

    assert!(result.finished_at.is_some());
}

#[tokio::test]
async fn test_pipeline_normalizes_target() {
    let pipeline = Pipeline::new(common::test_settings());
    let result = pipeline
        .run("  Example.COM ")
        .await
        .expect("Pipeline should complete");
    assert_eq!(result.domain, "example.com");
}

#[tokio::test]
async fn test_pipeline_rejects_empty_target() {
    let pipeline = Pipeline::new(common::test_settings());
    let result = pipeline.run("   ").await;
    assert!(matches!(result, Err(ReconError::InvalidTarget(_))));
}
