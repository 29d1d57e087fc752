//! Corvus - Reconnaissance Automation Pipeline
//!
//! Orchestrates external recon tooling (passive subdomain enumeration,
//! containerized port scanning) and third-party APIs (address
//! intelligence, AI summarization, webhook delivery) into a single
//! per-target pipeline with per-step error capture.

pub mod analyze;
pub mod config;
pub mod deliver;
pub mod enumerate;
pub mod error;
pub mod exec;
pub mod lookup;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scan;
