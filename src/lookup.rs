//! Address intelligence lookups against the Shodan API
//!
//! Resolves names to addresses and retrieves pre-collected metadata for
//! each address. The API key is verified once at construction; per-name
//! failures are captured in the result rather than raised.

use crate::config::Settings;
use crate::error::{ReconError, Result};
use crate::models::{HostRecord, LookupBatch, ServiceDetail, TargetLookup};
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the remote lookup service
pub struct LookupClient {
    http: Client,
    api_key: String,
    base_url: String,
}

/// Account status returned by the verification call
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    query_credits: Option<i64>,
    #[serde(default)]
    scan_credits: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    ports: Vec<u16>,
    #[serde(default)]
    data: Vec<RawService>,
    #[serde(default)]
    vulns: Vec<String>,
    #[serde(default)]
    hostnames: Vec<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    last_update: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(default)]
    port: Option<u16>,
    #[serde(rename = "_shodan", default)]
    shodan: Option<RawServiceMeta>,
    #[serde(rename = "data", default)]
    banner: String,
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    ssl: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServiceMeta {
    #[serde(default)]
    module: Option<String>,
}

impl LookupClient {
    /// Builds the client and verifies the configured API key against
    /// the account-info endpoint. A missing or rejected key is a hard
    /// configuration error.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.shodan_api_key.clone().ok_or_else(|| {
            ReconError::ConfigError(format!(
                "lookup API key not provided; set {}",
                crate::config::ENV_SHODAN_KEY
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let client = Self {
            http,
            api_key,
            base_url: settings.lookup_base_url.trim_end_matches('/').to_string(),
        };
        client.verify_key().await?;
        Ok(client)
    }

    async fn verify_key(&self) -> Result<()> {
        let url = format!("{}/api-info", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReconError::ConfigError(format!(
                "lookup API key rejected (status {})",
                response.status().as_u16()
            )));
        }

        let api_info: ApiInfo = response.json().await.unwrap_or(ApiInfo {
            query_credits: None,
            scan_credits: None,
        });
        info!("Lookup API key verified");
        info!(
            "  Query credits: {}",
            api_info
                .query_credits
                .map_or_else(|| "N/A".to_string(), |c| c.to_string())
        );
        info!(
            "  Scan credits: {}",
            api_info
                .scan_credits
                .map_or_else(|| "N/A".to_string(), |c| c.to_string())
        );
        Ok(())
    }

    /// Resolves a name to its first address. Resolution failure returns
    /// `None` rather than an error.
    pub async fn resolve(&self, name: &str) -> Option<IpAddr> {
        match tokio::net::lookup_host((name, 0u16)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => {
                    debug!("Resolved {} -> {}", name, addr.ip());
                    Some(addr.ip())
                }
                None => {
                    warn!("Could not resolve {}", name);
                    None
                }
            },
            Err(_) => {
                warn!("Could not resolve {}", name);
                None
            }
        }
    }

    /// Retrieves metadata for one address. A remote-service error is
    /// captured in the record's `error` field instead of being raised.
    pub async fn host(&self, ip: &str) -> HostRecord {
        match self.fetch_host(ip).await {
            Ok(record) => {
                info!("Looked up {}: found {} services", ip, record.services.len());
                record
            }
            Err(e) => {
                error!("Lookup error for {}: {}", ip, e);
                HostRecord::from_error(ip, e.to_string())
            }
        }
    }

    async fn fetch_host(&self, ip: &str) -> Result<HostRecord> {
        let url = format!("{}/shodan/host/{}", self.base_url, ip);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReconError::LookupError(format!(
                "status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let raw: RawHost = response.json().await?;
        Ok(normalize_host(ip, raw))
    }

    /// Resolves and looks up a batch of names. An empty batch is a
    /// contract violation raised before any network call. Failures on
    /// one name never affect its siblings.
    pub async fn scan_names(&self, names: &[String]) -> Result<LookupBatch> {
        if names.is_empty() {
            return Err(ReconError::EmptyTargetList);
        }

        info!("Starting lookup for {} names", names.len());
        let mut batch = LookupBatch::new(names.len());

        for name in names {
            let name = name.trim().to_lowercase();
            info!("Looking up: {}", name);
            let mut entry = TargetLookup::new(&name);

            match self.resolve(&name).await {
                Some(ip) => {
                    let ip = ip.to_string();
                    entry.ip = Some(ip.clone());
                    entry.resolved = true;

                    let record = self.host(&ip).await;
                    if let Some(err) = &record.error {
                        entry.error = Some(err.clone());
                    } else {
                        batch.scanned += 1;
                    }
                    entry.host = Some(record);
                }
                None => {
                    entry.error = Some("could not resolve hostname".to_string());
                }
            }

            batch.targets.insert(name, entry);
        }

        info!("Lookup complete: {}/{} scanned", batch.scanned, batch.total);
        Ok(batch)
    }
}

fn normalize_host(ip: &str, raw: RawHost) -> HostRecord {
    let services = raw
        .data
        .into_iter()
        .map(|service| ServiceDetail {
            port: service.port,
            protocol: service
                .shodan
                .and_then(|meta| meta.module)
                .unwrap_or_else(|| "unknown".to_string()),
            banner: service.banner,
            product: service.product,
            version: service.version,
            ssl: service.ssl.is_some(),
            timestamp: service.timestamp,
        })
        .collect();

    HostRecord {
        ip: ip.to_string(),
        country: raw.country_name.unwrap_or_else(|| "Unknown".to_string()),
        country_code: raw.country_code.unwrap_or_else(|| "N/A".to_string()),
        city: raw.city.unwrap_or_else(|| "Unknown".to_string()),
        latitude: raw.latitude,
        longitude: raw.longitude,
        organization: raw.org.unwrap_or_else(|| "Unknown".to_string()),
        isp: raw.isp.unwrap_or_else(|| "Unknown".to_string()),
        ports: raw.ports,
        services,
        vulnerabilities: raw.vulns,
        hostnames: raw.hostnames,
        os: raw.os,
        tags: raw.tags,
        last_update: raw.last_update.unwrap_or_else(|| "N/A".to_string()),
        error: None,
    }
}
