//! VirusTotal vendor-consensus adapter.

use super::{FetchError, REQUEST_TIMEOUT};
use crate::config::VirusTotalConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Normalized VirusTotal result.
///
/// A zero-valued report is a real outcome: addresses VirusTotal has never
/// seen come back as HTTP 404 and count as "known clean/unknown", not as a
/// provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtReport {
    /// Derived score (0-100) from vendor vote counts.
    pub score: u8,
    /// Engines voting malicious.
    pub malicious: u32,
    /// Engines voting suspicious.
    pub suspicious: u32,
}

impl VtReport {
    /// The "not in database" result.
    pub fn zero() -> Self {
        Self {
            score: 0,
            malicious: 0,
            suspicious: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VtResponse {
    #[serde(default)]
    data: Option<VtData>,
}

#[derive(Debug, Deserialize)]
struct VtData {
    #[serde(default)]
    attributes: Option<VtAttributes>,
}

#[derive(Debug, Deserialize)]
struct VtAttributes {
    #[serde(default)]
    last_analysis_stats: Option<VtStats>,
    /// Per-engine verdicts; only the entry count matters here.
    #[serde(default)]
    last_analysis_results: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct VtStats {
    #[serde(default)]
    malicious: u32,
    #[serde(default)]
    suspicious: u32,
}

/// VirusTotal adapter.
pub struct VirusTotalClient {
    config: VirusTotalConfig,
    client: Client,
    enabled: bool,
}

impl VirusTotalClient {
    /// Create a new VirusTotal adapter.
    pub fn new(config: VirusTotalConfig) -> Self {
        let enabled = config.enabled && config.api_key.is_some();
        if !enabled {
            warn!("VirusTotal provider disabled: no API key configured");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            enabled,
        }
    }

    /// Look up an address, swallowing every failure into `None`.
    pub async fn fetch(&self, ip: &str) -> Option<VtReport> {
        if !self.enabled {
            return None;
        }

        match self.lookup(ip).await {
            Ok(report) => {
                debug!(
                    ip,
                    score = report.score,
                    malicious = report.malicious,
                    suspicious = report.suspicious,
                    "VirusTotal lookup complete"
                );
                Some(report)
            }
            Err(e) => {
                warn!(ip, error = %e, "VirusTotal lookup failed");
                None
            }
        }
    }

    async fn lookup(&self, ip: &str) -> Result<VtReport, FetchError> {
        let url = format!("{}/ip_addresses/{}", self.config.base_url, ip);
        // enabled implies the key is present
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .get(&url)
            .header("x-apikey", api_key)
            .send()
            .await?;

        // Addresses VirusTotal has never seen are clean/unknown, not a failure
        if response.status() == StatusCode::NOT_FOUND {
            debug!(ip, "VirusTotal has no record for this address");
            return Ok(VtReport::zero());
        }

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: VtResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let attributes = body
            .data
            .and_then(|d| d.attributes)
            .ok_or_else(|| FetchError::InvalidResponse("missing data.attributes".to_string()))?;

        let stats = attributes.last_analysis_stats.unwrap_or_default();
        let total_engines = attributes
            .last_analysis_results
            .map(|r| r.len())
            .unwrap_or(0);

        Ok(score_votes(stats.malicious, stats.suspicious, total_engines))
    }
}

/// Derive a 0-100 score from vendor vote counts.
///
/// Malicious votes count in full, suspicious votes at half weight:
/// `min(100, round(malicious/total*100 + suspicious/total*50))`.
fn score_votes(malicious: u32, suspicious: u32, total_engines: usize) -> VtReport {
    let score = if total_engines == 0 {
        0
    } else {
        let total = total_engines as f64;
        let raw = f64::from(malicious) / total * 100.0 + f64::from(suspicious) / total * 50.0;
        raw.round().min(100.0) as u8
    };

    VtReport {
        score,
        malicious,
        suspicious,
    }
}
