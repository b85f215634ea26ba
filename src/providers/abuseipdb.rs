//! AbuseIPDB reputation adapter.

use super::{FetchError, REQUEST_TIMEOUT};
use crate::config::AbuseIpdbConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// AbuseIPDB API response envelope.
#[derive(Debug, Deserialize)]
struct CheckResponse {
    data: AbuseReport,
}

/// AbuseIPDB `/check` result for one address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseReport {
    /// Address as reported by the API.
    pub ip_address: String,

    /// Abuse confidence score (0-100).
    pub abuse_confidence_score: u8,

    /// Country code.
    #[serde(default)]
    pub country_code: Option<String>,

    /// ISP name.
    #[serde(default)]
    pub isp: Option<String>,

    /// Registered domain.
    #[serde(default)]
    pub domain: Option<String>,

    /// Known hostnames, in API order.
    #[serde(default)]
    pub hostnames: Vec<String>,

    /// Total number of reports within the max-age window.
    #[serde(default)]
    pub total_reports: u32,

    /// Number of distinct reporting users.
    #[serde(default)]
    pub num_distinct_users: u32,

    /// Timestamp of the most recent report, if any.
    #[serde(default)]
    pub last_reported_at: Option<String>,
}

/// AbuseIPDB adapter.
pub struct AbuseIpdbClient {
    config: AbuseIpdbConfig,
    client: Client,
    enabled: bool,
}

impl AbuseIpdbClient {
    /// Create a new AbuseIPDB adapter.
    pub fn new(config: AbuseIpdbConfig) -> Self {
        let enabled = config.enabled && !config.api_key.is_empty();
        if !enabled {
            warn!("AbuseIPDB provider disabled: no API key configured");
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
    pub async fn fetch(&self, ip: &str) -> Option<AbuseReport> {
        if !self.enabled {
            return None;
        }

        match self.check(ip).await {
            Ok(report) => {
                debug!(
                    ip,
                    score = report.abuse_confidence_score,
                    reports = report.total_reports,
                    "AbuseIPDB lookup complete"
                );
                Some(report)
            }
            Err(e) => {
                warn!(ip, error = %e, "AbuseIPDB lookup failed");
                None
            }
        }
    }

    async fn check(&self, ip: &str) -> Result<AbuseReport, FetchError> {
        let url = format!("{}/check", self.config.base_url);
        let max_age = self.config.max_age_days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ipAddress", ip),
                ("maxAgeInDays", max_age.as_str()),
                ("verbose", "true"),
            ])
            .header("Key", &self.config.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        Ok(body.data)
    }
}
