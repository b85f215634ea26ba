//! IPQualityScore fraud-detection adapter.

use super::{FetchError, REQUEST_TIMEOUT};
use crate::config::IpQualityScoreConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// IPQualityScore IP reputation result.
///
/// The API reports failures inside an HTTP 200 body via `success: false`;
/// the adapter treats that the same as a transport error.
#[derive(Debug, Clone, Deserialize)]
pub struct QualityReport {
    /// Whether the upstream considered the request successful.
    pub success: bool,

    /// Upstream failure detail, when `success` is false.
    #[serde(default)]
    pub message: Option<String>,

    /// Fraud score (0-100, higher = worse).
    #[serde(default)]
    pub fraud_score: u8,

    /// Country code.
    #[serde(default)]
    pub country_code: Option<String>,

    /// ISP name.
    #[serde(rename = "ISP", default)]
    pub isp: Option<String>,

    /// Organization name.
    #[serde(default)]
    pub organization: Option<String>,

    /// Hostname.
    #[serde(default)]
    pub host: Option<String>,

    /// Detection flags.
    #[serde(default)]
    pub proxy: bool,
    #[serde(default)]
    pub vpn: bool,
    #[serde(default)]
    pub tor: bool,
    #[serde(default)]
    pub active_vpn: bool,
    #[serde(default)]
    pub active_tor: bool,
    #[serde(default)]
    pub recent_abuse: bool,
    #[serde(default)]
    pub bot_status: bool,
    #[serde(default)]
    pub is_crawler: bool,

    /// Geo fields.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl QualityReport {
    /// Whether the address is any of VPN, proxy or Tor.
    pub fn is_vpn_or_proxy(&self) -> bool {
        self.vpn || self.proxy || self.tor
    }
}

/// IPQualityScore adapter.
pub struct IpQualityScoreClient {
    config: IpQualityScoreConfig,
    client: Client,
    enabled: bool,
}

impl IpQualityScoreClient {
    /// Create a new IPQualityScore adapter.
    pub fn new(config: IpQualityScoreConfig) -> Self {
        let enabled = config.enabled && !config.api_key.is_empty();
        if !enabled {
            warn!("IPQualityScore provider disabled: no API key configured");
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
    pub async fn fetch(&self, ip: &str) -> Option<QualityReport> {
        if !self.enabled {
            return None;
        }

        match self.check(ip).await {
            Ok(report) => {
                debug!(
                    ip,
                    fraud_score = report.fraud_score,
                    vpn_or_proxy = report.is_vpn_or_proxy(),
                    "IPQualityScore lookup complete"
                );
                Some(report)
            }
            Err(e) => {
                warn!(ip, error = %e, "IPQualityScore lookup failed");
                None
            }
        }
    }

    async fn check(&self, ip: &str) -> Result<QualityReport, FetchError> {
        // The API key travels in the path, not a header
        let url = format!("{}/{}/{}", self.config.base_url, self.config.api_key, ip);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("strictness", "0"),
                ("allow_public_access_points", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let report: QualityReport = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        if !report.success {
            let detail = report
                .message
                .unwrap_or_else(|| "success=false".to_string());
            return Err(FetchError::Upstream(detail));
        }

        Ok(report)
    }
}
