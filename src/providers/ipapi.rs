//! ip-api.com geolocation adapter.

use super::{FetchError, REQUEST_TIMEOUT};
use crate::config::IpApiConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Restricted field list to keep the payload small.
const FIELDS: &str = "status,message,country,countryCode,isp,org,reverse,query";

/// Raw ip-api.com response. `status` is "success" or "fail".
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(rename = "countryCode", default)]
    country_code: Option<String>,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    reverse: Option<String>,
}

/// Normalized geolocation result.
#[derive(Debug, Clone)]
pub struct GeoReport {
    /// Country display name, falling back to the 2-letter code.
    pub country: Option<String>,
    /// ISP name, falling back to the organization field.
    pub isp: Option<String>,
    /// Reverse-DNS hostname, when the API knows one.
    pub hostname: Option<String>,
}

/// ip-api.com adapter.
pub struct GeoClient {
    config: IpApiConfig,
    client: Client,
    enabled: bool,
}

impl GeoClient {
    /// Create a new ip-api.com adapter.
    ///
    /// Enabled whenever a base URL or an API key is configured. The default
    /// configuration always supplies a base URL, so only an explicit
    /// `enabled: false` turns this provider off in practice.
    pub fn new(config: IpApiConfig) -> Self {
        let enabled = config.enabled && (!config.base_url.is_empty() || config.api_key.is_some());
        if !enabled {
            warn!("ip-api.com provider disabled: no API configuration found");
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
    pub async fn fetch(&self, ip: &str) -> Option<GeoReport> {
        if !self.enabled {
            return None;
        }

        match self.lookup(ip).await {
            Ok(report) => {
                debug!(
                    ip,
                    country = report.country.as_deref().unwrap_or("-"),
                    hostname = report.hostname.as_deref().unwrap_or("-"),
                    "ip-api.com lookup complete"
                );
                Some(report)
            }
            Err(e) => {
                warn!(ip, error = %e, "ip-api.com lookup failed");
                None
            }
        }
    }

    async fn lookup(&self, ip: &str) -> Result<GeoReport, FetchError> {
        let url = format!("{}/{}", self.config.base_url, ip);

        let mut request = self.client.get(&url).query(&[("fields", FIELDS)]);
        // The key is a pro-tier query parameter, only sent when configured
        if let Some(ref key) = self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        if body.status == "fail" {
            let detail = body.message.unwrap_or_else(|| "status=fail".to_string());
            return Err(FetchError::Upstream(detail));
        }

        Ok(GeoReport {
            country: non_empty(body.country).or_else(|| non_empty(body.country_code)),
            isp: non_empty(body.isp).or_else(|| non_empty(body.org)),
            hostname: non_empty(body.reverse),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> IpApiConfig {
        IpApiConfig {
            enabled: true,
            base_url,
            api_key: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/5.6.7.8"))
            .and(query_param("fields", FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "country": "Netherlands",
                "countryCode": "NL",
                "isp": "Geo ISP",
                "org": "Geo Org",
                "reverse": "rev.example.net",
                "query": "5.6.7.8"
            })))
            .mount(&server)
            .await;

        let client = GeoClient::new(test_config(server.uri()));
        let report = client.fetch("5.6.7.8").await.unwrap();

        assert_eq!(report.country.as_deref(), Some("Netherlands"));
        assert_eq!(report.isp.as_deref(), Some("Geo ISP"));
        assert_eq!(report.hostname.as_deref(), Some("rev.example.net"));
    }

    #[tokio::test]
    async fn test_fallback_fields() {
        let server = MockServer::start().await;

        // No full country name, no isp, empty reverse
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "countryCode": "NL",
                "org": "Geo Org",
                "reverse": ""
            })))
            .mount(&server)
            .await;

        let client = GeoClient::new(test_config(server.uri()));
        let report = client.fetch("5.6.7.8").await.unwrap();

        assert_eq!(report.country.as_deref(), Some("NL"));
        assert_eq!(report.isp.as_deref(), Some("Geo Org"));
        assert!(report.hostname.is_none());
    }

    #[tokio::test]
    async fn test_status_fail_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "fail",
                "message": "reserved range"
            })))
            .mount(&server)
            .await;

        let client = GeoClient::new(test_config(server.uri()));
        assert!(client.fetch("5.6.7.8").await.is_none());
    }

    #[tokio::test]
    async fn test_api_key_sent_only_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("key", "pro-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "country": "Netherlands"
            })))
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.api_key = Some("pro-key".to_string());

        let client = GeoClient::new(config);
        assert!(client.fetch("5.6.7.8").await.is_some());
    }

    #[tokio::test]
    async fn test_disabled_when_explicitly_off() {
        let config = IpApiConfig {
            enabled: false,
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
        };

        let client = GeoClient::new(config);
        assert!(client.fetch("5.6.7.8").await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_is_none() {
        let client = GeoClient::new(test_config("http://127.0.0.1:1".to_string()));
        assert!(client.fetch("5.6.7.8").await.is_none());
    }
}
