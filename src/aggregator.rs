//! Parallel fan-out and field-priority merge across the four providers.

use crate::config::Config;
use crate::providers::abuseipdb::{AbuseIpdbClient, AbuseReport};
use crate::providers::ipapi::{GeoClient, GeoReport};
use crate::providers::ipqualityscore::{IpQualityScoreClient, QualityReport};
use crate::providers::virustotal::{VirusTotalClient, VtReport};
use crate::risk::{map_country_code, overall_risk, RiskLevel};
use serde::Serialize;
use tracing::{debug, info};

/// Every provider failed for one lookup. The only error the core raises;
/// anything short of total failure degrades to defaults instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllSourcesUnavailable;

impl std::fmt::Display for AllSourcesUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all external threat intelligence sources are unavailable")
    }
}

impl std::error::Error for AllSourcesUnavailable {}

/// Which providers produced a result for this lookup.
///
/// Records presence, not aggregator-level success: a VirusTotal 404-derived
/// zero result counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub abuseipdb: bool,
    pub ipqualityscore: bool,
    pub ipapi: bool,
    pub virustotal: bool,
}

/// Aggregated threat-intelligence report for one address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatReport {
    /// Input address, or the one AbuseIPDB echoed back.
    pub ip: String,

    /// Best-known hostname across sources.
    pub hostname: Option<String>,

    /// Best-known ISP, "Unknown" when no source supplied one.
    pub isp: String,

    /// Best-known country, "Unknown" when no source supplied one.
    pub country: String,

    /// AbuseIPDB confidence score (0-100), 0 when that source is absent.
    pub abuse_score: u8,

    /// AbuseIPDB report count in the lookback window.
    pub recent_reports: u32,

    /// IPQualityScore VPN/proxy/Tor flag, false when that source is absent.
    pub is_vpn_or_proxy: bool,

    /// IPQualityScore fraud score (0-100), 0 when that source is absent.
    pub threat_score: u8,

    /// Per-provider presence for this lookup.
    pub sources: SourceStatus,

    /// Computed overall risk level.
    pub overall_risk: RiskLevel,
}

/// Owns the four adapters and runs lookups against all of them at once.
pub struct ThreatIntelAggregator {
    abuseipdb: AbuseIpdbClient,
    ipqualityscore: IpQualityScoreClient,
    ipapi: GeoClient,
    virustotal: VirusTotalClient,
}

impl ThreatIntelAggregator {
    /// Build the four adapters from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            abuseipdb: AbuseIpdbClient::new(config.abuseipdb.clone()),
            ipqualityscore: IpQualityScoreClient::new(config.ipqualityscore.clone()),
            ipapi: GeoClient::new(config.ipapi.clone()),
            virustotal: VirusTotalClient::new(config.virustotal.clone()),
        }
    }

    /// Look up one address across all four providers.
    ///
    /// The join is a full barrier: every call settles (success, error or
    /// timeout) before merging, so `sources` always reflects all four
    /// providers and a fast failure never cancels the slower calls.
    pub async fn lookup(&self, ip: &str) -> Result<ThreatReport, AllSourcesUnavailable> {
        debug!(ip, "starting provider fan-out");

        let (abuse, quality, geo, vt) = tokio::join!(
            self.abuseipdb.fetch(ip),
            self.ipqualityscore.fetch(ip),
            self.ipapi.fetch(ip),
            self.virustotal.fetch(ip),
        );

        let report = merge(ip, abuse, quality, geo, vt)?;

        info!(
            ip = %report.ip,
            risk = ?report.overall_risk,
            abuseipdb = report.sources.abuseipdb,
            ipqualityscore = report.sources.ipqualityscore,
            ipapi = report.sources.ipapi,
            virustotal = report.sources.virustotal,
            "lookup complete"
        );

        Ok(report)
    }
}

/// Merge the four optional provider results into one report.
///
/// Field priority, first non-empty wins:
/// hostname: geo > abuse domain > quality host; isp: geo > abuse > quality;
/// country: geo verbatim > abuse code (mapped) > quality code (mapped).
/// Abuse metrics come only from AbuseIPDB, VPN/fraud signals only from
/// IPQualityScore.
fn merge(
    ip: &str,
    abuse: Option<AbuseReport>,
    quality: Option<QualityReport>,
    geo: Option<GeoReport>,
    vt: Option<VtReport>,
) -> Result<ThreatReport, AllSourcesUnavailable> {
    if abuse.is_none() && quality.is_none() && geo.is_none() && vt.is_none() {
        return Err(AllSourcesUnavailable);
    }

    let sources = SourceStatus {
        abuseipdb: abuse.is_some(),
        ipqualityscore: quality.is_some(),
        ipapi: geo.is_some(),
        virustotal: vt.is_some(),
    };

    let hostname = non_empty(geo.as_ref().and_then(|g| g.hostname.clone()))
        .or_else(|| non_empty(abuse.as_ref().and_then(|a| a.domain.clone())))
        .or_else(|| non_empty(quality.as_ref().and_then(|q| q.host.clone())));

    let isp = non_empty(geo.as_ref().and_then(|g| g.isp.clone()))
        .or_else(|| non_empty(abuse.as_ref().and_then(|a| a.isp.clone())))
        .or_else(|| non_empty(quality.as_ref().and_then(|q| q.isp.clone())))
        .unwrap_or_else(|| "Unknown".to_string());

    let country = non_empty(geo.as_ref().and_then(|g| g.country.clone()))
        .or_else(|| {
            non_empty(
                abuse
                    .as_ref()
                    .and_then(|a| a.country_code.as_deref())
                    .map(map_country_code),
            )
        })
        .or_else(|| {
            non_empty(
                quality
                    .as_ref()
                    .and_then(|q| q.country_code.as_deref())
                    .map(map_country_code),
            )
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let abuse_score = abuse.as_ref().map_or(0, |a| a.abuse_confidence_score);
    let recent_reports = abuse.as_ref().map_or(0, |a| a.total_reports);
    let is_vpn_or_proxy = quality.as_ref().is_some_and(|q| q.is_vpn_or_proxy());
    let threat_score = quality.as_ref().map_or(0, |q| q.fraud_score);
    let vt_score = vt.as_ref().map_or(0, |v| v.score);

    let overall_risk = overall_risk(
        f64::from(abuse_score),
        f64::from(threat_score),
        is_vpn_or_proxy,
        f64::from(vt_score),
    );

    Ok(ThreatReport {
        ip: abuse
            .as_ref()
            .map_or_else(|| ip.to_string(), |a| a.ip_address.clone()),
        hostname,
        isp,
        country,
        abuse_score,
        recent_reports,
        is_vpn_or_proxy,
        threat_score,
        sources,
        overall_risk,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
