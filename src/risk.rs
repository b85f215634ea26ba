//! Weighted risk scoring.

use serde::{Deserialize, Serialize};

/// Overall risk level for an IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Compute the overall risk level from the per-source signals.
///
/// Formula: `abuse*0.5 + threat*0.3 + reputation*0.2`, plus a flat +15 when
/// the address is a VPN/proxy/Tor exit. Numeric inputs are clamped to [0,100]
/// before weighting; the final value is not clamped and may exceed 100.
///
/// Thresholds: `< 30` low, `30..60` medium, `>= 60` high.
///
/// The abuse score carries the most weight as direct evidence of malicious
/// activity; the vendor-consensus reputation score carries the least as the
/// sparsest signal.
pub fn overall_risk(
    abuse_score: f64,
    threat_score: f64,
    is_vpn_or_proxy: bool,
    reputation_score: f64,
) -> RiskLevel {
    let abuse = abuse_score.clamp(0.0, 100.0);
    let threat = threat_score.clamp(0.0, 100.0);
    let reputation = reputation_score.clamp(0.0, 100.0);

    let base = abuse * 0.5 + threat * 0.3 + reputation * 0.2;
    let score = if is_vpn_or_proxy { base + 15.0 } else { base };

    if score >= 60.0 {
        RiskLevel::High
    } else if score >= 30.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Map a known 2-letter country code to a display name.
///
/// Unrecognized codes pass through verbatim, case-sensitive.
pub fn map_country_code(code: &str) -> String {
    match code {
        "US" => "United States",
        "GB" => "United Kingdom",
        "CA" => "Canada",
        "AU" => "Australia",
        "DE" => "Germany",
        "FR" => "France",
        "JP" => "Japan",
        "CN" => "China",
        "IN" => "India",
        "BR" => "Brazil",
        other => other,
    }
    .to_string()
}
