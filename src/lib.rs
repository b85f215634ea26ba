//! Threat-intelligence aggregation for public IPv4 addresses.
//!
//! Fans out one lookup to four external reputation sources, merges whatever
//! comes back, and computes an overall risk level.
//!
//! # Features
//!
//! - **AbuseIPDB** - abuse confidence score and report history
//! - **IPQualityScore** - fraud score and VPN/proxy/Tor detection
//! - **ip-api.com** - geolocation, ISP and reverse DNS
//! - **VirusTotal** - security-vendor vote counts
//! - **Partial-failure tolerance** - any single source is enough for a report
//! - **Weighted risk level** - deterministic low/medium/high classification
//!
//! # Example Configuration
//!
//! ```yaml
//! abuseipdb:
//!   enabled: true
//!   api_key: "${ABUSEIPDB_API_KEY}"
//!
//! ipqualityscore:
//!   enabled: true
//!   api_key: "${IPQUALITYSCORE_API_KEY}"
//!
//! virustotal:
//!   api_key: "${VIRUSTOTAL_API_KEY}"
//! ```

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod providers;
pub mod risk;

pub use aggregator::{AllSourcesUnavailable, ThreatIntelAggregator, ThreatReport};
pub use classify::{classify, IpClass};
pub use config::Config;
pub use risk::RiskLevel;
