//! Configuration types for the threat-intel aggregator.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// AbuseIPDB provider configuration (mandatory provider).
    #[serde(default)]
    pub abuseipdb: AbuseIpdbConfig,

    /// IPQualityScore provider configuration (mandatory provider).
    #[serde(default)]
    pub ipqualityscore: IpQualityScoreConfig,

    /// ip-api.com geolocation provider configuration.
    #[serde(default)]
    pub ipapi: IpApiConfig,

    /// VirusTotal provider configuration.
    #[serde(default)]
    pub virustotal: VirusTotalConfig,
}

/// AbuseIPDB provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbuseIpdbConfig {
    /// Enable AbuseIPDB lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax).
    #[serde(default)]
    pub api_key: String,

    /// Base URL override.
    #[serde(default = "default_abuseipdb_url")]
    pub base_url: String,

    /// Only consider reports from the last N days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

impl Default for AbuseIpdbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_abuseipdb_url(),
            max_age_days: default_max_age_days(),
        }
    }
}

fn default_abuseipdb_url() -> String {
    "https://api.abuseipdb.com/api/v2".to_string()
}

fn default_max_age_days() -> u32 {
    90
}

/// IPQualityScore provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpQualityScoreConfig {
    /// Enable IPQualityScore lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax).
    #[serde(default)]
    pub api_key: String,

    /// Base URL override.
    #[serde(default = "default_ipqualityscore_url")]
    pub base_url: String,
}

impl Default for IpQualityScoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_ipqualityscore_url(),
        }
    }
}

fn default_ipqualityscore_url() -> String {
    "https://ipqualityscore.com/api/json/ip".to_string()
}

/// ip-api.com geolocation provider configuration.
///
/// The provider counts as configured when either a base URL or an API key is
/// present. A default base URL is always supplied, so in practice the
/// provider is active unless `enabled` is set to false.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpApiConfig {
    /// Enable ip-api.com lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL.
    #[serde(default = "default_ipapi_url")]
    pub base_url: String,

    /// API key for the pro tier, sent as a query parameter when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for IpApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_ipapi_url(),
            api_key: None,
        }
    }
}

fn default_ipapi_url() -> String {
    "http://ip-api.com/json".to_string()
}

/// VirusTotal provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirusTotalConfig {
    /// Enable VirusTotal lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax). Lookups are disabled without it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override.
    #[serde(default = "default_virustotal_url")]
    pub base_url: String,
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_virustotal_url(),
        }
    }
}

fn default_virustotal_url() -> String {
    "https://www.virustotal.com/api/v3".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    ///
    /// AbuseIPDB and IPQualityScore are the mandatory providers: an empty
    /// API key while enabled is a startup error. The geo and VirusTotal
    /// providers degrade to disabled instead.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.abuseipdb.enabled && self.abuseipdb.api_key.is_empty() {
            anyhow::bail!("AbuseIPDB is enabled but api_key is empty");
        }

        if self.ipqualityscore.enabled && self.ipqualityscore.api_key.is_empty() {
            anyhow::bail!("IPQualityScore is enabled but api_key is empty");
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# Threat-intel aggregator configuration

# AbuseIPDB - abuse confidence score and report history (mandatory)
abuseipdb:
  enabled: true
  api_key: "${ABUSEIPDB_API_KEY}"  # Use environment variable
  max_age_days: 90                 # Only consider reports from last 90 days

# IPQualityScore - fraud score and VPN/proxy detection (mandatory)
ipqualityscore:
  enabled: true
  api_key: "${IPQUALITYSCORE_API_KEY}"

# ip-api.com - geolocation, ISP and reverse DNS (optional)
ipapi:
  enabled: true
  base_url: "http://ip-api.com/json"
  # api_key: "${IPAPI_API_KEY}"    # Pro tier only

# VirusTotal - security-vendor vote counts (optional, disabled without a key)
virustotal:
  enabled: true
  api_key: "${VIRUSTOTAL_API_KEY}"
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.abuseipdb.enabled);
        assert_eq!(config.abuseipdb.max_age_days, 90);
        assert_eq!(config.ipapi.base_url, "http://ip-api.com/json");
        assert!(config.virustotal.api_key.is_none());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_INTEL_KEY", "secret123");
        let input = "api_key: \"${TEST_INTEL_KEY}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"secret123\"");
        std::env::remove_var("TEST_INTEL_KEY");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let input = "api_key: \"${NONEXISTENT_INTEL_VAR}\"";
        let result = expand_env_vars(input);
        assert_eq!(result, "api_key: \"\"");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
abuseipdb:
  api_key: "abuse-key"
  max_age_days: 30

ipqualityscore:
  api_key: "ipqs-key"

virustotal:
  api_key: "vt-key"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.abuseipdb.enabled);
        assert_eq!(config.abuseipdb.api_key, "abuse-key");
        assert_eq!(config.abuseipdb.max_age_days, 30);
        assert_eq!(config.ipqualityscore.api_key, "ipqs-key");
        assert_eq!(config.virustotal.api_key.as_deref(), Some("vt-key"));
        // Untouched sections keep their defaults
        assert_eq!(config.ipapi.base_url, "http://ip-api.com/json");
    }

    #[test]
    fn test_validate_requires_mandatory_keys() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.abuseipdb.api_key = "abuse-key".to_string();
        assert!(config.validate().is_err());

        config.ipqualityscore.api_key = "ipqs-key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_disabled_providers_skip_key_check() {
        let mut config = Config::default();
        config.abuseipdb.enabled = false;
        config.ipqualityscore.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(&Config::example()).unwrap();
        assert!(config.abuseipdb.enabled);
        assert!(config.ipqualityscore.enabled);
    }
}
