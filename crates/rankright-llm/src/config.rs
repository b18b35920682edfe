//! Gateway configuration
//!
//! Connection settings ([`GatewayConfig`]) come from the environment and are
//! built once at startup. Generation settings ([`GenerationConfig`]) control
//! what the model is asked to do and live in the pipeline's TOML config.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use url::Url;

/// Environment variable holding the resource endpoint
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
/// Environment variable holding the deployment name
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
/// Environment variable holding the API version
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
/// Environment variable enabling the private-network variant
pub const ENV_USE_PRIVATE_ENDPOINT: &str = "AZURE_OPENAI_USE_PRIVATE_ENDPOINT";
/// Environment variable holding the private IP address
pub const ENV_PRIVATE_IP: &str = "AZURE_OPENAI_PRIVATE_IP";
/// Environment variable holding the private FQDN
pub const ENV_PRIVATE_FQDN: &str = "AZURE_OPENAI_PRIVATE_FQDN";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "AZURE_OPENAI_TIMEOUT_SECS";

/// Default deployment name
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
/// Default REST API version
pub const DEFAULT_API_VERSION: &str = "2024-02-01";
/// Default whole-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How to reach the hosted model
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Resource endpoint, e.g. `https://myres.openai.azure.com`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    pub api_key: String,

    /// Model deployment name
    pub deployment: String,

    /// REST API version query parameter
    pub api_version: String,

    /// Route through a private endpoint
    pub use_private_endpoint: bool,

    /// Address the effective host resolves to when private routing is on
    pub private_ip: Option<String>,

    /// Host that replaces the endpoint host when private routing is on
    pub private_fqdn: Option<String>,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl GatewayConfig {
    /// Create a config for a public endpoint with default settings
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_private_endpoint: false,
            private_ip: None,
            private_fqdn: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    ///
    /// Missing values are left empty for [`GatewayConfig::issues`] to report;
    /// only values that are present but unparseable fail here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(
            get(ENV_ENDPOINT).unwrap_or_default(),
            get(ENV_API_KEY).unwrap_or_default(),
        );

        if let Some(deployment) = get(ENV_DEPLOYMENT) {
            config.deployment = deployment;
        }
        if let Some(version) = get(ENV_API_VERSION) {
            config.api_version = version;
        }
        if let Some(flag) = get(ENV_USE_PRIVATE_ENDPOINT) {
            config.use_private_endpoint = parse_flag(&flag).ok_or_else(|| {
                LlmError::Config(format!("{} must be true or false, got '{}'", ENV_USE_PRIVATE_ENDPOINT, flag))
            })?;
        }
        config.private_ip = get(ENV_PRIVATE_IP);
        config.private_fqdn = get(ENV_PRIVATE_FQDN);
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = secs.parse().map_err(|_| {
                LlmError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, secs))
            })?;
        }

        Ok(config)
    }

    /// Every problem with this config, empty when usable
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.endpoint.trim().is_empty() {
            issues.push(format!("{} is not set", ENV_ENDPOINT));
        } else {
            match Url::parse(&self.endpoint) {
                Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
                _ => issues.push(format!("{} is not a valid http(s) URL: {}", ENV_ENDPOINT, self.endpoint)),
            }
        }

        if self.api_key.trim().is_empty() {
            issues.push(format!("{} is not set", ENV_API_KEY));
        }
        if self.deployment.trim().is_empty() {
            issues.push(format!("{} is empty", ENV_DEPLOYMENT));
        }
        if self.api_version.trim().is_empty() {
            issues.push(format!("{} is empty", ENV_API_VERSION));
        }

        if self.use_private_endpoint {
            if self.private_ip.is_none() && self.private_fqdn.is_none() {
                issues.push(format!(
                    "{} is enabled but neither {} nor {} is set",
                    ENV_USE_PRIVATE_ENDPOINT, ENV_PRIVATE_IP, ENV_PRIVATE_FQDN
                ));
            }
            if let Some(ip) = &self.private_ip {
                if ip.parse::<IpAddr>().is_err() {
                    issues.push(format!("{} is not an IP address: {}", ENV_PRIVATE_IP, ip));
                }
            }
        }

        if self.request_timeout_secs == 0 {
            issues.push("request timeout must be greater than 0".to_string());
        }
        if self.connect_timeout_secs == 0 {
            issues.push("connect timeout must be greater than 0".to_string());
        }

        issues
    }

    /// Fail with every issue joined, or succeed when the config is usable
    pub fn validate(&self) -> Result<(), LlmError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(LlmError::Config(issues.join("; ")))
        }
    }

    /// Endpoint actually contacted, with the private FQDN applied
    pub fn effective_endpoint(&self) -> Result<Url, LlmError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| LlmError::Config(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;

        if self.use_private_endpoint {
            if let Some(fqdn) = &self.private_fqdn {
                url.set_host(Some(fqdn))
                    .map_err(|e| LlmError::Config(format!("invalid private FQDN '{}': {}", fqdn, e)))?;
            }
        }

        Ok(url)
    }

    /// Host and address to pin DNS resolution to, when private routing asks for it
    pub fn pinned_address(&self, endpoint: &Url) -> Result<Option<(String, SocketAddr)>, LlmError> {
        if !self.use_private_endpoint {
            return Ok(None);
        }
        let Some(ip) = &self.private_ip else {
            return Ok(None);
        };

        let ip: IpAddr = ip
            .parse()
            .map_err(|_| LlmError::Config(format!("invalid private IP '{}'", ip)))?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| LlmError::Config("endpoint has no host".to_string()))?;
        let port = endpoint.port_or_known_default().unwrap_or(443);

        Ok(Some((host.to_string(), SocketAddr::new(ip, port))))
    }

    /// Whole-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &key)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("use_private_endpoint", &self.use_private_endpoint)
            .field("private_ip", &self.private_ip)
            .field("private_fqdn", &self.private_fqdn)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// What the model is asked to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Content beyond this many characters is cut before sending
    pub max_content_chars: usize,

    /// Approximate summary length in words
    pub summary_words: usize,

    /// Token limit for summary requests
    pub summary_max_tokens: u32,

    /// Sampling temperature for summary requests
    pub summary_temperature: f32,

    /// Token limit for scoring requests
    pub score_max_tokens: u32,

    /// Sampling temperature for scoring requests
    pub score_temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 100_000,
            summary_words: 500,
            summary_max_tokens: 1000,
            summary_temperature: 0.3,
            score_max_tokens: 1500,
            score_temperature: 0.2,
        }
    }
}

impl GenerationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_content_chars == 0 {
            return Err("max_content_chars must be greater than 0".to_string());
        }
        if self.summary_words == 0 {
            return Err("summary_words must be greater than 0".to_string());
        }
        if self.summary_max_tokens == 0 || self.score_max_tokens == 0 {
            return Err("token limits must be greater than 0".to_string());
        }
        for (name, t) in [
            ("summary_temperature", self.summary_temperature),
            ("score_temperature", self.score_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("{} must be between 0.0 and 2.0", name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://myres.openai.azure.com/"),
            (ENV_API_KEY, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.deployment, "gpt-4o");
        assert_eq!(config.api_version, "2024-02-01");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(!config.use_private_endpoint);
        assert!(config.issues().is_empty());
    }

    #[test]
    fn test_missing_values_are_all_reported() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        let issues = config.issues();

        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains(ENV_ENDPOINT));
        assert!(issues[1].contains(ENV_API_KEY));
        assert!(matches!(config.validate(), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_unparseable_values_fail_early() {
        assert!(GatewayConfig::from_lookup(lookup(&[(ENV_USE_PRIVATE_ENDPOINT, "maybe")])).is_err());
        assert!(GatewayConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());
    }

    #[test]
    fn test_private_fqdn_replaces_host() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://myres.openai.azure.com"),
            (ENV_API_KEY, "secret"),
            (ENV_USE_PRIVATE_ENDPOINT, "true"),
            (ENV_PRIVATE_FQDN, "myres.privatelink.openai.azure.com"),
            (ENV_PRIVATE_IP, "10.0.0.5"),
        ]))
        .unwrap();

        let endpoint = config.effective_endpoint().unwrap();
        assert_eq!(endpoint.host_str(), Some("myres.privatelink.openai.azure.com"));

        let (host, addr) = config.pinned_address(&endpoint).unwrap().unwrap();
        assert_eq!(host, "myres.privatelink.openai.azure.com");
        assert_eq!(addr, "10.0.0.5:443".parse().unwrap());
    }

    #[test]
    fn test_private_settings_ignored_when_disabled() {
        let mut config = GatewayConfig::new("https://myres.openai.azure.com", "k");
        config.private_fqdn = Some("other.host".to_string());
        config.private_ip = Some("10.0.0.5".to_string());

        let endpoint = config.effective_endpoint().unwrap();
        assert_eq!(endpoint.host_str(), Some("myres.openai.azure.com"));
        assert!(config.pinned_address(&endpoint).unwrap().is_none());
    }

    #[test]
    fn test_private_enabled_without_target_is_an_issue() {
        let mut config = GatewayConfig::new("https://myres.openai.azure.com", "k");
        config.use_private_endpoint = true;
        assert_eq!(config.issues().len(), 1);

        config.private_ip = Some("not-an-ip".to_string());
        assert!(config.issues()[0].contains(ENV_PRIVATE_IP));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GatewayConfig::new("https://x.openai.azure.com", "super-secret-key");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_generation_defaults_validate() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_content_chars, 100_000);
        assert_eq!(config.summary_words, 500);
    }

    #[test]
    fn test_generation_rejects_bad_values() {
        let config = GenerationConfig {
            score_temperature: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            max_content_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generation_partial_toml() {
        let config: GenerationConfig = toml::from_str("summary_words = 200\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.summary_words, 200);
        assert_eq!(config.score_max_tokens, 1500);
    }
}
