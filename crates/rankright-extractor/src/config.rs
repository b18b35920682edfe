//! Configuration for content extraction

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted upload, 10 MiB
pub const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the content extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Files larger than this are rejected before parsing
    pub max_file_bytes: usize,

    /// Whole-request timeout for web pages, in seconds
    pub fetch_timeout_secs: u64,

    /// User agent sent with web requests
    pub user_agent: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            fetch_timeout_secs: 30,
            user_agent: concat!("Mozilla/5.0 (compatible; RankRight/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_bytes == 0 {
            return Err("max_file_bytes must be greater than 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
    }

    /// Web request timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.user_agent.contains("RankRight"));
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = ExtractorConfig {
            fetch_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ExtractorConfig = toml::from_str("fetch_timeout_secs = 5").unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }
}
