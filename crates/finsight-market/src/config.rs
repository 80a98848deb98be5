//! Configuration for the market data tool set

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for market data operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Alpha Vantage API key
    pub api_key: String,

    /// Directory fetched dataset files are written to
    pub fetch_dir: PathBuf,

    /// Maximum upstream requests per minute (free tier: 5)
    pub rate_limit_per_minute: u32,

    /// TTL for cached upstream responses
    pub cache_ttl: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Build a configuration from the environment
    ///
    /// The `ALPHA_VANTAGE_API_KEY` variable is required; its absence is a
    /// startup-fatal condition.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            MarketError::ConfigError(
                "ALPHA_VANTAGE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::builder().api_key(api_key).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(MarketError::ConfigError(
                "Alpha Vantage API key must not be empty".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(MarketError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    api_key: Option<String>,
    fetch_dir: Option<PathBuf>,
    rate_limit_per_minute: Option<u32>,
    cache_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl MarketConfigBuilder {
    /// Set the Alpha Vantage API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the dataset output directory
    pub fn fetch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fetch_dir = Some(dir.into());
        self
    }

    /// Set the upstream rate limit (requests per minute)
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the response cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let config = MarketConfig {
            api_key: self.api_key.unwrap_or_default(),
            fetch_dir: self
                .fetch_dir
                .unwrap_or_else(|| PathBuf::from("fetched_data")),
            rate_limit_per_minute: self.rate_limit_per_minute.unwrap_or(5),
            cache_ttl: self.cache_ttl.unwrap_or(Duration::from_secs(900)),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MarketConfig::builder().api_key("test_key").build().unwrap();

        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.fetch_dir, PathBuf::from("fetched_data"));
        assert_eq!(config.rate_limit_per_minute, 5);
        assert_eq!(config.cache_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = MarketConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let result = MarketConfig::builder()
            .api_key("test_key")
            .rate_limit_per_minute(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = MarketConfig::builder()
            .api_key("test_key")
            .fetch_dir("/tmp/datasets")
            .rate_limit_per_minute(75)
            .cache_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.fetch_dir, PathBuf::from("/tmp/datasets"));
        assert_eq!(config.rate_limit_per_minute, 75);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
