//! Alpha Vantage API client

use crate::cache::{CacheKey, ResponseCache};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Source of upstream market data
///
/// The tool set depends on this trait rather than the concrete client so
/// tests can substitute a scripted source.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch an operation's response as CSV text
    async fn fetch_csv(&self, function: &str, params: &[(String, String)]) -> Result<String>;

    /// Fetch an operation's response as parsed JSON
    async fn fetch_json(
        &self,
        function: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value>;
}

/// Alpha Vantage API client
///
/// Every request passes the rate limiter (free tier default: 5/min) unless
/// the response cache already holds the body for the same parameters.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
    cache: ResponseCache,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client from a market configuration
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute)
                .unwrap_or(NonZeroU32::new(5).expect("nonzero literal")),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            rate_limiter,
            cache: ResponseCache::new(config.cache_ttl),
        })
    }

    /// Fetch a raw response body, consulting the cache first
    async fn fetch(
        &self,
        function: &str,
        datatype: Option<&str>,
        params: &[(String, String)],
    ) -> Result<String> {
        let key = CacheKey::new(function, params);
        if let Some(body) = self.cache.get(&key).await {
            debug!("Cache hit for {function}");
            return Ok(body);
        }

        self.rate_limiter.until_ready().await;

        let mut query: Vec<(String, String)> = vec![
            ("function".to_string(), function.to_string()),
            ("apikey".to_string(), self.api_key.clone()),
        ];
        if let Some(datatype) = datatype {
            query.push(("datatype".to_string(), datatype.to_string()));
        }
        query.extend_from_slice(params);

        debug!("Requesting {function} from Alpha Vantage");
        let response = self.client.get(BASE_URL).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        self.cache.insert(key, body.clone()).await;
        Ok(body)
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn fetch_csv(&self, function: &str, params: &[(String, String)]) -> Result<String> {
        self.fetch(function, Some("csv"), params).await
    }

    async fn fetch_json(
        &self,
        function: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value> {
        let body = self.fetch(function, None, params).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
