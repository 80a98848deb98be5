//! Response cache for upstream market data requests
//!
//! Caches raw response bodies keyed by normalized request parameters so
//! repeated fetches within the TTL do not hit the provider again. Entries
//! expire after a fixed lifespan; the API key is never part of the key.

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key derived from the normalized request parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Upstream `function` parameter selecting the operation
    pub function: String,
    /// Remaining query parameters, sorted by name, joined as `k=v&k=v`
    pub params: String,
}

impl CacheKey {
    /// Create a key from an operation name and its query parameters
    ///
    /// Parameter order does not matter; two requests with the same
    /// parameters in different order share a key.
    pub fn new(function: impl Into<String>, params: &[(String, String)]) -> Self {
        let mut sorted: Vec<_> = params
            .iter()
            .filter(|(name, _)| name != "apikey")
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        sorted.sort();

        Self {
            function: function.into(),
            params: sorted.join("&"),
        }
    }
}

/// Thread-safe TTL cache for raw response bodies
pub struct ResponseCache {
    cache: Arc<RwLock<TimedCache<CacheKey, String>>>,
}

impl ResponseCache {
    /// Create a new cache with the specified entry lifespan
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a cached body
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a body into the cache
    pub async fn insert(&self, key: CacheKey, body: String) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, body);
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for ResponseCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
