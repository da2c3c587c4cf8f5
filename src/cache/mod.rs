//! Response cache for upstream query results
//!
//! Handlers depend on the [`ResponseCache`] trait and receive a concrete
//! store at construction time. [`memory::MemoryCache`] is a bounded,
//! TTL-evicting in-memory store; [`NoopCache`] disables caching.

pub mod config;
pub mod memory;

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub use config::CacheConfig;
pub use memory::MemoryCache;

use crate::health::{HealthCheckResult, HealthChecker};

#[async_trait]
pub trait ResponseCache<T>: Send + Sync {
    /// Fetch an unexpired value
    async fn get(&self, key: &str) -> Option<T>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: T);

    /// Number of stored entries, expired ones included until evicted
    async fn len(&self) -> usize;

    /// Name reported in logs and metrics
    fn backend(&self) -> &'static str;
}

/// Cache that stores nothing
pub struct NoopCache<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> NoopCache<T> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for NoopCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + 'static> ResponseCache<T> for NoopCache<T> {
    async fn get(&self, _key: &str) -> Option<T> {
        None
    }

    async fn set(&self, _key: &str, _value: T) {}

    async fn len(&self) -> usize {
        0
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}

/// Build the cache selected by configuration
pub fn from_config<T>(config: &CacheConfig) -> Arc<dyn ResponseCache<T>>
where
    T: Clone + Send + Sync + 'static,
{
    if config.enabled {
        Arc::new(MemoryCache::new(
            Duration::from_secs(config.ttl_seconds),
            config.max_entries,
        ))
    } else {
        Arc::new(NoopCache::new())
    }
}

/// Health checker reporting cache occupancy
pub struct CacheHealthChecker<T> {
    cache: Arc<dyn ResponseCache<T>>,
    config: CacheConfig,
}

impl<T> CacheHealthChecker<T> {
    pub fn new(cache: Arc<dyn ResponseCache<T>>, config: CacheConfig) -> Self {
        Self { cache, config }
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> HealthChecker for CacheHealthChecker<T> {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthCheckResult {
        let entries = self.cache.len().await;
        HealthCheckResult::healthy_with_details(serde_json::json!({
            "backend": self.cache.backend(),
            "entries": entries,
            "max_entries": self.config.max_entries,
            "ttl_seconds": self.config.ttl_seconds,
        }))
    }

    fn info(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "service": "Response Cache",
            "backend": self.cache.backend()
        }))
    }
}
