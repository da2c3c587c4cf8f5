use super::ResponseCache;
use crate::metrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: chrono::Duration) -> Self {
        Self {
            value,
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Bounded in-memory cache with a fixed per-entry TTL.
///
/// Expired entries are dropped lazily: on lookup of that key, or when an
/// insert finds the store full. A full store then evicts the entry that
/// expires soonest.
#[derive(Clone)]
pub struct MemoryCache<T> {
    store: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    ttl: chrono::Duration,
    max_entries: usize,
}

impl<T> MemoryCache<T> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            max_entries: max_entries.max(1),
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ResponseCache<T> for MemoryCache<T> {
    async fn get(&self, key: &str) -> Option<T> {
        let now = Utc::now();
        let expired = {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    metrics::track_cache_operation("get", self.backend(), true);
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut store = self.store.write().await;
            // Re-check: another task may have refreshed the key meanwhile
            if store.get(key).is_some_and(|entry| entry.is_expired(now)) {
                store.remove(key);
            }
        }

        metrics::track_cache_operation("get", self.backend(), false);
        None
    }

    async fn set(&self, key: &str, value: T) {
        let mut store = self.store.write().await;

        if !store.contains_key(key) && store.len() >= self.max_entries {
            let now = Utc::now();
            store.retain(|_, entry| !entry.is_expired(now));

            if store.len() >= self.max_entries {
                let soonest = store
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(soonest) = soonest {
                    store.remove(&soonest);
                }
            }
        }

        store.insert(key.to_string(), CacheEntry::new(value, self.ttl));
        metrics::update_cache_size(self.backend(), store.len());
    }

    async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_within_ttl() {
        let cache: MemoryCache<String> = MemoryCache::new(Duration::from_secs(60), 10);

        cache.set("key1", "value1".to_string()).await;
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_removed() {
        let cache: MemoryCache<String> = MemoryCache::new(Duration::from_millis(50), 10);

        cache.set("key1", "value1".to_string()).await;
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Still stored until looked up
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("key1").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_resets_ttl() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_millis(150), 10);

        cache.set("key", 1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.set("key", 2).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get("key").await, Some(2));
    }

    #[tokio::test]
    async fn test_full_cache_evicts_soonest_expiring() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_secs(60), 2);

        cache.set("first", 1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.set("second", 2).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.set("third", 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("first").await, None);
        assert_eq!(cache.get("second").await, Some(2));
        assert_eq!(cache.get("third").await, Some(3));
    }

    #[tokio::test]
    async fn test_full_cache_prefers_dropping_expired() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_millis(50), 2);

        cache.set("a", 1).await;
        cache.set("b", 2).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.set("c", 3).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_overwrite_at_capacity_keeps_other_entries() {
        let cache: MemoryCache<i32> = MemoryCache::new(Duration::from_secs(60), 2);

        cache.set("a", 1).await;
        cache.set("b", 2).await;
        cache.set("a", 10).await;

        assert_eq!(cache.get("a").await, Some(10));
        assert_eq!(cache.get("b").await, Some(2));
    }
}
