//! Keyed TTL cache capability
//!
//! Cache values are opaque serialized blobs; the only invalidation path is
//! natural expiry. Any key-value store with TTL support can stand behind the
//! trait; `MemoryCache` is the in-process implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Keyed byte store with per-entry time-to-live
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Look up a key. Expired entries are misses.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any previous entry for the key.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

/// In-process TTL cache backed by a HashMap
///
/// Expired entries are evicted lazily, on the read that discovers them.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired but not yet evicted) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired, evict below
                None => return None,
            }
        }

        // Entry exists but has expired; evict under the write lock. Re-check
        // the deadline in case a concurrent set refreshed the entry between
        // the two lock acquisitions.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_on_unknown_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("book_123").await, None);
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("book_123", b"payload".to_vec(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("book_123").await, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_evicted() {
        let cache = MemoryCache::new();
        cache
            .set("book_123", b"payload".to_vec(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("book_123").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let cache = MemoryCache::new();
        cache
            .set("k", b"old".to_vec(), Duration::from_secs(60))
            .await;
        cache
            .set("k", b"new".to_vec(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await, Some(b"new".to_vec()));
    }
}
