//! Cache backend trait for pluggable key-value stores.

use crate::StorageResult;
use async_trait::async_trait;
use std::time::Duration;

/// Cache backend abstraction over a shared key-value store.
///
/// Values are opaque strings (the engine stores serialized JSON). Keys are
/// generated by [`super::keys`] so every caller agrees on layout and prefix
/// structure. Implementations must be safe for concurrent access from many
/// request tasks.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value, or `None` on miss/expiry.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Remove every key under a prefix; returns the number removed.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<u64>;

    /// Enumerate live keys under a prefix. For statistics and debugging
    /// only - never called on the hot path.
    async fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get cache statistics.
    async fn stats(&self) -> StorageResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty = CacheStats::default();
        assert!((empty.hit_rate() - 0.0).abs() < 0.001);
    }
}
