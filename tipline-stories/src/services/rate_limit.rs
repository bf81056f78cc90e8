//! Per-user creation rate limiting.
//!
//! A sliding counter keyed by user id lives in the shared cache store, one
//! key per fixed window. The limiter is deliberately best-effort: a failure
//! to read or write the counter degrades to "unlimited" (the caller logs a
//! warning), while a confirmed over-limit always blocks. Counting uses a
//! read-modify-write, so two racing creations may both land on the same
//! count; the window bound still holds to within that race.

use std::sync::Arc;
use std::time::Duration;
use tipline_core::UserId;
use tipline_storage::{keys, CacheBackend};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Under the ceiling; the attempt has been counted.
    Allowed,
    /// Ceiling reached within the current window.
    Limited { limit: u32 },
    /// The counter store failed; the caller decides (fail-open here).
    Unavailable,
}

/// Sliding-window creation counter over the shared cache store.
pub struct CreationRateLimiter {
    cache: Arc<dyn CacheBackend>,
}

impl CreationRateLimiter {
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self { cache }
    }

    /// Check the caller's quota and count this attempt if allowed.
    pub async fn check_and_count(
        &self,
        user_id: UserId,
        limit: u32,
        window: Duration,
    ) -> RateDecision {
        let window_secs = window.as_secs().max(1);
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let window_index = now / window_secs;
        let key = keys::creation_rate_key(user_id, window_index);

        let count = match self.cache.get(&key).await {
            Ok(Some(raw)) => match raw.parse::<u32>() {
                Ok(count) => count,
                Err(_) => {
                    tracing::warn!(%key, %raw, "unparseable rate counter, resetting");
                    0
                }
            },
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(%key, %err, "rate counter read failed");
                return RateDecision::Unavailable;
            }
        };

        if count >= limit {
            return RateDecision::Limited { limit };
        }

        // Counter expires with its window.
        let remaining = window_secs - (now % window_secs);
        if let Err(err) = self
            .cache
            .set(&key, &(count + 1).to_string(), Duration::from_secs(remaining))
            .await
        {
            tracing::warn!(%key, %err, "rate counter write failed");
            return RateDecision::Unavailable;
        }

        RateDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tipline_storage::MemoryCacheBackend;

    fn limiter() -> CreationRateLimiter {
        CreationRateLimiter::new(Arc::new(MemoryCacheBackend::new()))
    }

    #[tokio::test]
    async fn test_allows_up_to_the_ceiling_then_blocks() {
        let limiter = limiter();
        let user = UserId::new(1);
        let window = Duration::from_secs(3600);

        for _ in 0..10 {
            assert_eq!(
                limiter.check_and_count(user, 10, window).await,
                RateDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check_and_count(user, 10, window).await,
            RateDecision::Limited { limit: 10 }
        );
    }

    #[tokio::test]
    async fn test_counters_are_per_user() {
        let limiter = limiter();
        let window = Duration::from_secs(3600);

        assert_eq!(
            limiter
                .check_and_count(UserId::new(1), 1, window)
                .await,
            RateDecision::Allowed
        );
        assert_eq!(
            limiter
                .check_and_count(UserId::new(1), 1, window)
                .await,
            RateDecision::Limited { limit: 1 }
        );
        // A different user has a fresh counter.
        assert_eq!(
            limiter
                .check_and_count(UserId::new(2), 1, window)
                .await,
            RateDecision::Allowed
        );
    }
}
