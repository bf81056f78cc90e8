//! Runtime configuration for the story lifecycle engine.

use crate::enums::StoryStatus;
use crate::error::ConfigError;
use std::time::Duration;

/// Tunable limits and windows for the lifecycle manager.
///
/// All values are validated before the engine is constructed; an invalid
/// configuration never makes it into a running service.
#[derive(Debug, Clone, PartialEq)]
pub struct TiplineConfig {
    /// Upper bound on the `limit` query parameter.
    pub max_page_size: u32,
    /// List requests above this limit skip the cache entirely.
    pub cache_bypass_limit: u32,
    /// TTL for cached list and detail reads.
    pub cache_ttl: Duration,
    /// Creations allowed per window for ordinary users.
    pub rate_limit_per_window: u32,
    /// Creations allowed per window for privileged roles.
    pub rate_limit_per_window_privileged: u32,
    /// Width of the creation rate-limit window.
    pub rate_limit_window: Duration,
    /// Look-back window for owner+title duplicate suppression.
    pub duplicate_window: Duration,
    /// Statuses a non-privileged owner may soft-delete from.
    pub soft_deletable_statuses: Vec<StoryStatus>,
    /// Maximum title length after trimming, in characters.
    pub title_max_chars: usize,
    /// Maximum details length after trimming, in characters.
    pub details_max_chars: usize,
}

impl Default for TiplineConfig {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            cache_bypass_limit: 50,
            cache_ttl: Duration::from_secs(300),
            rate_limit_per_window: 10,
            rate_limit_per_window_privileged: 100,
            rate_limit_window: Duration::from_secs(3600),
            duplicate_window: Duration::from_secs(24 * 3600),
            soft_deletable_statuses: vec![
                StoryStatus::Draft,
                StoryStatus::Submitted,
                StoryStatus::Rejected,
                StoryStatus::Published,
            ],
            title_max_chars: 500,
            details_max_chars: 10_000,
        }
    }
}

impl TiplineConfig {
    /// Validate the configuration, naming the offending field on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(invalid("max_page_size", "0", "must be positive"));
        }
        if self.cache_bypass_limit == 0 {
            return Err(invalid("cache_bypass_limit", "0", "must be positive"));
        }
        if self.cache_ttl.is_zero() {
            return Err(invalid("cache_ttl", "0s", "must be a positive duration"));
        }
        if self.rate_limit_per_window == 0 {
            return Err(invalid("rate_limit_per_window", "0", "must be positive"));
        }
        if self.rate_limit_per_window_privileged < self.rate_limit_per_window {
            return Err(invalid(
                "rate_limit_per_window_privileged",
                &self.rate_limit_per_window_privileged.to_string(),
                "must be at least the ordinary ceiling",
            ));
        }
        if self.rate_limit_window.is_zero() {
            return Err(invalid(
                "rate_limit_window",
                "0s",
                "must be a positive duration",
            ));
        }
        if self.duplicate_window.is_zero() {
            return Err(invalid(
                "duplicate_window",
                "0s",
                "must be a positive duration",
            ));
        }
        if self.title_max_chars == 0 {
            return Err(invalid("title_max_chars", "0", "must be positive"));
        }
        if self.details_max_chars == 0 {
            return Err(invalid("details_max_chars", "0", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
