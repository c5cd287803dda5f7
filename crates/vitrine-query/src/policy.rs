//! Cache freshness and retention windows.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

/// How long cached pages stay fresh and how long unobserved keys are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCachePolicy {
    /// Age after which an unobserved key restarts from a fresh first page
    /// when a consumer attaches again.
    pub stale_time: Duration,
    /// How long an unobserved key is retained before eviction. Zero
    /// discards it as soon as its last consumer detaches.
    pub gc_time: Duration,
}

impl Default for QueryCachePolicy {
    fn default() -> Self {
        Self {
            stale_time: FIVE_MINUTES,
            gc_time: FIVE_MINUTES,
        }
    }
}

impl QueryCachePolicy {
    /// Set the stale window.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Set the retention window.
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Check if data of this age is stale.
    pub fn is_stale(&self, age: Duration) -> bool {
        age >= self.stale_time
    }

    /// Check if an entry unobserved for this long should be evicted.
    pub fn is_expired(&self, idle: Duration) -> bool {
        idle >= self.gc_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_five_minutes() {
        let policy = QueryCachePolicy::default();
        assert_eq!(policy.stale_time, Duration::from_secs(300));
        assert_eq!(policy.gc_time, Duration::from_secs(300));
    }

    #[test]
    fn test_zero_gc_expires_immediately() {
        let policy = QueryCachePolicy::default().with_gc_time(Duration::ZERO);
        assert!(policy.is_expired(Duration::ZERO));
        assert!(!QueryCachePolicy::default().is_expired(Duration::from_secs(299)));
    }
}
