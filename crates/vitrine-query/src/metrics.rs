//! Query layer counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::state::SkipReason;

/// Counters shared by every key of a client.
#[derive(Debug, Default)]
pub struct QueryMetrics {
    fetches_started: AtomicU64,
    pages_appended: AtomicU64,
    failures: AtomicU64,
    skipped_in_flight: AtomicU64,
    skipped_exhausted: AtomicU64,
    discarded: AtomicU64,
    evictions: AtomicU64,
}

impl QueryMetrics {
    pub(crate) fn record_fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_appended(&self) {
        self.pages_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skip(&self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::InFlight => &self.skipped_in_flight,
            SkipReason::Exhausted => &self.skipped_exhausted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            pages_appended: self.pages_appended.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            skipped_in_flight: self.skipped_in_flight.load(Ordering::Relaxed),
            skipped_exhausted: self.skipped_exhausted.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub fetches_started: u64,
    pub pages_appended: u64,
    pub failures: u64,
    pub skipped_in_flight: u64,
    pub skipped_exhausted: u64,
    pub discarded: u64,
    pub evictions: u64,
}
