//! Query client: the entry map and the load-more contract.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::{debug, info, warn};
use vitrine_catalog::QueryKey;
use vitrine_fetch::PaginatedCatalogFetcher;

use crate::entry::{Completion, QueryEntry};
use crate::error::QueryError;
use crate::handle::QueryHandle;
use crate::metrics::{MetricsSnapshot, QueryMetrics};
use crate::policy::QueryCachePolicy;
use crate::state::{LoadOutcome, QuerySnapshot};

struct ClientInner {
    fetcher: PaginatedCatalogFetcher,
    policy: QueryCachePolicy,
    entries: Mutex<HashMap<QueryKey, Arc<QueryEntry>>>,
    metrics: QueryMetrics,
}

/// Shared cache of paginated query results, keyed by `QueryKey`.
///
/// Cloning is cheap; clones share the same cache. Lock order is the entry
/// map first, then an entry's state.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("fetcher", &self.inner.fetcher)
            .field("policy", &self.inner.policy)
            .field("entries", &self.lock_entries().len())
            .finish()
    }
}

impl QueryClient {
    /// Create a client over a fetcher.
    pub fn new(fetcher: PaginatedCatalogFetcher, policy: QueryCachePolicy) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                fetcher,
                policy,
                entries: Mutex::new(HashMap::new()),
                metrics: QueryMetrics::default(),
            }),
        }
    }

    /// Client over the demo catalog with default policy.
    pub fn demo() -> Self {
        Self::new(PaginatedCatalogFetcher::demo(), QueryCachePolicy::default())
    }

    /// Attach a consumer to `key`. Equal keys, after normalization, share
    /// one entry.
    pub fn query(&self, key: QueryKey) -> QueryHandle {
        let entry = self.attach(key.normalize());
        QueryHandle::new(self.clone(), entry)
    }

    /// Active cache policy.
    pub fn policy(&self) -> &QueryCachePolicy {
        &self.inner.policy
    }

    /// Underlying fetcher.
    pub fn fetcher(&self) -> &PaginatedCatalogFetcher {
        &self.inner.fetcher
    }

    /// Counter values.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Keys currently cached, observed or not.
    pub fn cached_keys(&self) -> Vec<QueryKey> {
        self.lock_entries().keys().cloned().collect()
    }

    /// Latest state of a cached key.
    pub fn snapshot(&self, key: &QueryKey) -> Option<QuerySnapshot> {
        let key = key.clone().normalize();
        self.lock_entries().get(&key).map(|entry| entry.snapshot())
    }

    /// Evict keys that have gone unobserved for the GC window. Returns the
    /// number evicted.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let policy = self.inner.policy;
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = !entry.is_collectable(&policy, now);
            if !keep {
                debug!(%key, "evicting query entry");
            }
            keep
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            self.inner.metrics.record_evictions(evicted);
        }
        evicted
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Arc<QueryEntry>>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn attach(&self, key: QueryKey) -> Arc<QueryEntry> {
        self.collect_garbage();

        let now = Instant::now();
        let mut entries = self.lock_entries();
        let entry = entries
            .entry(key)
            .or_insert_with_key(|key| Arc::new(QueryEntry::new(key.clone())));
        if entry.attach(&self.inner.policy, now) {
            debug!(key = %entry.key(), "stale query entry reset");
        }
        Arc::clone(entry)
    }

    pub(crate) fn release(&self, entry: &Arc<QueryEntry>) {
        let now = Instant::now();
        if !entry.detach(now) {
            return;
        }
        debug!(key = %entry.key(), "query entry unobserved");

        if self.inner.policy.gc_time.is_zero() {
            let mut entries = self.lock_entries();
            let owned = entries
                .get(entry.key())
                .is_some_and(|cached| Arc::ptr_eq(cached, entry));
            if owned && entry.is_collectable(&self.inner.policy, now) {
                entries.remove(entry.key());
                self.inner.metrics.record_evictions(1);
                debug!(key = %entry.key(), "evicting query entry");
            }
        }
    }

    /// Fetch the next page of `entry`, or a fresh first page with `fresh`.
    pub(crate) async fn load(
        &self,
        entry: &QueryEntry,
        fresh: bool,
    ) -> Result<LoadOutcome, QueryError> {
        let metrics = &self.inner.metrics;
        let key = entry.key();

        let ticket = match entry.begin(fresh) {
            Ok(ticket) => ticket,
            Err(reason) => {
                metrics.record_skip(reason);
                debug!(%key, ?reason, "load skipped");
                return Ok(LoadOutcome::Skipped(reason));
            }
        };

        metrics.record_fetch_started();
        debug!(%key, cursor = ?ticket.cursor(), fresh, "fetching page");
        let result = self.inner.fetcher.fetch_page(key, ticket.cursor()).await;

        match ticket.complete(result) {
            Completion::Appended { count, has_more } => {
                metrics.record_appended();
                info!(%key, count, has_more, "page appended");
                Ok(LoadOutcome::Appended { count, has_more })
            }
            Completion::Failed(source) => {
                metrics.record_failure();
                warn!(%key, error = %source, "page fetch failed");
                Err(QueryError::FetchFailed {
                    key: key.clone(),
                    source,
                })
            }
            Completion::Discarded => {
                metrics.record_discarded();
                debug!(%key, "discarding late page");
                Ok(LoadOutcome::Discarded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client_with(policy: QueryCachePolicy) -> QueryClient {
        QueryClient::new(PaginatedCatalogFetcher::demo(), policy)
    }

    #[tokio::test]
    async fn test_aliases_share_one_entry() {
        let client = QueryClient::demo();
        let _a = client.query(QueryKey::category("Tous"));
        let _b = client.query(QueryKey::Category("All".into()));
        let _c = client.query(QueryKey::All);

        assert_eq!(client.cached_keys(), vec![QueryKey::All]);
    }

    #[tokio::test]
    async fn test_zero_gc_drops_entry_on_last_detach() {
        let client = client_with(QueryCachePolicy::default().with_gc_time(Duration::ZERO));
        let first = client.query(QueryKey::Discounted);
        let second = client.query(QueryKey::Discounted);

        drop(first);
        assert_eq!(client.cached_keys().len(), 1);
        drop(second);
        assert!(client.cached_keys().is_empty());
        assert_eq!(client.metrics().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unobserved_entry_kept_until_gc_window() {
        let client = client_with(QueryCachePolicy::default().with_gc_time(Duration::from_secs(30)));
        let handle = client.query(QueryKey::All);
        handle.load_more().await.unwrap();
        drop(handle);

        assert_eq!(client.collect_garbage(), 0);
        assert_eq!(client.snapshot(&QueryKey::All).map(|s| s.len()), Some(6));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(client.collect_garbage(), 1);
        assert!(client.snapshot(&QueryKey::All).is_none());
    }

    #[tokio::test]
    async fn test_reattach_within_stale_window_keeps_pages() {
        let client = QueryClient::demo();
        let handle = client.query(QueryKey::All);
        handle.load_more().await.unwrap();
        drop(handle);

        let again = client.query(QueryKey::category("all"));
        assert_eq!(again.snapshot().len(), 6);
        assert_eq!(client.metrics().fetches_started, 1);
    }
}
