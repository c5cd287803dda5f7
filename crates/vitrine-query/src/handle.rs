//! Consumer-side view of one query key.

use std::sync::Arc;

use tokio::sync::watch;
use vitrine_catalog::{Item, QueryKey};

use crate::client::QueryClient;
use crate::entry::QueryEntry;
use crate::error::QueryError;
use crate::state::{LoadOutcome, QuerySnapshot};

/// A consumer attached to one query key, typically one listing screen.
///
/// Dropping the handle detaches it. When the last handle on a key goes
/// away, a fetch still pending for that key has its result discarded.
#[derive(Debug)]
pub struct QueryHandle {
    client: QueryClient,
    entry: Arc<QueryEntry>,
}

impl QueryHandle {
    pub(crate) fn new(client: QueryClient, entry: Arc<QueryEntry>) -> Self {
        Self { client, entry }
    }

    /// Key this handle observes.
    pub fn key(&self) -> &QueryKey {
        self.entry.key()
    }

    /// Latest state.
    pub fn snapshot(&self) -> QuerySnapshot {
        self.entry.snapshot()
    }

    /// Items loaded so far.
    pub fn items(&self) -> Arc<Vec<Item>> {
        self.snapshot().items
    }

    /// Check if a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    /// Message of the last failed fetch.
    pub fn error(&self) -> Option<String> {
        self.snapshot().error
    }

    /// False once the last page has been loaded.
    pub fn has_more(&self) -> bool {
        self.snapshot().has_more
    }

    /// Fetch and append the next page.
    ///
    /// Issues no request while another fetch for the key is in flight or
    /// after the last page. On failure the loaded items are kept and the
    /// same page is retried by the next call.
    pub async fn load_more(&self) -> Result<LoadOutcome, QueryError> {
        self.client.load(&self.entry, false).await
    }

    /// Drop every loaded page and fetch a fresh first page. A fetch still
    /// pending for the key has its result discarded.
    pub async fn refetch(&self) -> Result<LoadOutcome, QueryError> {
        self.client.load(&self.entry, true).await
    }

    /// Observe every state change of the key.
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.entry.subscribe()
    }

    /// Wait until no fetch is in flight and return the settled state.
    pub async fn wait_idle(&self) -> QuerySnapshot {
        let mut rx = self.entry.subscribe();
        let settled = match rx.wait_for(|snapshot| !snapshot.is_loading()).await {
            Ok(snapshot) => Some(snapshot.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }

    /// Switch to another key. The old key is detached as if this handle
    /// had been dropped.
    pub fn rekey(&mut self, key: QueryKey) {
        let key = key.normalize();
        if &key == self.entry.key() {
            return;
        }
        let next = self.client.attach(key);
        let previous = std::mem::replace(&mut self.entry, next);
        self.client.release(&previous);
    }
}

impl Drop for QueryHandle {
    fn drop(&mut self) {
        self.client.release(&self.entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{QueryStatus, SkipReason};

    #[tokio::test]
    async fn test_load_more_until_exhausted() {
        let client = QueryClient::demo();
        let handle = client.query(QueryKey::All);

        assert_eq!(
            handle.load_more().await.unwrap(),
            LoadOutcome::Appended { count: 6, has_more: true }
        );
        assert_eq!(
            handle.load_more().await.unwrap(),
            LoadOutcome::Appended { count: 2, has_more: false }
        );
        assert_eq!(
            handle.load_more().await.unwrap(),
            LoadOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(handle.items().len(), 8);
        assert!(!handle.has_more());
        assert_eq!(handle.snapshot().status, QueryStatus::Ready);
    }

    #[tokio::test]
    async fn test_refetch_restarts_from_first_page() {
        let client = QueryClient::demo();
        let handle = client.query(QueryKey::All);
        handle.load_more().await.unwrap();
        handle.load_more().await.unwrap();

        let outcome = handle.refetch().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { count: 6, has_more: true });
        assert_eq!(handle.snapshot().pages_loaded, 1);
        assert_eq!(handle.items().len(), 6);
    }

    #[tokio::test]
    async fn test_rekey_moves_observer() {
        let client = QueryClient::demo();
        let mut handle = client.query(QueryKey::All);
        handle.load_more().await.unwrap();

        handle.rekey(QueryKey::search("nike"));
        assert_eq!(handle.key(), &QueryKey::search("nike"));
        assert!(handle.snapshot().is_empty());

        handle.load_more().await.unwrap();
        assert!(handle.items().iter().any(|item| item.name == "Nike Air Max 270"));
        assert_eq!(client.snapshot(&QueryKey::All).map(|s| s.len()), Some(6));
    }

    #[tokio::test]
    async fn test_rekey_to_alias_is_noop() {
        let client = QueryClient::demo();
        let mut handle = client.query(QueryKey::All);
        handle.load_more().await.unwrap();

        handle.rekey(QueryKey::category("Tous"));
        assert_eq!(handle.items().len(), 6);
    }
}
