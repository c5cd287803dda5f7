//! Observable query state.

use std::sync::Arc;

use serde::Serialize;
use vitrine_catalog::{Cursor, Item, QueryKey};

/// Which page a loading key is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    First,
    Next,
}

/// Lifecycle of a query key.
///
/// `Idle -> Loading(First) -> Ready <-> Loading(Next) -> Ready | Error`.
/// `Error` returns to `Loading` when the page is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "page", rename_all = "lowercase")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading(PageKind),
    Ready,
    Error,
}

impl QueryStatus {
    /// Check if a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Check if the last fetch failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Point-in-time view of one key's accumulated results.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySnapshot {
    pub key: QueryKey,
    /// Every item loaded so far, in page order.
    pub items: Arc<Vec<Item>>,
    pub status: QueryStatus,
    /// Message of the last failed fetch, cleared when a fetch starts.
    pub error: Option<String>,
    /// False once the last page has been loaded.
    pub has_more: bool,
    pub pages_loaded: u32,
    pub next_cursor: Option<Cursor>,
    /// Candidate-set size reported by the last page.
    pub total: Option<usize>,
}

impl QuerySnapshot {
    /// Snapshot of a key with nothing loaded.
    pub fn empty(key: QueryKey) -> Self {
        Self {
            key,
            items: Arc::new(Vec::new()),
            status: QueryStatus::Idle,
            error: None,
            has_more: true,
            pages_loaded: 0,
            next_cursor: None,
            total: None,
        }
    }

    /// Check if a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Number of items loaded.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items are loaded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Why a `load_more` call issued no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A fetch for the key is already in flight.
    InFlight,
    /// The last page has been loaded.
    Exhausted,
}

/// Result of a `load_more` or `refetch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A page was fetched and appended.
    Appended { count: usize, has_more: bool },
    /// No request was issued.
    Skipped(SkipReason),
    /// The key was refetched or abandoned while the request was pending;
    /// its result was dropped.
    Discarded,
}

impl LoadOutcome {
    /// Check if a page was appended.
    pub fn appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_expects_more() {
        let snapshot = QuerySnapshot::empty(QueryKey::All);
        assert!(snapshot.has_more);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.status, QueryStatus::Idle);
    }

    #[test]
    fn test_status_serializes_with_page_kind() {
        let json = serde_json::to_string(&QueryStatus::Loading(PageKind::Next)).unwrap();
        assert_eq!(json, r#"{"state":"loading","page":"next"}"#);
        let json = serde_json::to_string(&QueryStatus::Ready).unwrap();
        assert_eq!(json, r#"{"state":"ready"}"#);
    }
}
