//! Per-key cache entry.
//!
//! The entry mutex guards only plain state and is never held across an
//! `.await`. Every mutation publishes a fresh `QuerySnapshot` to observers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::time::Instant;
use vitrine_catalog::{Cursor, Item, QueryKey, ResultPage};
use vitrine_fetch::FetchError;

use crate::policy::QueryCachePolicy;
use crate::state::{PageKind, QuerySnapshot, QueryStatus, SkipReason};

#[derive(Debug)]
struct EntryState {
    items: Arc<Vec<Item>>,
    next_cursor: Option<Cursor>,
    pages_loaded: u32,
    total: Option<usize>,
    status: QueryStatus,
    /// Status to fall back to when an in-flight fetch is abandoned.
    settled: QueryStatus,
    error: Option<String>,
    generation: u64,
    in_flight: bool,
    observers: usize,
    updated_at: Option<Instant>,
    inactive_since: Option<Instant>,
}

impl EntryState {
    fn new(now: Instant) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            next_cursor: None,
            pages_loaded: 0,
            total: None,
            status: QueryStatus::Idle,
            settled: QueryStatus::Idle,
            error: None,
            generation: 0,
            in_flight: false,
            observers: 0,
            updated_at: None,
            inactive_since: Some(now),
        }
    }

    fn exhausted(&self) -> bool {
        self.pages_loaded > 0 && self.next_cursor.is_none()
    }

    /// Drop accumulated pages and orphan any pending fetch.
    fn reset(&mut self) {
        self.generation += 1;
        self.items = Arc::new(Vec::new());
        self.next_cursor = None;
        self.pages_loaded = 0;
        self.total = None;
        self.status = QueryStatus::Idle;
        self.settled = QueryStatus::Idle;
        self.error = None;
        self.in_flight = false;
        self.updated_at = None;
    }

    fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        QuerySnapshot {
            key: key.clone(),
            items: Arc::clone(&self.items),
            status: self.status,
            error: self.error.clone(),
            has_more: !self.exhausted(),
            pages_loaded: self.pages_loaded,
            next_cursor: self.next_cursor,
            total: self.total,
        }
    }
}

/// Cached state of one query key.
#[derive(Debug)]
pub(crate) struct QueryEntry {
    key: QueryKey,
    state: Mutex<EntryState>,
    tx: watch::Sender<QuerySnapshot>,
}

/// What happened to a completed fetch.
#[derive(Debug)]
pub(crate) enum Completion {
    Appended { count: usize, has_more: bool },
    Failed(FetchError),
    Discarded,
}

/// Claim on a key's single in-flight slot.
///
/// Dropping a ticket without completing it (the fetching task was
/// cancelled) releases the slot so the key does not stay loading forever.
#[derive(Debug)]
pub(crate) struct FetchTicket<'a> {
    entry: &'a QueryEntry,
    generation: u64,
    cursor: Option<Cursor>,
    completed: bool,
}

impl FetchTicket<'_> {
    pub(crate) fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Apply a fetch result if the key has not moved on since the ticket
    /// was issued.
    pub(crate) fn complete(mut self, result: Result<ResultPage, FetchError>) -> Completion {
        self.completed = true;
        let entry = self.entry;
        let mut state = entry.lock();

        if state.generation != self.generation {
            return Completion::Discarded;
        }
        state.in_flight = false;

        let completion = match result {
            Ok(page) => {
                let has_more = page.has_more();
                let total = page.total();
                let next_cursor = page.next_cursor();
                let items = page.into_items();
                let count = items.len();

                Arc::make_mut(&mut state.items).extend(items);
                state.next_cursor = next_cursor;
                state.pages_loaded += 1;
                state.total = Some(total);
                state.status = QueryStatus::Ready;
                state.updated_at = Some(Instant::now());
                Completion::Appended { count, has_more }
            }
            Err(err) => {
                state.status = QueryStatus::Error;
                state.error = Some(err.to_string());
                Completion::Failed(err)
            }
        };
        state.settled = state.status;

        entry.publish(&state);
        completion
    }
}

impl Drop for FetchTicket<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut state = self.entry.lock();
        if state.generation == self.generation && state.in_flight {
            state.in_flight = false;
            state.status = state.settled;
            self.entry.publish(&state);
        }
    }
}

impl QueryEntry {
    pub(crate) fn new(key: QueryKey) -> Self {
        let (tx, _) = watch::channel(QuerySnapshot::empty(key.clone()));
        Self {
            key,
            state: Mutex::new(EntryState::new(Instant::now())),
            tx,
        }
    }

    /// Key this entry caches.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest published state.
    pub fn snapshot(&self) -> QuerySnapshot {
        self.tx.borrow().clone()
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &EntryState) {
        self.tx.send_replace(state.snapshot(&self.key));
    }

    /// Claim the in-flight slot for the next page.
    ///
    /// With `fresh`, accumulated pages are dropped first and any pending
    /// fetch is orphaned, so the claim always succeeds.
    pub(crate) fn begin(&self, fresh: bool) -> Result<FetchTicket<'_>, SkipReason> {
        let mut state = self.lock();
        if fresh {
            state.reset();
        }
        if state.in_flight {
            return Err(SkipReason::InFlight);
        }
        if state.exhausted() {
            return Err(SkipReason::Exhausted);
        }

        let page = if state.pages_loaded == 0 {
            PageKind::First
        } else {
            PageKind::Next
        };
        state.in_flight = true;
        state.status = QueryStatus::Loading(page);
        state.error = None;
        self.publish(&state);

        Ok(FetchTicket {
            entry: self,
            generation: state.generation,
            cursor: state.next_cursor,
            completed: false,
        })
    }

    /// Register a consumer. An unobserved entry whose data is older than
    /// the stale window restarts from scratch. Returns true if it was reset.
    pub(crate) fn attach(&self, policy: &QueryCachePolicy, now: Instant) -> bool {
        let mut state = self.lock();
        let was_unobserved = state.observers == 0;
        state.observers += 1;
        state.inactive_since = None;

        let stale = state
            .updated_at
            .is_some_and(|at| policy.is_stale(now.saturating_duration_since(at)));
        if was_unobserved && stale && !state.in_flight {
            state.reset();
            self.publish(&state);
            return true;
        }
        false
    }

    /// Unregister a consumer. When the last one leaves, any pending fetch
    /// is orphaned and the entry becomes eligible for eviction. Returns
    /// true if the entry is now unobserved.
    pub(crate) fn detach(&self, now: Instant) -> bool {
        let mut state = self.lock();
        state.observers = state.observers.saturating_sub(1);
        if state.observers > 0 {
            return false;
        }

        state.generation += 1;
        if state.in_flight {
            state.in_flight = false;
            state.status = state.settled;
            self.publish(&state);
        }
        state.inactive_since = Some(now);
        true
    }

    /// Check if the entry has been unobserved for at least the GC window.
    pub(crate) fn is_collectable(&self, policy: &QueryCachePolicy, now: Instant) -> bool {
        let state = self.lock();
        state.observers == 0
            && state
                .inactive_since
                .is_some_and(|since| policy.is_expired(now.saturating_duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_catalog::seed::demo_catalog;
    use vitrine_catalog::PageWindow;

    fn first_page() -> ResultPage {
        let items = demo_catalog();
        let window = PageWindow { offset: 0, limit: 6 };
        ResultPage::from_window(window.slice(&items).to_vec(), window, items.len(), None)
    }

    #[tokio::test]
    async fn test_second_begin_is_skipped_while_in_flight() {
        let entry = QueryEntry::new(QueryKey::All);
        let ticket = entry.begin(false).unwrap();

        assert_eq!(entry.begin(false).unwrap_err(), SkipReason::InFlight);
        assert_eq!(entry.snapshot().status, QueryStatus::Loading(PageKind::First));

        ticket.complete(Ok(first_page()));
        let snapshot = entry.snapshot();
        assert_eq!(snapshot.status, QueryStatus::Ready);
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.next_cursor, Some(Cursor::new(1)));
    }

    #[tokio::test]
    async fn test_fresh_begin_orphans_pending_ticket() {
        let entry = QueryEntry::new(QueryKey::All);
        let stale = entry.begin(false).unwrap();
        let fresh = entry.begin(true).unwrap();

        assert!(matches!(stale.complete(Ok(first_page())), Completion::Discarded));
        assert!(entry.snapshot().is_empty());

        assert!(matches!(fresh.complete(Ok(first_page())), Completion::Appended { count: 6, has_more: true }));
    }

    #[tokio::test]
    async fn test_failure_keeps_items_and_cursor() {
        let entry = QueryEntry::new(QueryKey::All);
        entry.begin(false).unwrap().complete(Ok(first_page()));

        let ticket = entry.begin(false).unwrap();
        assert_eq!(ticket.cursor(), Some(Cursor::new(1)));
        let completion = ticket.complete(Err(FetchError::Unavailable("offline".into())));
        assert!(matches!(completion, Completion::Failed(_)));

        let snapshot = entry.snapshot();
        assert_eq!(snapshot.status, QueryStatus::Error);
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.next_cursor, Some(Cursor::new(1)));
        assert!(snapshot.error.is_some());

        let retry = entry.begin(false).unwrap();
        assert_eq!(retry.cursor(), Some(Cursor::new(1)));
        assert!(entry.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_dropped_ticket_releases_slot() {
        let entry = QueryEntry::new(QueryKey::All);
        drop(entry.begin(false).unwrap());

        assert_eq!(entry.snapshot().status, QueryStatus::Idle);
        assert!(entry.begin(false).is_ok());
    }

    #[tokio::test]
    async fn test_last_detach_orphans_fetch() {
        let entry = QueryEntry::new(QueryKey::All);
        let policy = QueryCachePolicy::default();
        entry.attach(&policy, Instant::now());
        let ticket = entry.begin(false).unwrap();

        assert!(entry.detach(Instant::now()));
        assert_eq!(entry.snapshot().status, QueryStatus::Idle);
        assert!(matches!(ticket.complete(Ok(first_page())), Completion::Discarded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_resets_on_attach() {
        let entry = QueryEntry::new(QueryKey::All);
        let policy = QueryCachePolicy::default().with_stale_time(std::time::Duration::from_secs(60));
        entry.attach(&policy, Instant::now());
        entry.begin(false).unwrap().complete(Ok(first_page()));
        entry.detach(Instant::now());

        assert!(!entry.attach(&policy, Instant::now()));
        assert_eq!(entry.snapshot().len(), 6);
        entry.detach(Instant::now());

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(entry.attach(&policy, Instant::now()));
        assert!(entry.snapshot().is_empty());
    }
}
