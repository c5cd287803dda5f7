//! Caching query layer for Vitrine listings.
//!
//! Each normalized `QueryKey` owns one cache entry holding the pages loaded
//! so far. Consumers attach through [`QueryClient::query`] and drive
//! pagination with [`QueryHandle::load_more`]:
//!
//! - at most one fetch is in flight per key; extra calls are skipped;
//! - a failed page leaves loaded items untouched and can be retried;
//! - results arriving after a refetch or detach are discarded.
//!
//! ```no_run
//! use vitrine_catalog::QueryKey;
//! use vitrine_query::QueryClient;
//!
//! # async fn run() -> Result<(), vitrine_query::QueryError> {
//! let client = QueryClient::demo();
//! let sales = client.query(QueryKey::Discounted);
//! while sales.has_more() {
//!     sales.load_more().await?;
//! }
//! println!("{} items on sale", sales.items().len());
//! # Ok(())
//! # }
//! ```

mod client;
mod entry;
mod error;
mod handle;
mod metrics;
mod policy;
mod state;

pub use client::QueryClient;
pub use error::QueryError;
pub use handle::QueryHandle;
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use policy::QueryCachePolicy;
pub use state::{LoadOutcome, PageKind, QuerySnapshot, QueryStatus, SkipReason};
