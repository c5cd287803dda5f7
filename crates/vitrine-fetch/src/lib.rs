//! Paginated catalog fetching for Vitrine.
//!
//! This crate provides:
//! - `CatalogSource` - Backing catalog boundary (in-memory or remote)
//! - `PaginatedCatalogFetcher` - One page per (query key, cursor)
//! - `FetchPolicy` - Timeout and retry configuration for remote sources
//! - `FetchError` - Fetch failures

mod error;
mod fetcher;
mod memory;
mod remote;
mod retry;
mod source;
mod timeout;

pub use error::*;
pub use fetcher::*;
pub use memory::*;
pub use remote::*;
pub use retry::*;
pub use source::*;
pub use timeout::*;
