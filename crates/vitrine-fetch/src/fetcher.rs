//! Paginated catalog fetcher.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};
use vitrine_catalog::{CatalogError, Cursor, PageSizes, QueryKey, ResultPage};

use crate::error::FetchError;
use crate::memory::InMemoryCatalog;
use crate::source::CatalogSource;

/// Fetcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// First and subsequent page sizes.
    pub page_sizes: PageSizes,
    /// Simulated latency added to every fetch, in milliseconds.
    pub latency_ms: u64,
    /// Cap on fetches running at once across all keys.
    pub max_concurrent: Option<usize>,
}

impl FetcherConfig {
    /// Set page sizes.
    pub fn with_page_sizes(mut self, page_sizes: PageSizes) -> Self {
        self.page_sizes = page_sizes;
        self
    }

    /// Set simulated latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = latency.as_millis() as u64;
        self
    }

    /// Cap the number of concurrent fetches.
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = Some(limit);
        self
    }
}

/// Serves one page of a query key's candidate set per call.
///
/// Each call is independent: simulated latency sleeps on the calling task
/// only, so a slow page for one key never delays another key.
pub struct PaginatedCatalogFetcher {
    source: Arc<dyn CatalogSource>,
    page_sizes: PageSizes,
    latency: Duration,
    limiter: Option<Semaphore>,
}

impl std::fmt::Debug for PaginatedCatalogFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedCatalogFetcher")
            .field("source", &self.source.name())
            .field("page_sizes", &self.page_sizes)
            .field("latency", &self.latency)
            .finish()
    }
}

impl PaginatedCatalogFetcher {
    /// Create a fetcher with default page sizes and no latency.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            page_sizes: PageSizes::default(),
            latency: Duration::ZERO,
            limiter: None,
        }
    }

    /// Create a fetcher from a config, validating page sizes.
    pub fn with_config(
        source: Arc<dyn CatalogSource>,
        config: &FetcherConfig,
    ) -> Result<Self, CatalogError> {
        config.page_sizes.validate()?;
        let mut fetcher = Self::new(source)
            .with_page_sizes(config.page_sizes)
            .with_latency(Duration::from_millis(config.latency_ms));
        if let Some(limit) = config.max_concurrent {
            fetcher = fetcher.with_max_concurrent(limit);
        }
        Ok(fetcher)
    }

    /// Fetcher over the built-in demo catalog.
    pub fn demo() -> Self {
        Self::new(Arc::new(InMemoryCatalog::demo()))
    }

    /// Set page sizes.
    pub fn with_page_sizes(mut self, page_sizes: PageSizes) -> Self {
        self.page_sizes = page_sizes;
        self
    }

    /// Set simulated latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Cap the number of concurrent fetches. A limit of 0 is treated as 1.
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.limiter = Some(Semaphore::new(limit.max(1)));
        self
    }

    /// Page sizes in use.
    pub fn page_sizes(&self) -> PageSizes {
        self.page_sizes
    }

    /// Name of the backing source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch the page at `cursor` for `key`. An absent cursor means the
    /// first page.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn fetch_page(
        &self,
        key: &QueryKey,
        cursor: Option<Cursor>,
    ) -> Result<ResultPage, FetchError> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|_| FetchError::Unavailable("fetch limiter closed".into()))?,
            ),
            None => None,
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let window = self.page_sizes.window(cursor);
        let fetched = self.source.fetch_window(key, window).await?;
        let page = ResultPage::from_window(fetched.items, window, fetched.total, cursor);

        debug!(
            offset = window.offset,
            count = page.len(),
            total = page.total(),
            has_more = page.has_more(),
            "fetched page"
        );
        Ok(page)
    }
}
