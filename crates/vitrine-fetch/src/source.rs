//! Backing catalog boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vitrine_catalog::{Item, PageWindow, QueryKey};

use crate::error::FetchError;

/// One offset/limit window of a query's candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogWindow {
    /// Items inside the window, in candidate order.
    pub items: Vec<Item>,
    /// Size of the whole candidate set.
    pub total: usize,
}

/// A catalog that can serve windows of a filtered view.
///
/// In-memory sources filter and slice locally; remote sources pass the key
/// and window as request parameters.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the items of `key`'s candidate set that fall inside `window`.
    async fn fetch_window(&self, key: &QueryKey, window: PageWindow)
        -> Result<CatalogWindow, FetchError>;
}
