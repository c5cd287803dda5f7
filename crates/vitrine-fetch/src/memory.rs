//! In-memory catalog source.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use vitrine_catalog::{seed, Item, PageWindow, QueryKey};

use crate::error::FetchError;
use crate::source::{CatalogSource, CatalogWindow};

/// Catalog held in memory, filtered and sliced per request.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    items: Arc<Vec<Item>>,
}

impl InMemoryCatalog {
    /// Create a catalog over the given items, in order.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    /// The built-in demo catalog.
    pub fn demo() -> Self {
        Self::new(seed::demo_catalog())
    }

    /// Load a JSON array of items from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        Ok(Self::new(seed::load_items_json(path)?))
    }

    /// Every item, in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_window(
        &self,
        key: &QueryKey,
        window: PageWindow,
    ) -> Result<CatalogWindow, FetchError> {
        let candidates = key.candidates(&self.items);
        let items = window
            .slice(&candidates)
            .iter()
            .map(|item| (*item).clone())
            .collect();

        Ok(CatalogWindow {
            items,
            total: candidates.len(),
        })
    }
}
