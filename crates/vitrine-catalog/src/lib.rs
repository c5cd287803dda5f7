//! Marketplace catalog types for Vitrine.
//!
//! This crate provides the data model shared by the fetch and query layers:
//!
//! - **Items**: listings with price, discount and an embedded seller summary
//! - **Query keys**: the logical views of the catalog (all, category,
//!   discounted, search) and their filter predicates
//! - **Pagination**: cursors, page sizes, offset/limit windows and result pages
//!
//! # Example
//!
//! ```rust
//! use vitrine_catalog::prelude::*;
//!
//! let catalog = vitrine_catalog::seed::demo_catalog();
//! let key = QueryKey::category("Chaussures");
//!
//! let sizes = PageSizes::default();
//! let window = sizes.window(None);
//! let candidates = key.candidates(&catalog);
//! let page = ResultPage::from_window(
//!     window.slice(&candidates).iter().map(|item| (*item).clone()).collect(),
//!     window,
//!     candidates.len(),
//!     None,
//! );
//!
//! assert_eq!(page.len(), 2);
//! assert!(!page.has_more());
//! ```

pub mod error;
pub mod ids;
pub mod item;
pub mod money;
pub mod page;
pub mod query;
pub mod seed;

pub use error::CatalogError;
pub use ids::{ItemId, SellerId};
pub use item::{Item, SellerSummary};
pub use money::{Currency, Money};
pub use page::{Cursor, PageSizes, PageWindow, ResultPage};
pub use query::{CollectionKind, QueryKey};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::ids::{ItemId, SellerId};
    pub use crate::item::{Item, SellerSummary};
    pub use crate::money::{Currency, Money};
    pub use crate::page::{Cursor, PageSizes, PageWindow, ResultPage};
    pub use crate::query::{CollectionKind, QueryKey};
}
