//! Catalog error types.

use thiserror::Error;

/// Errors that can occur when building or loading catalog data.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A page size was configured as zero.
    #[error("Invalid page size: {0} must be at least 1")]
    InvalidPageSize(&'static str),

    /// Failed to read a catalog file.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode catalog JSON.
    #[error("Failed to decode catalog: {0}")]
    Decode(#[from] serde_json::Error),

    /// Two items share the same identifier.
    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    /// An item breaks a pricing rule.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },
}
