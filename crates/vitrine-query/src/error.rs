//! Query layer errors.

use vitrine_catalog::QueryKey;
use vitrine_fetch::FetchError;

/// Errors surfaced to query consumers.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A page fetch failed. Previously loaded pages are kept and the same
    /// page can be retried with `load_more`.
    #[error("Failed to fetch {key}: {source}")]
    FetchFailed {
        key: QueryKey,
        #[source]
        source: FetchError,
    },
}

impl QueryError {
    /// Key whose fetch failed.
    pub fn key(&self) -> &QueryKey {
        match self {
            Self::FetchFailed { key, .. } => key,
        }
    }

    /// Whether retrying the fetch may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::FetchFailed { source, .. } => source.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_key() {
        let err = QueryError::FetchFailed {
            key: QueryKey::Discounted,
            source: FetchError::Unavailable("offline".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch catalog:discounted: Catalog unavailable: offline"
        );
        assert_eq!(err.key(), &QueryKey::Discounted);
        assert!(err.is_retryable());
    }
}
