//! CLI configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vitrine_catalog::PageSizes;
use vitrine_fetch::{FetchPolicy, FetcherConfig, RetryPolicy, TimeoutConfig};
use vitrine_query::QueryCachePolicy;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Page sizes.
    #[serde(default)]
    pub paging: PagingConfig,

    /// Fetch behavior.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Cache windows.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Where items come from.
    #[serde(default)]
    pub source: SourceConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text, as JSON for `.json` paths and TOML otherwise.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Page sizes for the fetcher.
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes {
            initial: self.paging.initial,
            subsequent: self.paging.subsequent,
        }
    }

    /// Fetcher settings.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            page_sizes: self.page_sizes(),
            latency_ms: self.fetch.latency_ms,
            max_concurrent: self.fetch.max_concurrent,
        }
    }

    /// Timeout and retry settings for a remote catalog.
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::default()
            .with_timeout(TimeoutConfig::from_total(Duration::from_millis(
                self.fetch.timeout_ms,
            )))
            .with_retry(RetryPolicy::new(self.fetch.max_retries))
    }

    /// Stale and GC windows.
    pub fn cache_policy(&self) -> QueryCachePolicy {
        QueryCachePolicy::default()
            .with_stale_time(Duration::from_millis(self.cache.stale_time_ms))
            .with_gc_time(Duration::from_millis(self.cache.gc_time_ms))
    }

    /// Problems that make the config unusable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.page_sizes().validate() {
            errors.push(format!("paging: {}", e));
        }
        if self.fetch.max_concurrent == Some(0) {
            errors.push("fetch.max_concurrent must be at least 1".to_string());
        }
        if self.fetch.timeout_ms == 0 {
            errors.push("fetch.timeout_ms must be greater than 0".to_string());
        }
        if let Some(ref url) = self.source.remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(format!("source.remote_url '{}' is not an http(s) URL", url));
            }
        }

        errors
    }
}

/// Page size configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items on the first page.
    #[serde(default = "default_initial")]
    pub initial: usize,

    /// Items on each following page.
    #[serde(default = "default_subsequent")]
    pub subsequent: usize,
}

fn default_initial() -> usize {
    PageSizes::default().initial
}

fn default_subsequent() -> usize {
    PageSizes::default().subsequent
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            subsequent: default_subsequent(),
        }
    }
}

/// Fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Simulated latency per page, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Cap on fetches running at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,

    /// Per-attempt timeout for remote catalogs, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after a failed remote request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_latency_ms() -> u64 {
    800
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    1
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            max_concurrent: None,
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age after which cached pages are refetched, in milliseconds.
    #[serde(default = "default_window_ms")]
    pub stale_time_ms: u64,

    /// Retention of unobserved keys, in milliseconds.
    #[serde(default = "default_window_ms")]
    pub gc_time_ms: u64,
}

fn default_window_ms() -> u64 {
    5 * 60 * 1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: default_window_ms(),
            gc_time_ms: default_window_ms(),
        }
    }
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// JSON array of items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,

    /// Base URL of a remote catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

/// Generate a default vitrine.toml config file.
pub fn generate_default_config() -> String {
    r#"# Vitrine listing configuration

[paging]
initial = 6
subsequent = 4

[fetch]
latency_ms = 800
# max_concurrent = 4
timeout_ms = 2000
max_retries = 1

[cache]
stale_time_ms = 300000
gc_time_ms = 300000

[source]
# catalog_path = "catalog.json"
# remote_url = "https://catalog.example.com/api"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_matches_defaults() {
        let config = CliConfig::parse("vitrine.toml", &generate_default_config()).unwrap();
        assert_eq!(config.page_sizes(), PageSizes::default());
        assert_eq!(config.fetch.latency_ms, 800);
        assert_eq!(config.cache_policy(), QueryCachePolicy::default());
        assert!(config.source.remote_url.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = CliConfig::parse("vitrine.toml", "[paging]\ninitial = 10\n").unwrap();
        assert_eq!(config.paging.initial, 10);
        assert_eq!(config.paging.subsequent, 4);
        assert_eq!(config.fetch.max_retries, 1);
    }

    #[test]
    fn test_json_config() {
        let config = CliConfig::parse(
            "vitrine.json",
            r#"{"fetch": {"latency_ms": 0, "max_concurrent": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.fetcher_config().latency_ms, 0);
        assert_eq!(config.fetcher_config().max_concurrent, Some(2));
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = CliConfig::default();
        config.paging.subsequent = 0;
        config.source.remote_url = Some("ftp://catalog".to_string());

        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("paging:"));
    }
}
