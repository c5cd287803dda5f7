//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::debug;
use vitrine_fetch::{CatalogSource, InMemoryCatalog, PaginatedCatalogFetcher, RemoteCatalog};
use vitrine_query::QueryClient;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["vitrine.toml", ".vitrine.toml", "vitrine.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration was read from.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Catalog file given on the command line.
    catalog_override: Option<String>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, catalog: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
            catalog_override: catalog.map(str::to_string),
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Build the catalog source: a `--catalog` file, then the configured
    /// file, then the configured remote URL, then the demo catalog.
    pub fn source(&self) -> Result<Arc<dyn CatalogSource>> {
        let file = self
            .catalog_override
            .as_deref()
            .or(self.config.source.catalog_path.as_deref());

        if let Some(file) = file {
            let path = self.resolve_path(file);
            let catalog = InMemoryCatalog::from_json_file(&path)
                .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
            debug!(path = %path.display(), items = catalog.len(), "loaded catalog file");
            return Ok(Arc::new(catalog));
        }

        if let Some(ref url) = self.config.source.remote_url {
            let remote = RemoteCatalog::new(url, self.config.fetch_policy())
                .with_context(|| format!("Failed to create remote catalog: {}", url))?;
            return Ok(Arc::new(remote));
        }

        Ok(Arc::new(InMemoryCatalog::demo()))
    }

    /// Build a query client over the configured source.
    pub fn client(&self) -> Result<QueryClient> {
        let fetcher =
            PaginatedCatalogFetcher::with_config(self.source()?, &self.config.fetcher_config())
                .context("Invalid paging configuration")?;
        self.output.debug(&format!(
            "Source: {}, page sizes {}/{}",
            fetcher.source_name(),
            fetcher.page_sizes().initial,
            fetcher.page_sizes().subsequent
        ));
        Ok(QueryClient::new(fetcher, self.config.cache_policy()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use vitrine_catalog::seed::demo_catalog;
    use vitrine_catalog::{PageWindow, QueryKey};

    use super::*;

    fn context(dir: &Path, config: CliConfig, catalog: Option<&str>) -> Context {
        Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: dir.to_path_buf(),
            catalog_override: catalog.map(str::to_string),
        }
    }

    fn write_catalog(dir: &Path, name: &str, count: usize) {
        let items: Vec<_> = demo_catalog().into_iter().take(count).collect();
        fs::write(dir.join(name), serde_json::to_string(&items).unwrap()).unwrap();
    }

    async fn total(source: &Arc<dyn CatalogSource>) -> usize {
        let window = PageWindow { offset: 0, limit: 10 };
        source.fetch_window(&QueryKey::All, window).await.unwrap().total
    }

    #[tokio::test]
    async fn test_source_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "flag.json", 2);
        write_catalog(dir.path(), "configured.json", 3);

        let mut config = CliConfig::default();
        config.source.catalog_path = Some("configured.json".to_string());
        config.source.remote_url = Some("http://127.0.0.1:9".to_string());

        let ctx = context(dir.path(), config.clone(), Some("flag.json"));
        assert_eq!(total(&ctx.source().unwrap()).await, 2);

        let ctx = context(dir.path(), config.clone(), None);
        let source = ctx.source().unwrap();
        assert_eq!(source.name(), "memory");
        assert_eq!(total(&source).await, 3);

        config.source.catalog_path = None;
        let ctx = context(dir.path(), config.clone(), None);
        assert_eq!(ctx.source().unwrap().name(), "remote");

        config.source.remote_url = None;
        let ctx = context(dir.path(), config, None);
        let source = ctx.source().unwrap();
        assert_eq!(source.name(), "memory");
        assert_eq!(total(&source).await, demo_catalog().len());
    }

    #[test]
    fn test_source_missing_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), CliConfig::default(), Some("missing.json"));

        let err = ctx.source().err().unwrap();
        assert!(err.to_string().contains("Failed to load catalog"));
    }

    #[test]
    fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), CliConfig::default(), None);

        assert_eq!(ctx.resolve_path("items.json"), dir.path().join("items.json"));
        assert_eq!(ctx.resolve_path("/tmp/items.json"), PathBuf::from("/tmp/items.json"));
    }
}
