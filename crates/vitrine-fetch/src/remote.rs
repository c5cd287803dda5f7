//! HTTP catalog source.
//!
//! Requests `GET {base}/items?kind=..&q=..&offset=..&limit=..` and expects a
//! JSON body of the form `{"items": [...], "total": N}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_catalog::{Item, PageWindow, QueryKey};

use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::source::{CatalogSource, CatalogWindow};
use crate::timeout::TimeoutConfig;

/// Timeout and retry settings for a remote source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    pub timeout: TimeoutConfig,
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    /// Set the timeout configuration.
    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct RemotePage {
    items: Vec<Item>,
    total: usize,
}

/// Catalog served by an HTTP backend.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: Client,
    endpoint: String,
    policy: FetchPolicy,
}

impl RemoteCatalog {
    /// Create a remote source rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>, policy: FetchPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(policy.timeout.connect)
            .timeout(policy.timeout.total)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/items", base_url.as_ref().trim_end_matches('/')),
            policy,
        })
    }

    /// Items endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Active fetch policy.
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    async fn fetch_once(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<RemotePage, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Http {
                status,
                url: self.endpoint.clone(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Deserialization(e.to_string()))
    }

    fn map_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.policy.timeout.total)
        } else if error.is_connect() {
            FetchError::Connection(error.to_string())
        } else if error.is_decode() {
            FetchError::Deserialization(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Query parameters describing a key and window.
fn request_params(key: &QueryKey, window: PageWindow) -> Vec<(&'static str, String)> {
    let mut params = vec![("kind", key.kind().as_str().to_string())];
    if let Some(param) = key.param() {
        params.push(("q", param.to_string()));
    }
    params.push(("offset", window.offset.to_string()));
    params.push(("limit", window.limit.to_string()));
    params
}

#[async_trait]
impl CatalogSource for RemoteCatalog {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch_window(
        &self,
        key: &QueryKey,
        window: PageWindow,
    ) -> Result<CatalogWindow, FetchError> {
        let params = request_params(key, window);
        let limit = self.policy.timeout.total;

        let page = self
            .policy
            .retry
            .run(|attempt| {
                let params = &params;
                async move {
                    debug!(url = %self.endpoint, attempt, "requesting catalog window");
                    match tokio::time::timeout(limit, self.fetch_once(params)).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Timeout(limit)),
                    }
                }
            })
            .await?;

        // Servers may ignore `limit`; never hand back more than the window.
        let mut items = page.items;
        items.truncate(window.limit);

        Ok(CatalogWindow {
            items,
            total: page.total,
        })
    }
}
