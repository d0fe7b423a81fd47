//! Resource fetching over HTTP

use crate::error::{FetchError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Retrieves the full body of a remote resource.
///
/// Implementations fail on non-success responses and never retry.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

#[async_trait::async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// HTTP client for fetching resources
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with no request timeout
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a fetcher whose requests fail after `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(url = %url, "Fetching resource");

        let mut response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Failed to fetch resource");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Content-Length is not trusted; read until the body is exhausted.
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
        }

        debug!(url = %url, size = data.len(), "Fetched resource");
        Ok(data)
    }
}
