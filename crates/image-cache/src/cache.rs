//! Fetch-or-serve resolution

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::index::Index;
use crate::types::CacheStats;
use blob_store::{parse_absolute_url, BlobMeta, BlobStore, BlobStoreError, CacheKey};
use chrono::Utc;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;
use url_fetcher::{Fetcher, HttpFetcher};

/// Bytes returned by a resolution, with whether they came from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub data: Vec<u8>,
    pub from_cache: bool,
}

/// A disk cache for remote resources addressed by URL.
///
/// Owns the cache root, the in-memory [`Index`] and the [`Fetcher`]. Every
/// resolution checks the blob store directly; the index is never trusted on
/// its own. Concurrent misses for the same URL may both fetch, but writes are
/// write-once so the blob on disk converges.
pub struct ImageCache<F> {
    fetcher: F,
    store: RwLock<BlobStore>,
    index: Mutex<Index>,
    expiry: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetch_failures: AtomicU64,
}

impl ImageCache<HttpFetcher> {
    /// Build a cache that fetches over HTTP, honoring the configured timeout
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout(config.fetch_timeout)
            .map_err(|e| CacheError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: Fetcher> ImageCache<F> {
    pub fn new(fetcher: F, config: CacheConfig) -> Self {
        info!(
            cache_root = ?config.cache_root,
            expiry_secs = config.expiry.map(|d| d.as_secs()),
            "Image cache configured"
        );

        Self {
            fetcher,
            store: RwLock::new(BlobStore::new(config.cache_root)),
            index: Mutex::new(Index::new()),
            expiry: config.expiry,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
        }
    }

    pub async fn cache_root(&self) -> PathBuf {
        self.store.read().await.root().to_path_buf()
    }

    /// Point all subsequent operations at a new root. Files already written
    /// under the old root stay where they are.
    pub async fn set_cache_root(&self, root: impl Into<PathBuf>) {
        let root = root.into();
        info!(cache_root = ?root, "Cache root changed");
        *self.store.write().await = BlobStore::new(root);
    }

    /// Snapshot of the current store; the root may change between calls.
    pub(crate) async fn store(&self) -> BlobStore {
        self.store.read().await.clone()
    }

    /// Return the bytes for `url`, fetching and caching them on a miss
    pub async fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.resolve_with_status(url).await?.data)
    }

    pub async fn resolve_url(&self, url: &Url) -> Result<Vec<u8>> {
        Ok(self.resolve_parsed(url).await?.data)
    }

    /// Like [`ImageCache::resolve`], also reporting whether it was a cache hit
    pub async fn resolve_with_status(&self, url: &str) -> Result<Resolved> {
        let url = parse_absolute_url(url)?;
        self.resolve_parsed(&url).await
    }

    /// Resolve into a single-use in-memory reader
    pub async fn resolve_stream(&self, url: &str) -> Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(self.resolve(url).await?))
    }

    /// Resolve once and return a factory of fresh readers over the same
    /// buffer. Opening a reader never touches disk or network.
    pub async fn resolve_reopenable(
        &self,
        url: &str,
    ) -> Result<impl Fn() -> Cursor<Arc<[u8]>> + Clone + Send + Sync + 'static> {
        let buffer: Arc<[u8]> = Arc::from(self.resolve(url).await?);
        Ok(move || Cursor::new(Arc::clone(&buffer)))
    }

    /// Length of the resource. Performs a full resolution.
    pub async fn byte_count(&self, url: &str) -> Result<u64> {
        Ok(self.resolve(url).await?.len() as u64)
    }

    /// Make sure `url` is on disk and tracked, without returning its bytes
    pub async fn keep(&self, url: &str) -> Result<()> {
        let url = parse_absolute_url(url)?;
        self.keep_url(&url).await
    }

    pub(crate) async fn keep_url(&self, url: &Url) -> Result<()> {
        let key = CacheKey::for_url(url);
        let store = self.store().await;
        match store.stat(&key).await? {
            Some(meta) if !self.is_expired(&meta) => {
                self.track(url).await;
                Ok(())
            }
            stale => {
                self.fetch_and_store(&store, url, &key, stale.is_some())
                    .await?;
                Ok(())
            }
        }
    }

    async fn resolve_parsed(&self, url: &Url) -> Result<Resolved> {
        let key = CacheKey::for_url(url);
        let store = self.store().await;

        let stale = match store.stat(&key).await? {
            Some(meta) if self.is_expired(&meta) => {
                debug!(key = %key, url = %url, "Cache entry expired");
                true
            }
            Some(_) => match store.read(&key).await {
                Ok(data) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, url = %url, size = data.len(), "Cache hit");
                    self.track(url).await;
                    return Ok(Resolved {
                        data,
                        from_cache: true,
                    });
                }
                Err(BlobStoreError::NotFound(_)) => {
                    warn!(key = %key, "Blob vanished before read, refetching");
                    false
                }
                Err(e) => return Err(e.into()),
            },
            None => false,
        };

        let data = self.fetch_and_store(&store, url, &key, stale).await?;
        Ok(Resolved {
            data,
            from_cache: false,
        })
    }

    /// Fetch `url` and persist it. On failure nothing is written and a stale
    /// blob, if any, is left in place.
    async fn fetch_and_store(
        &self,
        store: &BlobStore,
        url: &Url,
        key: &CacheKey,
        replace_stale: bool,
    ) -> Result<Vec<u8>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, url = %url, "Cache miss");

        let data = match self.fetcher.fetch(url).await {
            Ok(data) => data,
            Err(source) => {
                self.fetch_failures.fetch_add(1, Ordering::Relaxed);
                warn!(url = %url, error = %source, "Fetch failed");
                return Err(CacheError::FetchFailed {
                    url: url.to_string(),
                    source,
                });
            }
        };

        if replace_stale {
            store.replace(key, &data).await?;
        } else {
            store.write(key, &data).await?;
        }
        self.track(url).await;

        Ok(data)
    }

    fn is_expired(&self, meta: &BlobMeta) -> bool {
        let Some(expiry) = self.expiry else {
            return false;
        };
        let age = (Utc::now() - meta.modified).to_std().unwrap_or_default();
        age > expiry
    }

    async fn track(&self, url: &Url) {
        if self.index.lock().await.add(url) {
            debug!(url = %url, "Tracking URL");
        }
    }

    /// Whether `url` is in the in-memory index. Says nothing about disk.
    pub async fn contains(&self, url: &str) -> Result<bool> {
        let url = parse_absolute_url(url)?;
        Ok(self.index.lock().await.contains(&url))
    }

    /// Number of entries in the in-memory index
    pub async fn count(&self) -> usize {
        self.index.lock().await.count()
    }

    /// Forget tracked URLs without touching disk. Later resolutions still hit
    /// the blobs already written.
    pub async fn clear(&self) {
        self.index.lock().await.clear();
        debug!("Cleared URL index");
    }

    pub async fn tracked_urls(&self) -> Vec<String> {
        self.index.lock().await.urls().map(str::to_string).collect()
    }

    /// Resynchronize the index with the blobs on disk. Returns the new count.
    pub async fn rebuild_index(&self) -> Result<usize> {
        let keys = self.store().await.list().await?;
        Ok(self.resync_index(keys).await)
    }

    pub(crate) async fn resync_index(&self, keys: Vec<CacheKey>) -> usize {
        let count = self.index.lock().await.rebuild(keys);
        debug!(count, "Rebuilt URL index from disk");
        count
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            tracked: self.count().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
        }
    }
}
