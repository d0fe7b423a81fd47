//! Bulk operations over the whole cache root

use crate::cache::ImageCache;
use crate::error::Result;
use crate::types::{CacheReport, PurgeOutcome, RestoreSummary, SaveSummary};
use tracing::{info, warn};
use url::Url;
use url_fetcher::Fetcher;

impl<F: Fetcher> ImageCache<F> {
    /// Delete every blob and then the cache root itself. Anything else found
    /// under the root, subdirectories included, is removed with it.
    ///
    /// Tracked URLs stay in the index, so [`ImageCache::save`] can write them
    /// back afterwards. A missing root is reported, not treated as an error.
    pub async fn purge(&self) -> Result<PurgeOutcome> {
        let store = self.store().await;
        let root = store.root().to_path_buf();

        match store.delete_all().await? {
            Some(removed) => {
                info!(cache_root = ?root, removed, "Image cache purged");
                Ok(PurgeOutcome::Purged { root, removed })
            }
            None => {
                info!(cache_root = ?root, "Nothing to purge");
                Ok(PurgeOutcome::NotPresent { root })
            }
        }
    }

    /// Ensure the cache root exists and resynchronize the index with it.
    ///
    /// Filenames are one-way digests, so files not already tracked are
    /// restored as a count only.
    pub async fn restore(&self) -> Result<RestoreSummary> {
        let store = self.store().await;
        store.ensure_root().await?;

        let keys = store.list().await?;
        let items = keys.len();
        self.resync_index(keys).await;

        info!(cache_root = ?store.root(), items, "Image cache restored");
        Ok(RestoreSummary { items })
    }

    /// Count blobs on disk and sum their sizes
    pub async fn report(&self) -> Result<CacheReport> {
        let usage = self.store().await.usage().await?;
        Ok(CacheReport {
            items: usage.blobs,
            total_size: usage.total_size,
        })
    }

    /// Write every tracked URL to disk. Blobs already present are untouched.
    ///
    /// Fetch failures are counted and skipped; filesystem errors abort.
    pub async fn save(&self) -> Result<SaveSummary> {
        let mut summary = SaveSummary {
            saved: 0,
            failed: 0,
        };

        for tracked in self.tracked_urls().await {
            let url = match Url::parse(&tracked) {
                Ok(url) => url,
                Err(e) => {
                    warn!(url = %tracked, error = %e, "Tracked URL no longer parses");
                    summary.failed += 1;
                    continue;
                }
            };

            match self.keep_url(&url).await {
                Ok(()) => summary.saved += 1,
                Err(e) if e.is_fetch_failure() => {
                    warn!(url = %url, error = %e, "Could not save tracked URL");
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(saved = summary.saved, failed = summary.failed, "Tracked URLs saved");
        Ok(summary)
    }
}
