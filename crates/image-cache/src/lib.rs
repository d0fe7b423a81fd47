//! Image Cache
//!
//! Fetch-or-serve cache for remote images. The first request for a URL goes to
//! the network and the bytes are written to a deterministic file under the
//! cache root; later requests read that file. An in-memory index tracks which
//! URLs have been cached during this process's lifetime.

mod cache;
mod config;
mod error;
mod index;
mod lifecycle;
mod types;

#[cfg(test)]
mod testing;

pub use cache::{ImageCache, Resolved};
pub use config::{default_cache_root, CacheConfig, DEFAULT_CACHE_SUBFOLDER};
pub use error::{CacheError, Result};
pub use index::Index;
pub use types::{format_size, CacheReport, CacheStats, PurgeOutcome, RestoreSummary, SaveSummary};

pub use blob_store::{BlobStore, CacheKey};
pub use url_fetcher::{FetchError, Fetcher, HttpFetcher};
