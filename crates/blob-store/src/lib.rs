//! File-based blob store keyed by URL digests
//!
//! Every blob lives as a single file in a flat directory. The filename is a
//! UUID-shaped key derived from the SHA-256 of the blob's absolute URL, so the
//! same URL always lands on the same file and nothing about the URL is stored
//! on disk.

mod error;
mod key;
mod store;
mod types;

pub use error::{BlobStoreError, Result};
pub use key::{parse_absolute_url, CacheKey};
pub use store::BlobStore;
pub use types::{BlobMeta, DiskUsage};
