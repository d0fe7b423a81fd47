//! Error types for the image cache

use blob_store::{BlobStoreError, CacheKey};
use std::fmt;
use url_fetcher::FetchError;

#[derive(Debug)]
pub enum CacheError {
    /// Missing or empty URL
    InvalidArgument(String),
    /// URL string is not an absolute URL
    MalformedInput { input: String, reason: String },
    /// The network fetch failed; nothing was written for this URL
    FetchFailed { url: String, source: FetchError },
    /// Blob absent from the store
    NotFound(CacheKey),
    Io(Box<std::io::Error>),
    Config(String),
}

impl CacheError {
    /// True when the resource could not be retrieved, as opposed to a bad request
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, CacheError::FetchFailed { .. })
    }

    /// True for argument errors raised before any I/O
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidArgument(_) | CacheError::MalformedInput { .. }
        )
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CacheError::MalformedInput { input, reason } => {
                write!(f, "Malformed URL {:?}: {}", input, reason)
            }
            CacheError::FetchFailed { url, source } => {
                write!(f, "Failed to fetch {}: {}", url, source)
            }
            CacheError::NotFound(key) => write!(f, "Not found in cache: {}", key),
            CacheError::Io(err) => write!(f, "IO error: {}", err),
            CacheError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::FetchFailed { source, .. } => Some(source),
            CacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<BlobStoreError> for CacheError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::InvalidArgument(msg) => CacheError::InvalidArgument(msg),
            BlobStoreError::MalformedInput { input, reason } => {
                CacheError::MalformedInput { input, reason }
            }
            BlobStoreError::NotFound(key) => CacheError::NotFound(key),
            BlobStoreError::Io(err) => CacheError::Io(err),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
