//! Error types for the blob store

use crate::key::CacheKey;
use std::fmt;

#[derive(Debug)]
pub enum BlobStoreError {
    /// A required argument was empty
    InvalidArgument(String),
    /// The input could not be parsed as an absolute URL
    MalformedInput { input: String, reason: String },
    NotFound(CacheKey),
    Io(Box<std::io::Error>),
}

impl fmt::Display for BlobStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobStoreError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            BlobStoreError::MalformedInput { input, reason } => {
                write!(f, "Malformed URL {:?}: {}", input, reason)
            }
            BlobStoreError::NotFound(key) => write!(f, "Blob not found: {}", key),
            BlobStoreError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for BlobStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobStoreError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobStoreError {
    fn from(err: std::io::Error) -> Self {
        BlobStoreError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BlobStoreError>;
