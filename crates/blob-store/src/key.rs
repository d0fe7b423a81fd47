//! URL to cache-key derivation

use crate::error::{BlobStoreError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Opaque 128-bit identifier for a cached URL, used verbatim as the blob filename.
///
/// The key is the first 16 bytes of SHA-256 over the normalized absolute URL,
/// laid out as a UUID in little-endian field order. The derivation is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Uuid);

impl CacheKey {
    /// Parse `url` as an absolute URL and derive its key
    pub fn derive(url: &str) -> Result<Self> {
        let url = parse_absolute_url(url)?;
        Ok(Self::for_url(&url))
    }

    /// Derive the key for an already-parsed URL
    pub fn for_url(url: &Url) -> Self {
        // Sha256::digest allocates a fresh hasher per call, so concurrent
        // derivations never share state.
        let digest = Sha256::digest(url.as_str().as_bytes());
        let mut seed = [0u8; 16];
        seed.copy_from_slice(&digest[..16]);
        Self(Uuid::from_bytes_le(seed))
    }

    /// Canonical hyphenated form, e.g. `11250d6b-4460-eda2-bfea-9022169a5e88`
    pub fn filename(&self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CacheKey {
    type Err = BlobStoreError;

    /// Only the canonical lowercase hyphenated form is accepted, so stray
    /// files (temp files, other UUID spellings) never parse as keys.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: &str| BlobStoreError::MalformedInput {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let uuid = Uuid::parse_str(s).map_err(|e| malformed(&e.to_string()))?;
        let key = Self(uuid);
        if key.filename() != s {
            return Err(malformed("not a canonical cache key"));
        }
        Ok(key)
    }
}

/// Parse a URL string that must be absolute (`scheme://...`).
///
/// Empty or whitespace-only input is `InvalidArgument`. Anything the URL
/// parser rejects, or that lacks the `://` separator after the scheme, is
/// `MalformedInput`.
pub fn parse_absolute_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BlobStoreError::InvalidArgument(
            "url must not be empty".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| BlobStoreError::MalformedInput {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    // The WHATWG parser repairs `https:/host`; treat that as malformed.
    let has_separator = trimmed
        .get(url.scheme().len()..)
        .map(|rest| rest.starts_with("://"))
        .unwrap_or(false);
    if !has_separator {
        return Err(BlobStoreError::MalformedInput {
            input: trimmed.to_string(),
            reason: "missing '://' after scheme".to_string(),
        });
    }

    Ok(url)
}
