//! Cache configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Folder created under the platform cache directory
pub const DEFAULT_CACHE_SUBFOLDER: &str = "image-cache";

/// Platform cache directory plus [`DEFAULT_CACHE_SUBFOLDER`], or
/// `./cache/image-cache` on platforms without one
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(DEFAULT_CACHE_SUBFOLDER))
        .unwrap_or_else(|| PathBuf::from("./cache").join(DEFAULT_CACHE_SUBFOLDER))
}

/// Image cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding one file per cached resource. Not validated until used.
    pub cache_root: PathBuf,
    /// Blobs older than this are fetched again. `None` keeps blobs forever.
    pub expiry: Option<Duration>,
    /// Per-request network timeout. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl CacheConfig {
    pub fn with_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from environment variables
    ///
    /// - `IMAGE_CACHE_DIR`: cache root
    /// - `IMAGE_CACHE_EXPIRY_SECS`: blob expiry in seconds
    /// - `IMAGE_CACHE_FETCH_TIMEOUT_SECS`: network timeout in seconds
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |name: &str| {
            lookup(name)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        let cache_root = lookup("IMAGE_CACHE_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_root);

        Self {
            cache_root,
            expiry: secs("IMAGE_CACHE_EXPIRY_SECS"),
            fetch_timeout: secs("IMAGE_CACHE_FETCH_TIMEOUT_SECS"),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            expiry: None,
            fetch_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert!(config.cache_root.ends_with(DEFAULT_CACHE_SUBFOLDER));
        assert_eq!(config.expiry, None);
        assert_eq!(config.fetch_timeout, None);
    }

    #[test]
    fn test_with_root() {
        let config = CacheConfig::with_root("/tmp/images");
        assert_eq!(config.cache_root, PathBuf::from("/tmp/images"));
        assert_eq!(config.expiry, None);
    }

    #[test]
    fn test_from_lookup_all_set() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("IMAGE_CACHE_DIR", "/var/cache/images"),
            ("IMAGE_CACHE_EXPIRY_SECS", "3600"),
            ("IMAGE_CACHE_FETCH_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.cache_root, PathBuf::from("/var/cache/images"));
        assert_eq!(config.expiry, Some(Duration::from_secs(3600)));
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_from_lookup_defaults_and_garbage() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            ("IMAGE_CACHE_DIR", "  "),
            ("IMAGE_CACHE_EXPIRY_SECS", "soon"),
        ]));
        assert_eq!(config.cache_root, default_cache_root());
        assert_eq!(config.expiry, None);
        assert_eq!(config.fetch_timeout, None);
    }
}
