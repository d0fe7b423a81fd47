//! In-memory index of cached URLs

use blob_store::CacheKey;
use std::collections::{HashMap, HashSet};
use url::Url;

/// URLs believed to be cached, keyed by their normalized absolute form.
///
/// The index is advisory only: lookups always check the blob store, so a stale
/// entry costs at most a refetch. Because keys are one-way digests, rebuilding
/// from disk cannot recover URLs for files it has never seen; those are kept as
/// opaque keys that contribute to [`Index::count`] only.
#[derive(Debug, Default)]
pub struct Index {
    urls: HashMap<String, CacheKey>,
    opaque: HashSet<CacheKey>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `url`. Returns `false` if it was already tracked.
    pub fn add(&mut self, url: &Url) -> bool {
        if self.urls.contains_key(url.as_str()) {
            return false;
        }
        let key = CacheKey::for_url(url);
        self.opaque.remove(&key);
        self.urls.insert(url.as_str().to_string(), key);
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains_key(url.as_str())
    }

    /// Forget every tracked URL and opaque key. Disk is untouched.
    pub fn clear(&mut self) {
        self.urls.clear();
        self.opaque.clear();
    }

    /// Tracked URLs plus opaque keys found on disk
    pub fn count(&self) -> usize {
        self.urls.len() + self.opaque.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Tracked URLs in no particular order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque.len()
    }

    /// Resynchronize with the keys currently on disk.
    ///
    /// URLs whose blob is gone are dropped, URLs whose blob is present are
    /// kept, and every other key becomes an opaque entry. Returns the new count.
    pub fn rebuild(&mut self, on_disk: impl IntoIterator<Item = CacheKey>) -> usize {
        let on_disk: HashSet<CacheKey> = on_disk.into_iter().collect();

        self.urls.retain(|_, key| on_disk.contains(key));
        let known: HashSet<CacheKey> = self.urls.values().copied().collect();
        self.opaque = on_disk.difference(&known).copied().collect();

        self.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_add_and_contains() {
        let mut index = Index::new();
        let logo = url("https://example.com/logo.png");

        assert!(index.is_empty());
        assert!(index.add(&logo));
        assert!(!index.add(&logo));
        assert!(index.contains(&logo));
        assert!(!index.contains(&url("https://example.com/other.png")));
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_contains_uses_normalized_form() {
        let mut index = Index::new();
        index.add(&url("https://EXAMPLE.com"));
        assert!(index.contains(&url("https://example.com/")));
    }

    #[test]
    fn test_clear() {
        let mut index = Index::new();
        index.add(&url("https://example.com/1.png"));
        index.add(&url("https://example.com/2.png"));
        index.rebuild(vec![CacheKey::derive("https://example.com/3.png").unwrap()]);

        index.clear();
        assert_eq!(index.count(), 0);
        assert_eq!(index.urls().count(), 0);
    }

    #[test]
    fn test_rebuild_from_unknown_keys_is_opaque() {
        let mut index = Index::new();
        let keys = vec![
            CacheKey::derive("https://example.com/1.png").unwrap(),
            CacheKey::derive("https://example.com/2.png").unwrap(),
        ];

        assert_eq!(index.rebuild(keys), 2);
        assert_eq!(index.opaque_count(), 2);
        assert_eq!(index.urls().count(), 0);
    }

    #[test]
    fn test_rebuild_keeps_present_and_drops_missing() {
        let mut index = Index::new();
        let present = url("https://example.com/present.png");
        let gone = url("https://example.com/gone.png");
        index.add(&present);
        index.add(&gone);

        let stranger = CacheKey::derive("https://example.com/stranger.png").unwrap();
        let count = index.rebuild(vec![CacheKey::for_url(&present), stranger]);

        assert_eq!(count, 2);
        assert!(index.contains(&present));
        assert!(!index.contains(&gone));
        assert_eq!(index.opaque_count(), 1);
    }

    #[test]
    fn test_add_claims_opaque_key() {
        let mut index = Index::new();
        let logo = url("https://example.com/logo.png");
        index.rebuild(vec![CacheKey::for_url(&logo)]);
        assert_eq!(index.opaque_count(), 1);

        index.add(&logo);
        assert_eq!(index.opaque_count(), 0);
        assert_eq!(index.count(), 1);
    }
}
