//! Test doubles shared by the unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;
use url_fetcher::{FetchError, Fetcher};

/// In-memory fetcher that counts calls and answers 404 for unknown URLs
#[derive(Default)]
pub(crate) struct MockFetcher {
    resources: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, url: &str, data: &[u8]) -> Self {
        self.insert(url, data);
        self
    }

    pub(crate) fn insert(&self, url: &str, data: &[u8]) {
        let url = Url::parse(url).unwrap();
        self.resources
            .lock()
            .unwrap()
            .insert(url.as_str().to_string(), data.to_vec());
    }

    pub(crate) fn remove(&self, url: &str) {
        let url = Url::parse(url).unwrap();
        self.resources.lock().unwrap().remove(url.as_str());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> url_fetcher::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let found = self.resources.lock().unwrap().get(url.as_str()).cloned();
        found.ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
