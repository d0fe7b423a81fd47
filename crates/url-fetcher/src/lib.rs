//! URL Fetcher
//!
//! The narrow network contract used by the image cache: given an absolute URL,
//! return the complete response body or fail. Ships an HTTP implementation on
//! top of reqwest.

pub mod error;
pub mod fetcher;

pub use error::{FetchError, Result};
pub use fetcher::{Fetcher, HttpFetcher};
