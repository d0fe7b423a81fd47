//! Error types for the URL fetcher

use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    /// Transport failure: connection refused, DNS, broken body stream
    Http(Box<reqwest::Error>),
    /// The server answered with a non-success status
    Status { url: String, status: u16 },
    /// The configured fetch timeout elapsed
    Timeout { url: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "HTTP error: {}", err),
            FetchError::Status { url, status } => {
                write!(f, "{} returned status {}", url, status)
            }
            FetchError::Timeout { url } => write!(f, "Timed out fetching {}", url),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return FetchError::Timeout { url };
        }
        FetchError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
