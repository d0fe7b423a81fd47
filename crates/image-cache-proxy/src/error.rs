//! Error types for the image cache proxy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use image_cache::CacheError;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ProxyError {
    Cache(CacheError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Cache(err) => write!(f, "Cache error: {}", err),
            ProxyError::Io(err) => write!(f, "IO error: {}", err),
            ProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::Cache(err) => Some(err),
            ProxyError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<CacheError> for ProxyError {
    fn from(err: CacheError) -> Self {
        ProxyError::Cache(err)
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ProxyError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ProxyError::Config(err.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProxyError::Cache(err) if err.is_invalid_input() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ProxyError::Cache(err) if err.is_fetch_failure() => {
                tracing::warn!(error = %err, "Upstream fetch failed");
                (StatusCode::BAD_GATEWAY, "Image could not be fetched".to_string())
            }
            _ => {
                tracing::error!(error = %self, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
