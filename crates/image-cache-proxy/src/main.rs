//! Image Cache Proxy - serves remote images through the local disk cache
//!
//! The first request for a URL is fetched from the network and written under
//! the cache root; later requests are served from disk.

mod error;
mod server;
mod types;

use crate::error::{ProxyError, Result};
use crate::server::{start_server, ServerState, SharedState};
use crate::types::ProxyConfig;
use image_cache::{CacheConfig, ImageCache};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("image_cache_proxy=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting image cache proxy...");

    let config = load_config();
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache.cache_root);
    match config.cache.expiry {
        Some(expiry) => info!("Cache expiry: {} seconds", expiry.as_secs()),
        None => info!("Cache expiry: never"),
    }

    let cache = ImageCache::from_config(config.cache)?;
    let restored = cache.restore().await?;
    info!("{}", restored);

    let state: SharedState = Arc::new(ServerState::new(cache));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| ProxyError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

fn load_config() -> ProxyConfig {
    let defaults = ProxyConfig::default();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    ProxyConfig {
        port,
        cache: CacheConfig::from_env(),
    }
}
