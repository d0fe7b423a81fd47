//! Core types for the image cache proxy

use image_cache::{CacheConfig, CacheStats};
use serde::{Deserialize, Serialize};

/// Configuration for the proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub cache: CacheConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cache: CacheConfig::default(),
        }
    }
}

/// Query string for `/image`
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

/// Disk usage report
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub items: usize,
    pub total_size: u64,
    pub summary: String,
}

/// Human-readable result of a lifecycle operation
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Guess an image MIME type from magic bytes
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
    ];

    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    for &(magic, mime) in SIGNATURES {
        if data.starts_with(magic) {
            return mime;
        }
    }

    let head = &data[..data.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return "image/svg+xml";
    }

    "application/octet-stream"
}
