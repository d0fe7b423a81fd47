//! Blob store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem metadata for a stored blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobMeta {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Number of blobs under the store root and their combined size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub blobs: usize,
    pub total_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage_default() {
        let usage = DiskUsage::default();
        assert_eq!(usage.blobs, 0);
        assert_eq!(usage.total_size, 0);
    }

    #[test]
    fn test_blob_meta_serialization() {
        let meta = BlobMeta {
            path: PathBuf::from("/cache/11250d6b-4460-eda2-bfea-9022169a5e88"),
            size: 12345,
            modified: Utc::now(),
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("11250d6b"));
        assert!(json.contains("12345"));

        let deserialized: BlobMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.size, meta.size);
        assert_eq!(deserialized.path, meta.path);
    }
}
