//! Summary and statistics types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Format a byte count in the largest binary unit that is at least 1,
/// rounded down: `127934` becomes `124 KiB`.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{} GiB", bytes / GIB)
    } else if bytes >= MIB {
        format!("{} MiB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Runtime counters for an [`ImageCache`](crate::ImageCache)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries in the in-memory index
    pub tracked: usize,
    pub hits: u64,
    pub misses: u64,
    pub fetch_failures: u64,
}

/// Item count and disk usage of the cache root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheReport {
    pub items: usize,
    pub total_size: u64,
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items in cache ({}).",
            self.items,
            format_size(self.total_size)
        )
    }
}

/// Result of purging the cache root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurgeOutcome {
    Purged { root: PathBuf, removed: usize },
    /// The root did not exist; informational, not an error
    NotPresent { root: PathBuf },
}

impl fmt::Display for PurgeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurgeOutcome::Purged { root, .. } => {
                write!(f, "Image cache purged from {}.", root.display())
            }
            PurgeOutcome::NotPresent { root } => write!(f, "{} wasn't there.", root.display()),
        }
    }
}

/// Result of restoring the index from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub items: usize,
}

impl fmt::Display for RestoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items in cache.", self.items)
    }
}

/// Result of re-materializing tracked URLs onto disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub saved: usize,
    pub failed: usize,
}

impl fmt::Display for SaveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed == 0 {
            write!(f, "Tracked URIs saved to cache.")
        } else {
            write!(
                f,
                "Tracked URIs saved to cache ({} of {} failed).",
                self.failed,
                self.saved + self.failed
            )
        }
    }
}
