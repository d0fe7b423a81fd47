//! Flat-directory blob storage

use crate::error::{BlobStoreError, Result};
use crate::key::CacheKey;
use crate::types::{BlobMeta, DiskUsage};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Reads, writes and deletes blobs stored as `<root>/<key>`.
///
/// Every operation except [`BlobStore::delete_all`] creates the root directory
/// when it is missing, so callers never need a separate init step.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.filename())
    }

    /// Create the root directory if it does not exist
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &CacheKey) -> Result<bool> {
        self.ensure_root().await?;
        Ok(fs::try_exists(self.path_for(key)).await?)
    }

    /// Read a blob, failing with `NotFound` if it is absent
    pub async fn read(&self, key: &CacheKey) -> Result<Vec<u8>> {
        self.ensure_root().await?;
        match fs::read(self.path_for(key)).await {
            Ok(data) => {
                debug!(key = %key, size = data.len(), "Read blob");
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobStoreError::NotFound(*key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a blob unless one already exists for `key`.
    ///
    /// Returns `true` when this call created the blob. Existing content is never
    /// refreshed by a later call. Write-once is best-effort between concurrent
    /// writers: the re-check before the rename narrows the race, but two writers
    /// that both pass it will both rename, and the last one in wins.
    pub async fn write(&self, key: &CacheKey, data: &[u8]) -> Result<bool> {
        self.ensure_root().await?;
        let path = self.path_for(key);

        if fs::try_exists(&path).await? {
            debug!(key = %key, "Blob already present, skipping write");
            return Ok(false);
        }

        let tmp = self.write_temp(key, data).await?;

        if fs::try_exists(&path).await? {
            let _ = fs::remove_file(&tmp).await;
            debug!(key = %key, "Lost write race, discarded temp blob");
            return Ok(false);
        }

        fs::rename(&tmp, &path).await?;
        debug!(key = %key, size = data.len(), "Stored blob");
        Ok(true)
    }

    /// Atomically replace a blob, creating it if absent
    pub async fn replace(&self, key: &CacheKey, data: &[u8]) -> Result<()> {
        self.ensure_root().await?;
        let tmp = self.write_temp(key, data).await?;
        fs::rename(&tmp, self.path_for(key)).await?;
        debug!(key = %key, size = data.len(), "Replaced blob");
        Ok(())
    }

    async fn write_temp(&self, key: &CacheKey, data: &[u8]) -> Result<PathBuf> {
        let tmp = self
            .root
            .join(format!("{}.tmp-{}", key.filename(), Uuid::new_v4().simple()));

        let mut file = fs::File::create(&tmp).await?;
        if let Err(e) = write_all_and_sync(&mut file, data).await {
            drop(file);
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(tmp)
    }

    /// Size and modification time of a blob, or `None` if absent
    pub async fn stat(&self, key: &CacheKey) -> Result<Option<BlobMeta>> {
        self.ensure_root().await?;
        let path = self.path_for(key);
        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(BlobMeta {
            path,
            size: metadata.len(),
            modified: DateTime::<Utc>::from(metadata.modified()?),
        }))
    }

    /// Delete one blob. Returns `false` if there was nothing to delete.
    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(key = %key, "Deleted blob");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every entry under the root, then the root directory itself.
    /// Subdirectories are removed recursively.
    ///
    /// Returns `None` when the root did not exist, otherwise the number of
    /// files removed directly under the root.
    pub async fn delete_all(&self) -> Result<Option<usize>> {
        if !fs::try_exists(&self.root).await? {
            return Ok(None);
        }

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                debug!(dir = ?entry.path(), "Removing foreign directory");
                fs::remove_dir_all(entry.path()).await?;
            } else {
                fs::remove_file(entry.path()).await?;
                if file_type.is_file() {
                    removed += 1;
                }
            }
        }

        fs::remove_dir(&self.root).await?;
        info!(root = ?self.root, removed, "Deleted all blobs");
        Ok(Some(removed))
    }

    /// Keys of every blob under the root. Files that are not named like a
    /// key (temp files, foreign files) are skipped.
    pub async fn list(&self) -> Result<Vec<CacheKey>> {
        self.ensure_root().await?;

        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(str::parse::<CacheKey>) {
                Some(Ok(key)) => keys.push(key),
                _ => debug!(file = ?name, "Skipping non-blob file"),
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Count blobs and sum their sizes
    pub async fn usage(&self) -> Result<DiskUsage> {
        let mut usage = DiskUsage::default();
        for key in self.list().await? {
            match fs::metadata(self.path_for(&key)).await {
                Ok(m) => {
                    usage.blobs += 1;
                    usage.total_size += m.len();
                }
                // Removed between listing and stat
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(key = %key, "Blob vanished while measuring usage");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(usage)
    }
}

async fn write_all_and_sync(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}
