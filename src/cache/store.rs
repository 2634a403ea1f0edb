//! Filesystem-backed artifact store
//!
//! Maps a [`CacheKey`] to a file beneath the cache root, optionally
//! mirroring the source file's directory structure. Writes go to a
//! per-writer temporary file first and are renamed into place, so a
//! concurrent reader never observes a partial artifact; concurrent
//! writers of the same key race benignly (identical bytes, last rename
//! wins).

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::key::CacheKey;
use crate::config::Options;
use crate::error::ImageflyError;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persistent store for rendered variants
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    mimic_source_dir: bool,
}

impl CacheStore {
    pub fn new(options: &Options) -> Self {
        Self {
            root: options.cache_dir.clone(),
            mimic_source_dir: options.mimic_source_dir,
        }
    }

    /// Final artifact path for a key.
    ///
    /// With mirroring enabled the source file's parent directory is
    /// appended (relative) beneath the cache root.
    pub fn entry_path(&self, key: &CacheKey, source: &Path) -> PathBuf {
        let mut dir = self.root.clone();
        if self.mimic_source_dir {
            if let Some(parent) = source.parent() {
                let relative = parent
                    .strip_prefix(std::path::MAIN_SEPARATOR_STR)
                    .unwrap_or(parent);
                dir.push(relative);
            }
        }
        dir.join(key.as_str())
    }

    pub async fn exists(&self, key: &CacheKey, source: &Path) -> bool {
        tokio::fs::try_exists(self.entry_path(key, source))
            .await
            .unwrap_or(false)
    }

    pub async fn read(&self, key: &CacheKey, source: &Path) -> Result<Bytes, ImageflyError> {
        let path = self.entry_path(key, source);
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    /// Persist an artifact, creating parent directories as needed.
    pub async fn write(
        &self,
        key: &CacheKey,
        source: &Path,
        data: &[u8],
    ) -> Result<(), ImageflyError> {
        let path = self.entry_path(key, source);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ImageflyError::CacheWriteFailure)?;
        }

        // Write to a per-writer temp file, then atomically rename.
        // The unique name keeps concurrent writers of one key from
        // renaming each other's half-written file.
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let temp_path = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        tokio::fs::write(&temp_path, data)
            .await
            .map_err(ImageflyError::CacheWriteFailure)?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(ImageflyError::CacheWriteFailure)?;

        Ok(())
    }
}
