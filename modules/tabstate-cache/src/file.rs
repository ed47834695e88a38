use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tabstate_common::{is_valid_cache_key, Result, TabStateError};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;

use crate::traits::CacheStore;

/// File-backed cache: one pretty-printed JSON file per key under `dir`.
///
/// Writes go to a uniquely named temp file in `dir` and are renamed into
/// place, so a reader never observes a half-written entry. A temp file whose
/// rename fails is removed.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the cache directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self::new(dir);
        fs::create_dir_all(&cache.dir).await?;
        Ok(cache)
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        is_valid_cache_key(key).then(|| self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self
            .path_for(key)
            .ok_or_else(|| TabStateError::CacheRead(format!("invalid cache key: {key:?}")))?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&bytes)?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self
            .path_for(key)
            .ok_or_else(|| TabStateError::CacheWrite(format!("invalid cache key: {key:?}")))?;
        let bytes = serde_json::to_vec_pretty(&value)?;
        let len = bytes.len();

        let dir = self.dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            // On failure the returned temp file is dropped, which deletes it.
            tmp.persist(&target).map_err(|e| TabStateError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| TabStateError::CacheWrite(format!("cache write task failed: {e}")))??;

        debug!(key, bytes = len, path = %path.display(), "Cache entry written");
        Ok(())
    }
}
