//! Local file cache backend

use crate::cache::CacheSnapshot;
use crate::error::{KikoError, KikoResult};
use crate::store::backend::CacheStore;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Snapshot stored as a JSON file on the local filesystem
pub struct LocalCacheStore {
    path: PathBuf,
}

impl LocalCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the snapshot is staged in before being renamed into place
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("hashCache"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn load(&self) -> KikoResult<CacheSnapshot> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {}, using empty cache", self.path.display());
                return Ok(CacheSnapshot::new());
            }
            Err(e) => {
                return Err(KikoError::io(
                    format!("reading cache from {}", self.path.display()),
                    e,
                ))
            }
        };

        let snapshot = CacheSnapshot::from_json(&content)
            .map_err(|e| KikoError::storage(self.location(), e.to_string()))?;
        debug!(
            "Loaded {} cache record(s) from {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> KikoResult<()> {
        let content = snapshot.to_json()?;
        let staging = self.staging_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                KikoError::io(format!("creating cache directory {}", parent.display()), e)
            })?;
        }

        fs::write(&staging, content)
            .await
            .map_err(|e| KikoError::io(format!("writing cache to {}", staging.display()), e))?;
        fs::rename(&staging, &self.path).await.map_err(|e| {
            KikoError::io(format!("replacing cache file {}", self.path.display()), e)
        })?;

        debug!(
            "Saved {} cache record(s) to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
