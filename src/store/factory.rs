//! Store factory for the configured cache backend

use crate::config::BackendConfig;
use crate::error::KikoResult;
use crate::store::backend::CacheStore;
use crate::store::local::LocalCacheStore;
use crate::store::remote::RemoteCacheStore;
use crate::store::CACHE_FILENAME;
use std::path::PathBuf;

/// Where the cache snapshot lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendDescriptor {
    /// JSON file on the local filesystem
    Local { path: PathBuf },
    /// Object in an S3 bucket
    Remote {
        bucket: String,
        prefix: String,
        region: String,
    },
}

impl BackendDescriptor {
    /// Resolve the backend from configuration
    ///
    /// Without both a bucket and a region the cache stays local, in the
    /// well-known file in the working directory.
    pub fn from_config(config: &BackendConfig) -> Self {
        if config.is_remote() {
            Self::Remote {
                bucket: config.bucket.clone(),
                prefix: config.key.clone(),
                region: config.region.clone(),
            }
        } else {
            Self::Local {
                path: PathBuf::from(CACHE_FILENAME),
            }
        }
    }

    /// Get a human-readable backend name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Remote { .. } => "s3",
        }
    }
}

/// Create the cache store for a backend
pub fn create_store(backend: &BackendDescriptor) -> KikoResult<Box<dyn CacheStore>> {
    match backend {
        BackendDescriptor::Local { path } => Ok(Box::new(LocalCacheStore::new(path.clone()))),
        BackendDescriptor::Remote {
            bucket,
            prefix,
            region,
        } => Ok(Box::new(RemoteCacheStore::s3(bucket, prefix, region)?)),
    }
}
