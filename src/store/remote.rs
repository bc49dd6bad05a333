//! Object storage cache backend
//!
//! Stores the snapshot as a single object at `<prefix>/.hashCache.json`.
//! Works with any `object_store` implementation; S3 is what the CLI wires up.

use crate::cache::CacheSnapshot;
use crate::error::{KikoError, KikoResult};
use crate::store::backend::CacheStore;
use crate::store::CACHE_FILENAME;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::debug;

/// Snapshot stored as one object in a bucket
pub struct RemoteCacheStore {
    inner: Arc<dyn ObjectStore>,
    bucket: String,
    key: ObjectPath,
}

impl RemoteCacheStore {
    /// Wrap an existing object store
    pub fn new(inner: Arc<dyn ObjectStore>, bucket: impl Into<String>, prefix: &str) -> Self {
        Self {
            inner,
            bucket: bucket.into(),
            key: cache_key(prefix),
        }
    }

    /// Connect to S3 using credentials from the environment
    ///
    /// Building the client does not touch the network; missing or invalid
    /// credentials surface on the first `load`.
    pub fn s3(bucket: &str, prefix: &str, region: &str) -> KikoResult<Self> {
        let s3 = object_store::aws::AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()
            .map_err(|e| {
                KikoError::storage(format!("s3://{}", bucket), format!("creating S3 client: {}", e))
            })?;

        Ok(Self::new(Arc::new(s3), bucket, prefix))
    }

    /// In-memory store, for tests and dry runs
    pub fn memory(prefix: &str) -> Self {
        Self::new(
            Arc::new(object_store::memory::InMemory::new()),
            "memory",
            prefix,
        )
    }
}

/// Object key for the cache under a prefix; an empty prefix means the bucket root
fn cache_key(prefix: &str) -> ObjectPath {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        ObjectPath::from(CACHE_FILENAME)
    } else {
        ObjectPath::from(format!("{}/{}", prefix, CACHE_FILENAME))
    }
}

#[async_trait]
impl CacheStore for RemoteCacheStore {
    async fn load(&self) -> KikoResult<CacheSnapshot> {
        let result = self.inner.get(&self.key).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => KikoError::SnapshotNotFound(self.location()),
            other => KikoError::ObjectStore(other),
        })?;

        let content = result.bytes().await?;
        let snapshot = CacheSnapshot::from_json(&content)
            .map_err(|e| KikoError::storage(self.location(), e.to_string()))?;

        debug!(
            "Loaded {} cache record(s) from {}",
            snapshot.len(),
            self.location()
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> KikoResult<()> {
        let content = snapshot.to_json()?;
        self.inner
            .put(&self.key, PutPayload::from_bytes(Bytes::from(content)))
            .await?;

        debug!(
            "Saved {} cache record(s) to {}",
            snapshot.len(),
            self.location()
        );
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
