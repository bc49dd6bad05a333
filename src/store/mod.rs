//! Cache snapshot persistence
//!
//! Backend-agnostic loading and saving of cache snapshots:
//! - Local: JSON file in the working directory
//! - Remote: single object in an S3 bucket

mod backend;
mod factory;
mod local;
mod remote;

pub use backend::{load_previous, CacheStore};
pub use factory::{create_store, BackendDescriptor};
pub use local::LocalCacheStore;
pub use remote::RemoteCacheStore;

/// Well-known name of the persisted cache, locally and as the object key suffix
pub const CACHE_FILENAME: &str = ".hashCache.json";
