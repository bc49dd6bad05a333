//! Cache storage abstraction
//!
//! Provides a trait for persisting cache snapshots that can be implemented
//! by different backends (local JSON file, remote object storage).

use crate::cache::CacheSnapshot;
use crate::error::KikoResult;
use async_trait::async_trait;
use tracing::info;

/// Abstract cache storage interface
///
/// The orchestrator only ever loads once at the start of a run and saves
/// once after every unit has finished, so implementations need no
/// coordination beyond making `save` atomic with respect to `load`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the persisted snapshot
    ///
    /// Backends that can tell "nothing stored yet" apart from a failure
    /// report it as `KikoError::SnapshotNotFound`.
    async fn load(&self) -> KikoResult<CacheSnapshot>;

    /// Replace the persisted snapshot
    async fn save(&self, snapshot: &CacheSnapshot) -> KikoResult<()>;

    /// Human-readable location for logs and errors
    fn location(&self) -> String;
}

/// Load the previous run's snapshot, starting from empty if there is none
pub async fn load_previous(store: &dyn CacheStore) -> KikoResult<CacheSnapshot> {
    match store.load().await {
        Ok(snapshot) => Ok(snapshot),
        Err(e) if e.is_not_found() => {
            info!("{}, starting from an empty cache", e);
            Ok(CacheSnapshot::new())
        }
        Err(e) => Err(e),
    }
}
