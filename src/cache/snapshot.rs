//! Cache snapshots and their concurrent accumulation
//!
//! A run reads one snapshot (the previous run's output) and produces
//! another. The previous snapshot is frozen after loading and shared
//! between unit tasks by reference. The next snapshot is never shared:
//! tasks hold a [`SnapshotWriter`] and send records to a single
//! [`SnapshotAggregator`], which becomes the snapshot once every writer
//! has been dropped.

use crate::cache::hash::ContentHash;
use crate::error::{KikoError, KikoResult};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Last known content hash of a unit's final artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Unit path, the cache key
    pub path: String,
    /// Digest of the unit's artifact
    pub hash: ContentHash,
}

impl CacheRecord {
    pub fn new(path: impl Into<String>, hash: ContentHash) -> Self {
        Self {
            path: path.into(),
            hash,
        }
    }
}

/// All cache records for one point in time
///
/// Persisted as a JSON array. Paths are expected to be unique; when they
/// are not, lookups see only the first record for a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CacheSnapshot {
    records: Vec<CacheRecord>,
}

/// Accepts the array form, `null` for an empty cache, and the older
/// `{"Cache": [...]}` wrapper. Errors inside records surface as-is.
struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = CacheSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of cache records, null, or an object with a `Cache` array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CacheSnapshot::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CacheSnapshot::new())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut records = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(record) = seq.next_element::<CacheRecord>()? {
            records.push(record);
        }
        Ok(CacheSnapshot::from_records(records))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut records = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "Cache" {
                let cache: Option<Vec<CacheRecord>> = map.next_value()?;
                records = Some(cache.unwrap_or_default());
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        records
            .map(CacheSnapshot::from_records)
            .ok_or_else(|| de::Error::missing_field("Cache"))
    }
}

impl<'de> Deserialize<'de> for CacheSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SnapshotVisitor)
    }
}

impl CacheSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CacheRecord>) -> Self {
        Self { records }
    }

    /// Find the recorded hash for a unit path (first match wins)
    pub fn lookup(&self, path: &str) -> Option<&ContentHash> {
        self.records
            .iter()
            .find(|record| record.path == path)
            .map(|record| &record.hash)
    }

    /// Add a record
    pub fn append(&mut self, record: CacheRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Order records by path
    ///
    /// The sort is stable, so the first record for a duplicated path stays
    /// first and lookups are unaffected.
    pub fn normalize(&mut self) {
        self.records.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Parse a persisted snapshot
    pub fn from_json(bytes: &[u8]) -> KikoResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Render the snapshot as it is persisted (tab-indented JSON)
    pub fn to_json(&self) -> KikoResult<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Create a connected writer/aggregator pair for building the next snapshot
pub fn accumulator() -> (SnapshotWriter, SnapshotAggregator) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SnapshotWriter { tx }, SnapshotAggregator { rx })
}

/// Handle held by a unit task to contribute its record
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<CacheRecord>,
}

impl SnapshotWriter {
    /// Contribute one record to the next snapshot
    ///
    /// Never blocks. Fails only if the aggregator has been dropped.
    pub fn append(&self, record: CacheRecord) -> KikoResult<()> {
        self.tx
            .send(record)
            .map_err(|e| KikoError::Internal(format!("snapshot aggregator closed ({})", e.0.path)))
    }
}

/// Sole owner of the next snapshot while a run is in progress
#[derive(Debug)]
pub struct SnapshotAggregator {
    rx: mpsc::UnboundedReceiver<CacheRecord>,
}

impl SnapshotAggregator {
    /// Collect every record sent, returning once all writers are gone
    pub async fn finish(mut self) -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::new();
        while let Some(record) = self.rx.recv().await {
            snapshot.append(record);
        }
        snapshot.normalize();
        snapshot
    }
}
