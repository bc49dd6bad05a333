//! Content-hash cache for built units
//!
//! Records, per unit path, the SHA256 digest of the artifact that was last
//! packaged. A unit whose freshly compiled artifact still hashes to the
//! recorded digest does not need to be packaged again.
//!
//! # Snapshot Lifecycle
//!
//! | Snapshot | Access during a run | Origin | Fate |
//! |----------|---------------------|--------|------|
//! | Previous | read-only, shared | loaded at start | dropped at end |
//! | Next | append-only, owned by aggregator | empty at start | saved at end |

pub mod hash;
pub mod snapshot;

pub use hash::{hash_file, ContentHash, DIGEST_LEN};
pub use snapshot::{accumulator, CacheRecord, CacheSnapshot, SnapshotAggregator, SnapshotWriter};
