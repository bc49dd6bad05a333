//! Content hashing for build artifacts
//!
//! Artifacts are fingerprinted with SHA256 over their raw bytes. The same
//! function hashes the freshly compiled artifact and the artifact re-read
//! after packaging, so the two digests are directly comparable.

use crate::error::{KikoError, KikoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Length of a content digest in bytes
pub const DIGEST_LEN: usize = 32;

/// SHA256 digest of an artifact's contents
///
/// Serialized as standard base64, the encoding the cache file has always
/// used for its `hash` field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; DIGEST_LEN]);

impl ContentHash {
    /// Hash a byte slice
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex rendering, for display
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex chars, enough to tell digests apart in logs
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(self.0))
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        let digest: [u8; DIGEST_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::custom(format!(
                "expected a {}-byte digest, got {} bytes",
                DIGEST_LEN,
                v.len()
            ))
        })?;
        Ok(Self(digest))
    }
}

/// Read a file and hash its contents
pub async fn hash_file(path: &Path) -> KikoResult<ContentHash> {
    let contents = fs::read(path)
        .await
        .map_err(|e| KikoError::io(format!("reading artifact {}", path.display()), e))?;

    Ok(ContentHash::of(&contents))
}
