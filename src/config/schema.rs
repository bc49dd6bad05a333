//! Configuration schema for Kiko
//!
//! Configuration is read from `kiko.toml` in the working directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the hash cache is persisted
    pub backend: BackendConfig,

    /// How units are compiled and packaged
    pub build: BuildConfig,

    /// Units to build
    pub functions: Vec<Unit>,
}

/// Cache backend settings
///
/// Leaving `bucket` or `region` empty selects the local file backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Object storage bucket
    pub bucket: String,

    /// Key prefix under which the cache object is stored
    pub key: String,

    /// Object storage region
    pub region: String,
}

impl BackendConfig {
    /// Whether enough is configured to use the remote backend
    pub fn is_remote(&self) -> bool {
        !self.bucket.is_empty() && !self.region.is_empty()
    }
}

/// Build settings shared by every unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum units building at once (0 = one task per unit)
    pub max_parallel: usize,

    /// Compile command argv; `{path}` and `{name}` are substituted
    pub compile: Vec<String>,

    /// Compiled artifact, relative to the unit path
    pub artifact: PathBuf,

    /// Archive command argv; `{path}` and `{name}` are substituted
    pub archive: Vec<String>,

    /// Final distributable, relative to the unit path
    pub package: PathBuf,

    /// Environment applied to compile and archive processes
    pub env: BTreeMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            compile: vec![
                "go".to_string(),
                "build".to_string(),
                "-o".to_string(),
                "{path}/main".to_string(),
                "{path}/main.go".to_string(),
            ],
            artifact: PathBuf::from("main"),
            archive: vec![
                "zip".to_string(),
                "{path}/archive.zip".to_string(),
                "{path}/main".to_string(),
            ],
            package: PathBuf::from("archive.zip"),
            env: BTreeMap::from([
                ("GOOS".to_string(), "linux".to_string()),
                ("GOARCH".to_string(), "amd64".to_string()),
                ("CGO_ENABLED".to_string(), "0".to_string()),
            ]),
        }
    }
}

/// A single build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Human-readable unit name
    pub name: String,

    /// Unit source directory; also the cache key
    pub path: String,
}

impl Unit {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}
