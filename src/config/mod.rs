//! Configuration management for Kiko

pub mod schema;

pub use schema::{BackendConfig, BuildConfig, Config, Unit};

use crate::error::{KikoError, KikoResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILENAME: &str = "kiko.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILENAME),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Load and validate the configuration
    ///
    /// Unlike most settings files, a missing config is fatal: without it
    /// there is nothing to build.
    pub async fn load(&self) -> KikoResult<Config> {
        if !self.config_path.exists() {
            return Err(KikoError::ConfigNotFound(self.config_path.clone()));
        }

        let config = self.load_from_file(&self.config_path).await?;
        self.validate(&config)?;
        debug!(
            "Loaded {} unit(s) from {}",
            config.functions.len(),
            self.config_path.display()
        );
        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> KikoResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| KikoError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| KikoError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn validate(&self, config: &Config) -> KikoResult<()> {
        let invalid = |reason: String| KikoError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        };

        if config.build.compile.is_empty() {
            return Err(invalid("build.compile must name a program".to_string()));
        }
        if config.build.archive.is_empty() {
            return Err(invalid("build.archive must name a program".to_string()));
        }

        let mut seen = HashSet::new();
        for unit in &config.functions {
            if unit.name.is_empty() || unit.path.is_empty() {
                return Err(invalid(format!(
                    "function entries need a name and a path (got name={:?}, path={:?})",
                    unit.name, unit.path
                )));
            }
            if !seen.insert(unit.path.as_str()) {
                return Err(invalid(format!("duplicate function path: {}", unit.path)));
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
