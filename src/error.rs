//! Error types for Kiko
//!
//! All modules use `KikoResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Kiko operations
pub type KikoResult<T> = Result<T, KikoError>;

/// All errors that can occur in Kiko
#[derive(Error, Debug)]
pub enum KikoError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Unit errors
    #[error("Error compiling - {unit}: {reason}")]
    Compile { unit: String, reason: String },

    #[error("Error archiving - {unit}: {reason}")]
    Archive { unit: String, reason: String },

    #[error("{failed} of {total} unit(s) failed; cache saved for the rest")]
    UnitsFailed { failed: usize, total: usize },

    // Cache storage errors
    #[error("hashCache does not exist at {0}")]
    SnapshotNotFound(String),

    #[error("Cache storage error at {location}: {reason}")]
    Storage { location: String, reason: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KikoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a storage error for a backend location
    pub fn storage(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Whether the backend simply has no persisted snapshot yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SnapshotNotFound(_))
    }

    /// Process exit code for this error
    ///
    /// A run whose units partly failed still saved its cache, which callers
    /// can tell apart from a run that never got that far.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnitsFailed { .. } => 2,
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Create kiko.toml or pass --config <path>"),
            Self::ObjectStore(_) => {
                Some("Check AWS credentials (AWS_ACCESS_KEY_ID / AWS_PROFILE) and bucket region")
            }
            Self::Storage { .. } => Some("Run: kiko cache clear to reset a corrupt cache"),
            Self::UnitsFailed { .. } => {
                Some("Failed units are rebuilt on the next run; use -v for details")
            }
            _ => None,
        }
    }
}
