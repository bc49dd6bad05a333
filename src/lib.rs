//! Kiko - incremental builds for function packages
//!
//! Compiles a set of independently deployable units, fingerprints each
//! compiled artifact, and re-runs the expensive packaging step only for
//! units whose fingerprint differs from the one recorded in a persisted
//! hash cache (local file or S3 object).

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestration;
pub mod store;

pub use error::{KikoError, KikoResult};
