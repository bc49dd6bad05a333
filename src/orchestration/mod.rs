//! Orchestration of unit builds
//!
//! Turns a list of units into packaged artifacts, using the hash cache to
//! skip packaging for units whose compiled output has not changed.

mod builder;
mod engine;
mod outcome;

pub use builder::{CommandBuilder, UnitBuilder};
pub use engine::Orchestrator;
pub use outcome::{Decision, FailureStage, RunReport, UnitOutcome, UnitReport};
