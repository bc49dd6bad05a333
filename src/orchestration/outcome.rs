//! Per-unit outcomes and the run summary

use crate::cache::ContentHash;
use crate::error::KikoError;
use std::fmt;
use std::path::PathBuf;

/// Whether a unit's package has to be rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Compiled artifact matches the cache; keep the existing package
    Skip,
    /// Cache miss or mismatch; package again
    Repackage,
}

impl Decision {
    /// Compare a freshly computed digest against the cached one
    ///
    /// Only an exact match skips. A missing record and a different record
    /// are both misses.
    pub fn for_hashes(cached: Option<&ContentHash>, current: &ContentHash) -> Self {
        match cached {
            Some(cached) if cached == current => Self::Skip,
            _ => Self::Repackage,
        }
    }
}

/// Step at which a unit failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Compile,
    Hash,
    Archive,
    /// The unit's task itself died (panic)
    Task,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compile => "compile",
            Self::Hash => "hash",
            Self::Archive => "archive",
            Self::Task => "task",
        };
        write!(f, "{}", name)
    }
}

/// Terminal state of one unit
#[derive(Debug)]
pub enum UnitOutcome {
    /// Unchanged since the last package; record carried forward
    Skipped { hash: ContentHash },
    /// Packaged again; record holds the re-hashed artifact
    Repackaged { hash: ContentHash, package: PathBuf },
    /// No record was contributed for this unit
    Failed {
        stage: FailureStage,
        error: KikoError,
    },
}

impl UnitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one unit, labelled
#[derive(Debug)]
pub struct UnitReport {
    pub name: String,
    pub path: String,
    pub outcome: UnitOutcome,
}

/// Aggregate of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per configured unit, ordered by name
    pub units: Vec<UnitReport>,
    /// Records in the snapshot that was saved
    pub records_saved: usize,
}

impl RunReport {
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Skipped { .. }))
    }

    pub fn repackaged(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Repackaged { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(UnitOutcome::is_failure)
    }

    /// True when any unit failed, even though the cache was saved
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Look up a unit's report by name
    pub fn unit(&self, name: &str) -> Option<&UnitReport> {
        self.units.iter().find(|u| u.name == name)
    }

    fn count(&self, pred: impl Fn(&UnitOutcome) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.outcome)).count()
    }
}
