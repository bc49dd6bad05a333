//! Build orchestrator
//!
//! Drives every unit through compile, hash, decide and (when needed)
//! archive, concurrently, then persists the resulting snapshot.
//!
//! ```text
//! Compiling -> Hashing -> Deciding -> Skip ------------------------> Recorded
//!                                  \-> Repackage -> Hashing(final) -> Recorded
//! ```
//!
//! Any step can fail; a failed unit contributes no record and does not
//! affect its siblings.

use crate::cache::{accumulator, hash_file, CacheRecord, CacheSnapshot, ContentHash, SnapshotWriter};
use crate::config::Unit;
use crate::error::{KikoError, KikoResult};
use crate::orchestration::builder::UnitBuilder;
use crate::orchestration::outcome::{Decision, FailureStage, RunReport, UnitOutcome, UnitReport};
use crate::store::{load_previous, CacheStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Everything a unit task needs, passed in explicitly
struct UnitContext {
    previous: Arc<CacheSnapshot>,
    builder: Arc<dyn UnitBuilder>,
    writer: SnapshotWriter,
}

/// Runs units against a cache store
pub struct Orchestrator {
    store: Arc<dyn CacheStore>,
    builder: Arc<dyn UnitBuilder>,
    max_parallel: usize,
}

impl Orchestrator {
    /// Create an orchestrator with unbounded fan-out
    pub fn new(store: Arc<dyn CacheStore>, builder: Arc<dyn UnitBuilder>) -> Self {
        Self {
            store,
            builder,
            max_parallel: 0,
        }
    }

    /// Cap the number of units building at once (0 = no cap)
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Build all units and replace the persisted snapshot
    ///
    /// Storage failures abort the run: before any unit starts when loading,
    /// after every unit has finished when saving. Unit failures never do;
    /// they are reported in the returned `RunReport`.
    pub async fn run(&self, units: &[Unit]) -> KikoResult<RunReport> {
        let previous = Arc::new(load_previous(self.store.as_ref()).await?);
        debug!(
            "Previous cache has {} record(s) at {}",
            previous.len(),
            self.store.location()
        );

        let (writer, aggregator) = accumulator();
        let limit = (self.max_parallel > 0).then(|| Arc::new(Semaphore::new(self.max_parallel)));

        let mut tasks = JoinSet::new();
        let mut spawned = HashMap::new();

        for unit in units {
            let ctx = UnitContext {
                previous: Arc::clone(&previous),
                builder: Arc::clone(&self.builder),
                writer: writer.clone(),
            };
            let limit = limit.clone();
            let task_unit = unit.clone();

            let handle = tasks.spawn(async move {
                let _permit = match limit {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = build_unit(&ctx, &task_unit).await;
                UnitReport {
                    name: task_unit.name,
                    path: task_unit.path,
                    outcome,
                }
            });
            spawned.insert(handle.id(), unit.clone());
        }

        // Only unit tasks may hold writers from here on, so the aggregator
        // finishes exactly when the last task does.
        drop(writer);

        let mut reports = Vec::with_capacity(units.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    let (name, path) = spawned
                        .remove(&e.id())
                        .map(|u| (u.name, u.path))
                        .unwrap_or_else(|| ("unknown".to_string(), String::new()));
                    error!("Unit task for {} died: {}", name, e);
                    reports.push(UnitReport {
                        name,
                        path,
                        outcome: UnitOutcome::Failed {
                            stage: FailureStage::Task,
                            error: KikoError::Internal(format!("unit task died: {}", e)),
                        },
                    });
                }
            }
        }

        let next = aggregator.finish().await;
        self.store.save(&next).await?;
        info!(
            "Saved {} cache record(s) to {}",
            next.len(),
            self.store.location()
        );

        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(RunReport {
            units: reports,
            records_saved: next.len(),
        })
    }
}

/// Take one unit from compile to a terminal state
async fn build_unit(ctx: &UnitContext, unit: &Unit) -> UnitOutcome {
    let artifact = match ctx.builder.compile(unit).await {
        Ok(artifact) => artifact,
        Err(e) => {
            error!("{}", e);
            return failed(FailureStage::Compile, e);
        }
    };

    let hash = match hash_file(&artifact).await {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing - {}: {}", unit.name, e);
            return failed(FailureStage::Hash, e);
        }
    };

    match Decision::for_hashes(ctx.previous.lookup(&unit.path), &hash) {
        Decision::Skip => {
            debug!("{} unchanged ({}), skipping package", unit.name, hash.short());
            match record(ctx, unit, hash) {
                Ok(()) => UnitOutcome::Skipped { hash },
                Err(e) => failed(FailureStage::Task, e),
            }
        }
        Decision::Repackage => {
            info!("Rebuilding function: {}", unit.name);

            let package = match ctx.builder.archive(unit).await {
                Ok(package) => package,
                Err(e) => {
                    error!("{}", e);
                    return failed(FailureStage::Archive, e);
                }
            };

            // Re-read: the archive step may have touched the artifact.
            let final_hash = match hash_file(&artifact).await {
                Ok(hash) => hash,
                Err(e) => {
                    error!("Error hashing - {}: {}", unit.name, e);
                    return failed(FailureStage::Hash, e);
                }
            };

            match record(ctx, unit, final_hash) {
                Ok(()) => UnitOutcome::Repackaged {
                    hash: final_hash,
                    package,
                },
                Err(e) => failed(FailureStage::Task, e),
            }
        }
    }
}

fn record(ctx: &UnitContext, unit: &Unit, hash: ContentHash) -> KikoResult<()> {
    ctx.writer.append(CacheRecord::new(unit.path.clone(), hash))
}

fn failed(stage: FailureStage, error: KikoError) -> UnitOutcome {
    UnitOutcome::Failed { stage, error }
}
