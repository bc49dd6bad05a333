//! Build command - compile every function and re-package what changed

use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::{KikoError, KikoResult};
use crate::orchestration::{CommandBuilder, Orchestrator, RunReport, UnitOutcome};
use crate::store::{create_store, BackendDescriptor};
use console::style;
use std::sync::Arc;
use tracing::{debug, warn};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> KikoResult<()> {
    if config.functions.is_empty() {
        warn!("No functions configured, nothing to build");
    }

    let backend = BackendDescriptor::from_config(&config.backend);
    debug!("Using {} cache backend", backend.name());
    let store = create_store(&backend)?;

    let max_parallel = args.jobs.unwrap_or(config.build.max_parallel);
    let orchestrator = Orchestrator::new(
        Arc::from(store),
        Arc::new(CommandBuilder::new(config.build.clone())),
    )
    .with_max_parallel(max_parallel);

    let report = orchestrator.run(&config.functions).await?;
    print_report(&report);

    if report.has_failures() {
        return Err(KikoError::UnitsFailed {
            failed: report.failed(),
            total: report.units.len(),
        });
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for unit in &report.units {
        match &unit.outcome {
            UnitOutcome::Skipped { hash } => println!(
                "  {} {:<24} {}",
                style("=").dim(),
                unit.name,
                style(format!("unchanged ({})", hash.short())).dim()
            ),
            UnitOutcome::Repackaged { hash, package } => println!(
                "  {} {:<24} packaged {} ({})",
                style("✓").green(),
                unit.name,
                package.display(),
                hash.short()
            ),
            UnitOutcome::Failed { stage, .. } => println!(
                "  {} {:<24} {}",
                style("✗").red(),
                unit.name,
                style(format!("{} failed", stage)).red()
            ),
        }
    }

    println!();
    println!(
        "{} re-packaged, {} unchanged, {} failed ({} cache record(s) saved)",
        style(report.repackaged()).green(),
        report.skipped(),
        if report.has_failures() {
            style(report.failed()).red()
        } else {
            style(report.failed())
        },
        report.records_saved
    );
}
