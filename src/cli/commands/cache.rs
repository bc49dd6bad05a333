//! Cache command - inspect or reset the hash cache

use crate::cache::CacheSnapshot;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::KikoResult;
use crate::store::{create_store, load_previous, BackendDescriptor, CacheStore};
use console::style;
use std::io::{self, Write};
use tracing::warn;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> KikoResult<()> {
    let store = create_store(&BackendDescriptor::from_config(&config.backend))?;

    match args.action {
        CacheAction::Show { format } => show_cache(&*store, format).await,
        CacheAction::Clear { yes } => clear_cache(&*store, yes).await,
    }
}

/// Print every record in the persisted snapshot
async fn show_cache(store: &dyn CacheStore, format: OutputFormat) -> KikoResult<()> {
    let snapshot = load_previous(store).await?;

    match format {
        OutputFormat::Table => print_cache_table(store, &snapshot),
        OutputFormat::Json => print_cache_json(&snapshot)?,
    }

    Ok(())
}

fn print_cache_table(store: &dyn CacheStore, snapshot: &CacheSnapshot) {
    println!("Cache: {}", style(store.location()).cyan());

    if snapshot.is_empty() {
        println!("No cache records found.");
        return;
    }

    println!();
    println!("{:<40} {:<64}", style("PATH").bold(), style("SHA256").bold());
    println!("{}", "-".repeat(105));

    for record in snapshot.records() {
        println!("{:<40} {}", record.path, style(record.hash.to_hex()).dim());
    }

    println!();
    println!("Total: {} record(s)", snapshot.len());
}

fn print_cache_json(snapshot: &CacheSnapshot) -> KikoResult<()> {
    #[derive(serde::Serialize)]
    struct RecordJson<'a> {
        path: &'a str,
        sha256: String,
    }

    let records: Vec<RecordJson<'_>> = snapshot
        .records()
        .iter()
        .map(|r| RecordJson {
            path: &r.path,
            sha256: r.hash.to_hex(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Replace the persisted snapshot with an empty one
///
/// An unreadable snapshot is still cleared; that is the way out of a
/// corrupt cache.
async fn clear_cache(store: &dyn CacheStore, skip_confirm: bool) -> KikoResult<()> {
    let existing = match load_previous(store).await {
        Ok(snapshot) if snapshot.is_empty() => {
            println!("Cache is already empty.");
            return Ok(());
        }
        Ok(snapshot) => Some(snapshot.len()),
        Err(e) => {
            warn!("Existing cache is unreadable, clearing anyway: {}", e);
            None
        }
    };

    match existing {
        Some(count) => println!(
            "This will forget {} cache record(s) at {}; every function will be re-packaged on the next build.",
            count,
            store.location()
        ),
        None => println!(
            "This will reset the unreadable cache at {}; every function will be re-packaged on the next build.",
            store.location()
        ),
    }

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.save(&CacheSnapshot::new()).await?;
    match existing {
        Some(count) => println!("{} cleared {} record(s)", style("✓").green(), count),
        None => println!("{} reset cache at {}", style("✓").green(), store.location()),
    }
    Ok(())
}
