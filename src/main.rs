//! Kiko - incremental function builds
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use kiko::cli::{Cli, Commands};
use kiko::config::ConfigManager;
use kiko::error::KikoResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> KikoResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (errors and warnings only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("kiko=warn"),
        1 => EnvFilter::new("kiko=info"),
        _ => EnvFilter::new("kiko=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Dispatch to command
    match cli.command {
        Commands::Build(args) => kiko::cli::commands::build(args, &config).await,
        Commands::Cache(args) => kiko::cli::commands::cache(args, &config).await,
    }
}
