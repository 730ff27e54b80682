//! # framesync CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - configuration loading and validation
//! - synchronization runs and JSON export
//! - working-set extraction
//! - graceful shutdown on Ctrl+C

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_extract, run_info, run_sync, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "framesync starting");

    let result = match &cli.command {
        Commands::Sync(args) => run_sync(args).await,
        Commands::Extract(args) => run_extract(args).await,
        Commands::Info(args) => run_info(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize tracing and the optional metrics endpoint from CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
    })
}
