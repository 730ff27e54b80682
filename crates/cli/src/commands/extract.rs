//! `extract` command implementation.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use workset::{ExtractReport, Extractor};

use crate::cli::ExtractArgs;
use crate::commands::sync::synchronize;
use crate::error::CliError;
use crate::pipeline::{run_blocking, Session};

/// Execute the `extract` command
pub async fn run_extract(args: &ExtractArgs) -> Result<()> {
    let session = Session::from_engine_args(&args.engine)?;
    session.ensure_corpus()?;

    let (report, _) = synchronize(&session).await?;
    let (depth, colour) = report
        .pair(args.index)
        .ok_or_else(|| CliError::no_frameset(args.index, report.colour.colour.len()))?;

    let blueprint = session.blueprint();
    let working_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| blueprint.workset.output_dir.clone());
    let delete_remainder = args.delete_remainder || blueprint.workset.delete_remainder;

    info!(
        index = args.index,
        depth_index = colour.depth_index,
        working_dir = %working_dir.display(),
        delete_remainder,
        "Extracting frameset"
    );

    let extractor = Extractor::new(session.corpus_root(), working_dir)
        .with_depth_extension(&blueprint.corpus.depth_extension)
        .with_delete_remainder(delete_remainder);
    let sources = report.sources().to_vec();
    let (depth, colour) = (depth.clone(), colour.clone());

    let started = Instant::now();
    let extracted = run_blocking(move || {
        extractor
            .extract(&sources, &depth, &colour)
            .map_err(|e| CliError::from(e).into())
    })
    .await?;
    observability::record_command_duration_ms("extract", started.elapsed().as_secs_f64() * 1000.0);

    if args.json {
        let json =
            serde_json::to_string_pretty(&extracted).context("Failed to serialize extract report")?;
        println!("{}", json);
    } else {
        print_extract_report(&extracted);
    }

    Ok(())
}

fn print_extract_report(report: &ExtractReport) {
    println!("Working set: {}", report.working_dir.display());
    println!("  Moved: {} files", report.moved.len());
    if report.removed > 0 {
        println!("  Removed from corpus: {} entries", report.removed);
    }
    if !report.is_complete() {
        println!("\nMissing files:");
        for missing in &report.missing {
            println!("  - {} ({} {})", missing.file, missing.source, missing.kind);
        }
    }
}
