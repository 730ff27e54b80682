//! `sync` command implementation.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use sync_engine::SyncReport;
use tracing::{info, warn};

use crate::cli::SyncArgs;
use crate::pipeline::{run_blocking, RunStats, Session};

/// Execute the `sync` command
pub async fn run_sync(args: &SyncArgs) -> Result<()> {
    let session = Session::from_engine_args(&args.engine)?;
    session.ensure_corpus()?;

    let (report, stats) = synchronize(&session).await?;

    if let Some(ref output) = args.output {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run")?;
        fs::write(output, json)
            .with_context(|| format!("Failed to write run to {}", output.display()))?;
        info!(output = %output.display(), "Run written");
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run")?;
        println!("{}", json);
    } else {
        print_framesets(&report);
        stats.print_summary();
    }

    Ok(())
}

/// Run depth synchronization and colour binding for `session` on a worker thread.
pub(crate) async fn synchronize(session: &Session) -> Result<(SyncReport, RunStats)> {
    let sources = session.blueprint().source_ids();
    let mut engine = session.engine();

    info!(
        config = %session.config_path().display(),
        sources = sources.len(),
        depth_threshold = engine.config().depth_threshold,
        colour_threshold = engine.config().colour_threshold,
        unit = %engine.config().unit,
        "Starting synchronization"
    );

    let started = Instant::now();
    let report = run_blocking(move || Ok(engine.run(&sources)?)).await?;
    let elapsed = started.elapsed();
    observability::record_command_duration_ms("sync", elapsed.as_secs_f64() * 1000.0);

    if report.depth.is_empty() {
        warn!("No depth framesets found; try a larger threshold");
    } else if report.colour.colour.is_empty() {
        warn!("No colour frameset could be bound to the depth framesets");
    }

    let stats = RunStats::from_report(&report, elapsed);
    Ok((report, stats))
}

fn print_framesets(report: &SyncReport) {
    let sources = report
        .sources()
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    println!("Sources: {sources}");
    println!(
        "\nDepth framesets ({}, threshold {} {}):",
        report.depth.framesets.len(),
        report.depth.stats.threshold,
        report.unit.suffix()
    );
    for (i, frameset) in report.depth.framesets.iter().enumerate() {
        println!(
            "  [{i}] {:?}  ref {} @ {}  skew {}",
            frameset.frame_ids,
            frameset.meta.reference_source,
            frameset.meta.reference_timestamp,
            frameset.meta.max_skew()
        );
    }

    println!(
        "\nColour framesets ({}, threshold {} {}):",
        report.colour.colour.len(),
        report.colour.stats.threshold,
        report.unit.suffix()
    );
    for (i, colour) in report.colour.colour.iter().enumerate() {
        println!("  [{i}] {:?} -> depth [{}]", colour.frame_ids, colour.depth_index);
    }
}
