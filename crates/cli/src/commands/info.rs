//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CaptureBlueprint, CameraIntrinsics, DataKind, FrameCounts};
use corpus::CorpusSummary;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::InfoArgs;
use crate::pipeline::Session;

/// Configuration and corpus info for JSON output
#[derive(Serialize)]
struct CorpusInfo {
    version: String,
    corpus: String,
    corpus_present: bool,
    depth_extension: String,
    sources: Vec<SourceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    undeclared_sources: Vec<String>,
    metadata_files: usize,
    foreign_files: usize,
    sync_settings: SyncInfo,
}

#[derive(Serialize)]
struct SourceInfo {
    id: String,
    serial_number: String,
    frames: FrameCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    intrinsics: Option<IntrinsicsInfo>,
}

#[derive(Serialize)]
struct IntrinsicsInfo {
    fx: f64,
    fy: f64,
    ppx: f64,
    ppy: f64,
    /// Row-major 3x3 camera matrix
    matrix: [[f64; 3]; 3],
}

#[derive(Serialize)]
struct SyncInfo {
    depth_threshold: i64,
    colour_threshold: i64,
    unit: String,
}

impl From<&CameraIntrinsics> for IntrinsicsInfo {
    fn from(k: &CameraIntrinsics) -> Self {
        let m = k.matrix();
        let mut matrix = [[0.0; 3]; 3];
        for (r, row) in matrix.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = m[(r, c)];
            }
        }
        Self {
            fx: k.fx,
            fy: k.fy,
            ppx: k.ppx,
            ppy: k.ppy,
            matrix,
        }
    }
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let session = Session::load(&args.config)?;
    let summary = if session.corpus_root().is_dir() {
        session
            .corpus_index()
            .summary()
            .with_context(|| format!("Failed to scan {}", session.corpus_root().display()))?
    } else {
        warn!(corpus = %session.corpus_root().display(), "Corpus directory not found");
        CorpusSummary::default()
    };

    let info = build_corpus_info(&session, &summary);
    for source in &info.sources {
        for kind in DataKind::ALL {
            observability::record_corpus_frames(&source.id, kind, source.frames.get(kind));
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize corpus info")?;
        println!("{}", json);
    } else {
        print_corpus_info(&info, args.intrinsics);
    }

    Ok(())
}

fn build_corpus_info(session: &Session, summary: &CorpusSummary) -> CorpusInfo {
    let blueprint: &CaptureBlueprint = session.blueprint();
    let engine_config = blueprint.to_sync_engine_config();

    let sources = blueprint
        .sources()
        .iter()
        .map(|source| SourceInfo {
            id: source.id().to_string(),
            serial_number: source.serial_number().to_string(),
            frames: summary.counts(source.prefix()),
            intrinsics: source.intrinsics().map(IntrinsicsInfo::from),
        })
        .collect::<Vec<_>>();

    let undeclared_sources = summary
        .sources
        .keys()
        .filter(|prefix| !sources.iter().any(|s| &s.id == *prefix))
        .cloned()
        .collect();

    CorpusInfo {
        version: format!("{:?}", blueprint.version),
        corpus: session.corpus_root().display().to_string(),
        corpus_present: session.corpus_root().is_dir(),
        depth_extension: blueprint.corpus.depth_extension.clone(),
        sources,
        undeclared_sources,
        metadata_files: summary.metadata_files,
        foreign_files: summary.foreign_files,
        sync_settings: SyncInfo {
            depth_threshold: engine_config.depth_threshold,
            colour_threshold: engine_config.colour_threshold,
            unit: engine_config.unit.to_string(),
        },
    }
}

fn print_corpus_info(info: &CorpusInfo, show_intrinsics: bool) {
    println!("=== framesync corpus ===\n");

    println!("Corpus");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Path: {}", info.corpus);
    if !info.corpus_present {
        println!("   ├─ (directory not found)");
    }
    println!("   ├─ Depth extension: .{}", info.depth_extension);
    println!("   ├─ Metadata files: {}", info.metadata_files);
    println!("   └─ Other files: {}", info.foreign_files);

    println!("\nSources ({})", info.sources.len());
    for (i, source) in info.sources.iter().enumerate() {
        let is_last = i == info.sources.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} (serial {}): {} depth, {} colour",
            prefix,
            source.id,
            source.serial_number,
            source.frames.depth,
            source.frames.colour
        );

        if show_intrinsics {
            match &source.intrinsics {
                Some(k) => {
                    println!("   {}  K =", child_prefix);
                    for row in &k.matrix {
                        println!(
                            "   {}     [{:>10.3} {:>10.3} {:>10.3}]",
                            child_prefix, row[0], row[1], row[2]
                        );
                    }
                }
                None => println!("   {}  (no intrinsics)", child_prefix),
            }
        }
    }

    if !info.undeclared_sources.is_empty() {
        println!("\nUndeclared prefixes in corpus: {:?}", info.undeclared_sources);
    }

    let sync = &info.sync_settings;
    println!("\nSync Settings");
    println!("   ├─ Depth threshold: {} {}", sync.depth_threshold, sync.unit);
    println!("   └─ Colour threshold: {} {}", sync.colour_threshold, sync.unit);

    println!();
}
