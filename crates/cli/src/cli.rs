//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// framesync - software synchronization of multi-camera depth/colour captures
#[derive(Parser, Debug)]
#[command(
    name = "framesync",
    author,
    version,
    about = "Multi-camera frame synchronization",
    long_about = "Groups frames captured by independent depth/colour cameras into\n\
                  synchronized framesets using the arrival timestamps stored in each\n\
                  frame's metadata sidecar, and extracts a selected frameset into a\n\
                  working directory."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FRAMESYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "FRAMESYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port while the command runs
    #[arg(long, global = true, env = "FRAMESYNC_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize depth frames and bind colour frames to them
    Sync(SyncArgs),

    /// Move one synchronized frameset into the working directory
    Extract(ExtractArgs),

    /// Show sources, intrinsics and per-source frame counts
    Info(InfoArgs),

    /// Validate configuration file without touching the corpus
    Validate(ValidateArgs),
}

/// Options shared by the commands that run the engine
#[derive(Parser, Debug, Clone)]
pub struct EngineArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "FRAMESYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the depth matching threshold
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub threshold: Option<i64>,

    /// Override the colour binding threshold
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub colour_threshold: Option<i64>,
}

/// Arguments for the `sync` command
#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Write the full run (framesets and statistics) as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the run as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `extract` command
#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Colour frameset to extract, as listed by `sync`
    #[arg(short, long, default_value = "0")]
    pub index: usize,

    /// Override the working directory from configuration
    #[arg(long, env = "FRAMESYNC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Delete the rest of the corpus after the move
    #[arg(long)]
    pub delete_remainder: bool,

    /// Print the extraction report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "FRAMESYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the intrinsic matrix of every source
    #[arg(long)]
    pub intrinsics: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "FRAMESYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
