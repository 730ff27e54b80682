//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    corpus: String,
    source_count: usize,
    intrinsics_count: usize,
    depth_threshold: i64,
    colour_threshold: i64,
    unit: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(&args.config);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(blueprint) => {
            let mut warnings = config_loader::warnings(&blueprint);
            if !blueprint.corpus.path.is_dir() {
                warnings.push(format!(
                    "corpus directory '{}' does not exist yet",
                    blueprint.corpus.path.display()
                ));
            }
            let engine_config = blueprint.to_sync_engine_config();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings,
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    corpus: blueprint.corpus.path.display().to_string(),
                    source_count: blueprint.sources.len(),
                    intrinsics_count: blueprint.intrinsics.len(),
                    depth_threshold: engine_config.depth_threshold,
                    colour_threshold: engine_config.colour_threshold,
                    unit: engine_config.unit.to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Corpus: {}", summary.corpus);
            println!("  Sources: {}", summary.source_count);
            println!("  Intrinsics rows: {}", summary.intrinsics_count);
            println!(
                "  Thresholds: depth {} / colour {} ({})",
                summary.depth_threshold, summary.colour_threshold, summary.unit
            );
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
