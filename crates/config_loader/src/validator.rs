//! Config validation
//!
//! Rules:
//! - at least one source, source ids unique
//! - source ids non-empty and free of the file-name separator
//! - serial numbers non-empty
//! - thresholds > 0
//! - clock offsets only for declared sources
//! - intrinsics rows unique per serial number
//! - workset output dir is neither the corpus path nor one of its parents

use std::collections::HashSet;
use std::path::{Component, Path};

use ::validator::Validate;
use contracts::{CaptureBlueprint, ContractError, SourceId};

/// Validate a CaptureBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    validate_source_ids(blueprint)?;
    validate_serial_numbers(blueprint)?;
    validate_sync_config(blueprint)?;
    validate_intrinsics(blueprint)?;
    validate_workset(blueprint)?;
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))?;
    Ok(())
}

/// Non-fatal findings worth reporting to the user.
pub fn warnings(blueprint: &CaptureBlueprint) -> Vec<String> {
    let serials: HashSet<&str> = blueprint
        .sources
        .iter()
        .map(|s| s.serial_number.as_str())
        .collect();

    let mut warnings: Vec<String> = blueprint
        .intrinsics
        .iter()
        .filter(|k| !serials.contains(k.serial_number.as_str()))
        .map(|k| {
            format!(
                "intrinsics[serial_number={}] does not belong to any source",
                k.serial_number
            )
        })
        .collect();

    for source in &blueprint.sources {
        if blueprint.intrinsics_for(&source.serial_number).is_none() {
            warnings.push(format!("source '{}' has no intrinsics", source.id));
        }
    }
    warnings
}

fn validate_source_ids(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    if blueprint.sources.is_empty() {
        return Err(ContractError::config_validation(
            "sources",
            "at least one source is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, source) in blueprint.sources.iter().enumerate() {
        if !SourceId::from(source.id.as_str()).is_valid_prefix() {
            return Err(ContractError::config_validation(
                format!("sources[{idx}].id"),
                format!(
                    "source id '{}' must be non-empty and must not contain '_'",
                    source.id
                ),
            ));
        }
        if !seen.insert(source.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }
    }
    Ok(())
}

fn validate_serial_numbers(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    for source in &blueprint.sources {
        if source.serial_number.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("sources[{}].serial_number", source.id),
                "serial number cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_sync_config(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let sync = &blueprint.sync;

    if sync.depth_threshold <= 0 {
        return Err(ContractError::config_validation(
            "sync.depth_threshold",
            format!("threshold must be > 0, got {}", sync.depth_threshold),
        ));
    }
    if let Some(colour) = sync.colour_threshold {
        if colour <= 0 {
            return Err(ContractError::config_validation(
                "sync.colour_threshold",
                format!("threshold must be > 0, got {colour}"),
            ));
        }
    }

    let declared: HashSet<&str> = blueprint.sources.iter().map(|s| s.id.as_str()).collect();
    for id in sync.clock_offsets.keys() {
        if !declared.contains(id.as_str()) {
            return Err(ContractError::config_validation(
                format!("sync.clock_offsets.{id}"),
                format!("clock offset given for undeclared source '{id}'"),
            ));
        }
    }
    Ok(())
}

fn validate_intrinsics(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for row in &blueprint.intrinsics {
        if !seen.insert(row.serial_number.as_str()) {
            return Err(ContractError::config_validation(
                format!("intrinsics[serial_number={}]", row.serial_number),
                "duplicate intrinsics row",
            ));
        }
    }
    Ok(())
}

fn validate_workset(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let corpus = lexical(&blueprint.corpus.path);
    let output_dir = lexical(&blueprint.workset.output_dir);
    if output_dir == corpus {
        return Err(ContractError::config_validation(
            "workset.output_dir",
            "output dir must differ from the corpus path",
        ));
    }
    // recreating the working dir would delete the corpus with it
    if blueprint.corpus.path.is_absolute() == blueprint.workset.output_dir.is_absolute()
        && corpus.starts_with(&output_dir)
    {
        return Err(ContractError::config_validation(
            "workset.output_dir",
            "output dir must not contain the corpus directory",
        ));
    }
    Ok(())
}

/// Path components without `.` segments, for comparing configured paths.
fn lexical(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
