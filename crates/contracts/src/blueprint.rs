//! CaptureBlueprint - Config Loader output
//!
//! Describes one capture corpus: where it lives, which sources produced it,
//! how to synchronize it and where to extract working sets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

use crate::{CameraIntrinsics, DataKind, Source, SourceId, SyncEngineConfig, TimeUnit, Timestamp};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CaptureBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Corpus location
    pub corpus: CorpusConfig,

    /// Capture sources, in the fixed order used by every frameset
    #[validate(length(min = 1))]
    pub sources: Vec<SourceConfig>,

    /// Synchronization parameters
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    /// Camera intrinsics side-table
    #[serde(default)]
    #[validate(nested)]
    pub intrinsics: Vec<CameraIntrinsics>,

    /// Working-set extraction
    #[serde(default)]
    pub workset: WorksetConfig,
}

/// Corpus directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Flat directory holding every captured file
    pub path: PathBuf,

    /// Extension of depth frame files
    #[serde(default = "default_depth_extension")]
    pub depth_extension: String,
}

fn default_depth_extension() -> String {
    DataKind::Depth.default_extension().to_string()
}

impl CorpusConfig {
    /// Frame-file extension for `kind`
    pub fn extension(&self, kind: DataKind) -> &str {
        match kind {
            DataKind::Depth => &self.depth_extension,
            DataKind::Colour => DataKind::Colour.default_extension(),
        }
    }
}

/// One declared capture source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name, also the corpus file-name prefix
    pub id: String,

    /// Camera serial number
    pub serial_number: String,
}

/// Synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// Cross-source depth tolerance
    #[serde(default = "default_threshold")]
    #[validate(range(min = 1))]
    pub depth_threshold: Timestamp,

    /// Depth-to-colour tolerance; falls back to `depth_threshold`
    #[serde(default)]
    #[validate(range(min = 1))]
    pub colour_threshold: Option<Timestamp>,

    #[serde(default)]
    pub unit: TimeUnit,

    #[serde(default)]
    pub clock_offsets: HashMap<String, Timestamp>,

    #[serde(default = "default_cache_metadata")]
    pub cache_metadata: bool,
}

fn default_threshold() -> Timestamp {
    66
}

fn default_cache_metadata() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            depth_threshold: default_threshold(),
            colour_threshold: None,
            unit: TimeUnit::default(),
            clock_offsets: HashMap::new(),
            cache_metadata: true,
        }
    }
}

/// Working-set extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksetConfig {
    /// Directory (re)created to hold the extracted frames
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Delete the rest of the corpus after extraction
    #[serde(default)]
    pub delete_remainder: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("processing_data")
}

impl Default for WorksetConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delete_remainder: false,
        }
    }
}

impl CaptureBlueprint {
    /// Source ids in declaration order
    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources
            .iter()
            .map(|s| SourceId::from(s.id.as_str()))
            .collect()
    }

    /// Sources in declaration order, with intrinsics attached when known
    pub fn sources(&self) -> Vec<Source> {
        self.sources
            .iter()
            .map(|s| {
                Source::new(s.id.as_str(), s.serial_number.as_str())
                    .with_intrinsics(self.intrinsics_for(&s.serial_number).cloned())
            })
            .collect()
    }

    /// Intrinsics row for a camera serial number
    pub fn intrinsics_for(&self, serial_number: &str) -> Option<&CameraIntrinsics> {
        self.intrinsics
            .iter()
            .find(|k| k.serial_number == serial_number)
    }

    /// Build a SyncEngineConfig from the sync section
    pub fn to_sync_engine_config(&self) -> SyncEngineConfig {
        let clock_offsets = self
            .sync
            .clock_offsets
            .iter()
            .map(|(id, offset)| (SourceId::from(id.as_str()), *offset))
            .collect();

        SyncEngineConfig {
            depth_threshold: self.sync.depth_threshold,
            colour_threshold: self
                .sync
                .colour_threshold
                .unwrap_or(self.sync.depth_threshold),
            unit: self.sync.unit,
            clock_offsets,
            cache_metadata: self.sync.cache_metadata,
        }
    }
}
