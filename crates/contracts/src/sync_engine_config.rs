//! Sync engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::{DataKind, SourceId, Timestamp};

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEngineConfig {
    /// Cross-source tolerance for depth matching (exclusive)
    pub depth_threshold: Timestamp,

    /// Depth-to-colour tolerance within one source (exclusive)
    pub colour_threshold: Timestamp,

    /// Unit of the stored arrival timestamps
    #[serde(default)]
    pub unit: TimeUnit,

    /// Static offset added to each source's timestamps (missing = 0)
    #[serde(default)]
    pub clock_offsets: HashMap<SourceId, Timestamp>,

    /// Memoize metadata reads for the duration of one run
    #[serde(default = "default_cache_metadata")]
    pub cache_metadata: bool,
}

fn default_cache_metadata() -> bool {
    true
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            depth_threshold: 66,
            colour_threshold: 66,
            unit: TimeUnit::default(),
            clock_offsets: HashMap::new(),
            cache_metadata: true,
        }
    }
}

impl SyncEngineConfig {
    /// Matching tolerance used when synchronizing `kind` frames
    pub fn threshold(&self, kind: DataKind) -> Timestamp {
        match kind {
            DataKind::Depth => self.depth_threshold,
            DataKind::Colour => self.colour_threshold,
        }
    }

    /// Configured clock offset of `source`
    pub fn clock_offset(&self, source: &str) -> Timestamp {
        self.clock_offsets.get(source).copied().unwrap_or(0)
    }
}

/// Unit of arrival timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Host arrival time in milliseconds
    #[default]
    Milliseconds,
    /// Host arrival time in microseconds
    Microseconds,
    /// Raw device ticks
    DeviceTicks,
}

impl TimeUnit {
    /// Short suffix used when printing timestamps
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
            TimeUnit::DeviceTicks => "ticks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}
