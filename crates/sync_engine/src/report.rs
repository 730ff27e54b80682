//! Run results.

use std::collections::BTreeMap;

use contracts::{ColourFrameset, DataKind, Frameset, SourceId, TimeUnit, Timestamp};
use serde::{Deserialize, Serialize};

/// Counters of one matcher run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Matching tolerance used
    pub threshold: Timestamp,
    /// Matcher iterations (emitted + discarded)
    pub iterations: u64,
    pub emitted: u64,
    pub discarded: u64,
    /// Discarded iterations each source failed to match in
    pub misses: BTreeMap<SourceId, u64>,
    /// Sidecar reads that reached the disk
    pub metadata_reads: u64,
    pub cache_hits: u64,
}

/// Framesets of one kind plus how they were obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    pub kind: DataKind,
    pub sources: Vec<SourceId>,
    pub framesets: Vec<Frameset>,
    pub stats: SyncStats,
}

impl SyncRun {
    pub fn is_empty(&self) -> bool {
        self.framesets.is_empty()
    }
}

/// Counters of one binder run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindStats {
    pub threshold: Timestamp,
    /// Depth framesets offered to the binder
    pub depth_framesets: u64,
    pub bound: u64,
    pub unbound: u64,
    pub metadata_reads: u64,
    pub cache_hits: u64,
}

/// Colour framesets bound to a depth run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRun {
    pub colour: Vec<ColourFrameset>,
    pub stats: BindStats,
}

/// Depth synchronization followed by colour binding.
///
/// This is what `framesync sync --output` writes as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Unit of every timestamp and threshold in the report
    pub unit: TimeUnit,
    pub depth: SyncRun,
    pub colour: BindRun,
}

impl SyncReport {
    pub fn sources(&self) -> &[SourceId] {
        &self.depth.sources
    }

    /// Colour frameset `index` together with the depth frameset it points to
    pub fn pair(&self, index: usize) -> Option<(&Frameset, &ColourFrameset)> {
        let colour = self.colour.colour.get(index)?;
        let depth = self.depth.framesets.get(colour.depth_index)?;
        Some((depth, colour))
    }
}
