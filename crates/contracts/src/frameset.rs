//! Frameset - Sync Engine output
//!
//! Groups of frame identifiers judged simultaneous, one per source.

use serde::{Deserialize, Serialize};

use crate::{DataKind, SourceId};

/// Per-(source, kind) frame sequence number.
pub type FrameId = u64;

/// Arrival timestamp, in the unit declared by `SyncEngineConfig::unit`.
pub type Timestamp = i64;

/// Frames of every source that arrived within the threshold of each other.
///
/// `frame_ids[i]` belongs to the i-th source of the run; the source order is
/// fixed for a run and shared by every frameset it emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frameset {
    /// Kind of the matched frames
    pub kind: DataKind,

    /// One frame id per source, in source order
    pub frame_ids: Vec<FrameId>,

    /// Matching metadata
    pub meta: FramesetMeta,
}

impl Frameset {
    /// Number of sources in the frameset
    pub fn len(&self) -> usize {
        self.frame_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_ids.is_empty()
    }

    /// Frame id of the source at `index`
    pub fn frame_id(&self, index: usize) -> Option<FrameId> {
        self.frame_ids.get(index).copied()
    }
}

/// How a frameset was matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramesetMeta {
    /// Position of the reference source in the source order
    pub reference_index: usize,

    /// Source whose frame had the latest arrival timestamp
    pub reference_source: SourceId,

    /// Arrival timestamp of the reference frame
    pub reference_timestamp: Timestamp,

    /// `timestamp - reference_timestamp` per source, in source order
    pub deltas: Vec<Timestamp>,
}

impl FramesetMeta {
    /// Largest absolute distance of any frame from the reference.
    pub fn max_skew(&self) -> Timestamp {
        self.deltas.iter().map(|d| d.abs()).max().unwrap_or(0)
    }
}

/// Colour frames bound to one depth frameset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourFrameset {
    /// One colour frame id per source, in the depth frameset's source order
    pub frame_ids: Vec<FrameId>,

    /// Index of the depth frameset this colour frameset was matched against
    pub depth_index: usize,
}

impl ColourFrameset {
    /// Frame ids followed by the depth frameset index as a trailing tag.
    pub fn to_tagged(&self) -> Vec<u64> {
        let mut tagged = self.frame_ids.clone();
        tagged.push(self.depth_index as u64);
        tagged
    }
}
