//! FrameCatalog / TimestampSource traits - Sync Engine input interface
//!
//! Decouple the matching algorithm from where frames and timestamps live.
//! The on-disk corpus implements both; tests use in-memory tables.

use crate::{ContractError, DataKind, FrameId, SourceId, Timestamp};

/// Enumerates the frames available per source and kind.
pub trait FrameCatalog {
    /// Frame ids of `source` for `kind`, sorted ascending.
    ///
    /// # Errors
    /// Returns an error when the underlying storage cannot be listed.
    fn frame_ids(&self, source: &SourceId, kind: DataKind) -> Result<Vec<FrameId>, ContractError>;

    /// Number of frames of `source` for `kind`.
    fn count_frames(&self, source: &SourceId, kind: DataKind) -> Result<usize, ContractError> {
        Ok(self.frame_ids(source, kind)?.len())
    }
}

/// Resolves the arrival timestamp of one frame.
///
/// Takes `&mut self` so implementations may memoize within a run.
pub trait TimestampSource {
    /// # Errors
    /// `MetadataMissing` / `MetadataMalformed` when the timestamp cannot be read.
    fn arrival_timestamp(
        &mut self,
        source: &SourceId,
        kind: DataKind,
        frame: FrameId,
    ) -> Result<Timestamp, ContractError>;
}

impl<T: TimestampSource + ?Sized> TimestampSource for &mut T {
    fn arrival_timestamp(
        &mut self,
        source: &SourceId,
        kind: DataKind,
        frame: FrameId,
    ) -> Result<Timestamp, ContractError> {
        (**self).arrival_timestamp(source, kind, frame)
    }
}

impl<T: FrameCatalog + ?Sized> FrameCatalog for &T {
    fn frame_ids(&self, source: &SourceId, kind: DataKind) -> Result<Vec<FrameId>, ContractError> {
        (**self).frame_ids(source, kind)
    }

    fn count_frames(&self, source: &SourceId, kind: DataKind) -> Result<usize, ContractError> {
        (**self).count_frames(source, kind)
    }
}
