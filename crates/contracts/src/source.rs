//! Source - one camera + host capture unit.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{DataKind, SourceId};

/// Pinhole intrinsics of one camera, keyed by its serial number.
///
/// One row of the intrinsics side-table consumed by downstream reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CameraIntrinsics {
    /// Camera serial number (lookup key)
    #[validate(length(min = 1))]
    pub serial_number: String,

    /// Focal length x (pixels)
    #[validate(range(exclusive_min = 0.0))]
    pub fx: f64,

    /// Focal length y (pixels)
    #[validate(range(exclusive_min = 0.0))]
    pub fy: f64,

    /// Principal point x (pixels)
    pub ppx: f64,

    /// Principal point y (pixels)
    pub ppy: f64,

    /// Image width the intrinsics were calibrated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Image height the intrinsics were calibrated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl CameraIntrinsics {
    /// 3x3 camera matrix `K`.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.ppx, //
            0.0, self.fy, self.ppy, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Number of frames a source captured, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounts {
    pub depth: usize,
    pub colour: usize,
}

impl FrameCounts {
    pub fn get(&self, kind: DataKind) -> usize {
        match kind {
            DataKind::Depth => self.depth,
            DataKind::Colour => self.colour,
        }
    }

    pub fn set(&mut self, kind: DataKind, count: usize) {
        match kind {
            DataKind::Depth => self.depth = count,
            DataKind::Colour => self.colour = count,
        }
    }
}

/// A capture source.
///
/// Immutable once built: the builder-style methods consume and return `Self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    id: SourceId,
    serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intrinsics: Option<CameraIntrinsics>,
    #[serde(default)]
    frame_counts: FrameCounts,
}

impl Source {
    pub fn new(id: impl Into<SourceId>, serial_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            serial_number: serial_number.into(),
            intrinsics: None,
            frame_counts: FrameCounts::default(),
        }
    }

    pub fn with_intrinsics(mut self, intrinsics: Option<CameraIntrinsics>) -> Self {
        self.intrinsics = intrinsics;
        self
    }

    pub fn with_frame_counts(mut self, frame_counts: FrameCounts) -> Self {
        self.frame_counts = frame_counts;
        self
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Corpus file-name prefix of this source.
    pub fn prefix(&self) -> &str {
        self.id.as_str()
    }

    /// Serial number, the key into the intrinsics side-table.
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn intrinsics(&self) -> Option<&CameraIntrinsics> {
        self.intrinsics.as_ref()
    }

    pub fn frame_counts(&self) -> FrameCounts {
        self.frame_counts
    }

    pub fn frame_count(&self, kind: DataKind) -> usize {
        self.frame_counts.get(kind)
    }
}
