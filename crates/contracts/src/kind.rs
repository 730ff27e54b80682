//! DataKind - which stream of a camera a frame belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data kind of a captured frame.
///
/// Each kind carries the fixed conventions of the capture format: its
/// file-name token, the default frame-file extension, and the 0-based line of
/// its metadata sidecar that holds the arrival timestamp. The 8 / 6 asymmetry
/// is part of the sidecar format written by the capture hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Raw depth map (`.csv` by default)
    Depth,
    /// Colour image (`.png`)
    Colour,
}

impl DataKind {
    /// All kinds, depth first.
    pub const ALL: [DataKind; 2] = [DataKind::Depth, DataKind::Colour];

    /// Token used in corpus file names.
    pub const fn token(self) -> &'static str {
        match self {
            DataKind::Depth => "depth",
            DataKind::Colour => "colour",
        }
    }

    /// 0-based line of the metadata sidecar holding the arrival timestamp.
    pub const fn metadata_line(self) -> usize {
        match self {
            DataKind::Depth => 8,
            DataKind::Colour => 6,
        }
    }

    /// Default frame-file extension (without the dot).
    pub const fn default_extension(self) -> &'static str {
        match self {
            DataKind::Depth => "csv",
            DataKind::Colour => "png",
        }
    }

    /// Parse a file-name token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "depth" => Some(DataKind::Depth),
            "colour" => Some(DataKind::Colour),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "color" => Ok(DataKind::Colour),
            other => DataKind::from_token(other).ok_or_else(|| format!("unknown data kind: {s}")),
        }
    }
}
