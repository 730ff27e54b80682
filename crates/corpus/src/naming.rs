//! Corpus file names.
//!
//! `<source>_<kind>_<frame>.<ext>` for frames,
//! `<source>_<kind>_metadata_<frame>.txt` for sidecars and
//! `<source>_depth_image_<frame>.png` for the rendered depth byproduct.

use contracts::{DataKind, FrameId};

const SEPARATOR: char = '_';
const METADATA_TOKEN: &str = "metadata";
const IMAGE_TOKEN: &str = "image";
const METADATA_EXTENSION: &str = "txt";

/// File name of a frame.
pub fn frame_file_name(source: &str, kind: DataKind, frame: FrameId, extension: &str) -> String {
    format!("{source}_{kind}_{frame}.{extension}")
}

/// File name of a frame's metadata sidecar.
pub fn metadata_file_name(source: &str, kind: DataKind, frame: FrameId) -> String {
    format!("{source}_{kind}_{METADATA_TOKEN}_{frame}.{METADATA_EXTENSION}")
}

/// The (source, kind, frame) triple encoded in a corpus file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameName {
    pub source: String,
    pub kind: DataKind,
    pub frame: FrameId,
    pub extension: String,
}

/// Classification of one directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusName {
    /// A frame file
    Frame(FrameName),
    /// A metadata sidecar
    Metadata(FrameName),
    /// Depth map rendered as an image
    DepthImage(FrameName),
    /// Looks like a corpus file of `source`/`kind` but cannot be decoded
    Malformed {
        source: String,
        kind: DataKind,
        reason: &'static str,
    },
    /// Not a corpus file
    Foreign,
}

impl CorpusName {
    /// Classify a bare file name (no directory part).
    pub fn parse(file_name: &str) -> Self {
        let Some((stem, extension)) = file_name.rsplit_once('.') else {
            return Self::Foreign;
        };
        let tokens: Vec<&str> = stem.split(SEPARATOR).collect();
        if tokens.len() < 2 {
            return Self::Foreign;
        }
        let Some(kind) = DataKind::from_token(tokens[1]) else {
            return Self::Foreign;
        };
        let source = tokens[0].to_string();

        let malformed = |reason| Self::Malformed {
            source: source.clone(),
            kind,
            reason,
        };
        let name = |frame: &str| {
            frame.parse::<FrameId>().ok().map(|frame| FrameName {
                source: source.clone(),
                kind,
                frame,
                extension: extension.to_string(),
            })
        };

        match tokens.as_slice() {
            [_, _, frame] => name(*frame)
                .map(Self::Frame)
                .unwrap_or_else(|| malformed("frame id is not a number")),
            [_, _, token, frame] if *token == METADATA_TOKEN => name(*frame)
                .map(Self::Metadata)
                .unwrap_or_else(|| malformed("frame id is not a number")),
            [_, _, token, frame] if *token == IMAGE_TOKEN && kind == DataKind::Depth => name(*frame)
                .map(Self::DepthImage)
                .unwrap_or_else(|| malformed("frame id is not a number")),
            [_, _] => malformed("missing frame id"),
            _ => malformed("unexpected number of name segments"),
        }
    }

    /// Source and kind the name belongs to, when known.
    pub fn owner(&self) -> Option<(&str, DataKind)> {
        match self {
            Self::Frame(n) | Self::Metadata(n) | Self::DepthImage(n) => Some((&n.source, n.kind)),
            Self::Malformed { source, kind, .. } => Some((source, *kind)),
            Self::Foreign => None,
        }
    }
}
