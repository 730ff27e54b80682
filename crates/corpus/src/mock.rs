//! Mock corpus
//!
//! Writes synthetic capture files for tests without camera hosts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use contracts::{DataKind, FrameId, Timestamp};

use crate::naming::{frame_file_name, metadata_file_name};

/// Writes frames and sidecars in the capture hosts' layout.
#[derive(Debug, Clone)]
pub struct MockCorpus {
    root: PathBuf,
    depth_extension: String,
}

impl MockCorpus {
    /// Mock corpus rooted at an existing directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            depth_extension: DataKind::Depth.default_extension().to_string(),
        }
    }

    pub fn with_depth_extension(mut self, extension: impl Into<String>) -> Self {
        self.depth_extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one frame file and its sidecar.
    pub fn add_frame(
        &self,
        source: &str,
        kind: DataKind,
        frame: FrameId,
        timestamp: Timestamp,
    ) -> io::Result<()> {
        let extension = match kind {
            DataKind::Depth => self.depth_extension.as_str(),
            DataKind::Colour => kind.default_extension(),
        };
        let payload: &[u8] = match kind {
            DataKind::Depth => b"0,0,0\n0,0,0\n",
            DataKind::Colour => b"\x89PNG\r\n\x1a\n",
        };
        fs::write(
            self.root
                .join(frame_file_name(source, kind, frame, extension)),
            payload,
        )?;
        self.add_metadata(source, kind, frame, timestamp)
    }

    /// Write only the sidecar of a frame.
    pub fn add_metadata(
        &self,
        source: &str,
        kind: DataKind,
        frame: FrameId,
        timestamp: Timestamp,
    ) -> io::Result<()> {
        fs::write(
            self.root.join(metadata_file_name(source, kind, frame)),
            sidecar(kind, frame, timestamp),
        )
    }

    /// Frames `0..timestamps.len()` with the given arrival timestamps.
    pub fn add_timestamps(
        &self,
        source: &str,
        kind: DataKind,
        timestamps: &[Timestamp],
    ) -> io::Result<()> {
        timestamps
            .iter()
            .enumerate()
            .try_for_each(|(frame, &ts)| self.add_frame(source, kind, frame as FrameId, ts))
    }

    /// Depth map rendered as PNG next to the raw frame.
    pub fn add_depth_image(&self, source: &str, frame: FrameId) -> io::Result<()> {
        fs::write(
            self.root.join(format!("{source}_depth_image_{frame}.png")),
            b"\x89PNG\r\n\x1a\n",
        )
    }

    /// Arbitrary file, for names the corpus must tolerate.
    pub fn add_raw(&self, file_name: &str, contents: &str) -> io::Result<()> {
        fs::write(self.root.join(file_name), contents)
    }
}

fn sidecar(kind: DataKind, frame: FrameId, timestamp: Timestamp) -> String {
    let mut lines = vec![
        format!("Type,{}", kind.token()),
        format!("Frame Number,{frame}"),
        "Frame Timestamp,0".to_string(),
        "Clock Domain,Global Time".to_string(),
        "Backend Timestamp,0".to_string(),
        "Actual FPS,30".to_string(),
        "Sensor Timestamp,0".to_string(),
        "Exposure,8500".to_string(),
    ];
    lines.truncate(kind.metadata_line());
    lines.push(format!("Time Of Arrival,{timestamp}"));
    lines.push("Resolution,640x480".to_string());
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_layout() {
        let depth = sidecar(DataKind::Depth, 3, 1234);
        assert_eq!(depth.lines().nth(8), Some("Time Of Arrival,1234"));
        let colour = sidecar(DataKind::Colour, 3, 987);
        assert_eq!(colour.lines().nth(6), Some("Time Of Arrival,987"));
    }

    #[test]
    fn test_add_timestamps_writes_pairs() {
        let dir = TempDir::new().unwrap();
        let mock = MockCorpus::new(dir.path());
        mock.add_timestamps("raspi1", DataKind::Colour, &[10, 20])
            .unwrap();
        assert!(dir.path().join("raspi1_colour_0.png").is_file());
        assert!(dir.path().join("raspi1_colour_metadata_1.txt").is_file());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
    }
}
