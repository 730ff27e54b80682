//! `workset.json` written next to the extracted frames.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use contracts::{ColourFrameset, FrameId, Frameset, FramesetMeta, SourceId};
use serde::{Deserialize, Serialize};

use crate::error::WorksetError;
use crate::extractor::{ExtractReport, SourceFileMissing};

pub const MANIFEST_FILE: &str = "workset.json";

/// Describes where a working set came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksetManifest {
    pub created_at: DateTime<Utc>,
    pub corpus: PathBuf,
    pub sources: Vec<SourceId>,
    pub depth_frame_ids: Vec<FrameId>,
    pub colour_frame_ids: Vec<FrameId>,
    pub depth_index: usize,
    pub depth_meta: FramesetMeta,
    pub files: Vec<String>,
    pub missing: Vec<SourceFileMissing>,
}

impl WorksetManifest {
    pub fn new(
        corpus: &Path,
        sources: &[SourceId],
        depth: &Frameset,
        colour: &ColourFrameset,
        report: &ExtractReport,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            corpus: corpus.to_path_buf(),
            sources: sources.to_vec(),
            depth_frame_ids: depth.frame_ids.clone(),
            colour_frame_ids: colour.frame_ids.clone(),
            depth_index: colour.depth_index,
            depth_meta: depth.meta.clone(),
            files: report.moved.clone(),
            missing: report.missing.clone(),
        }
    }

    pub fn write(&self, working_dir: &Path) -> Result<(), WorksetError> {
        let path = working_dir.join(MANIFEST_FILE);
        let file = File::create(&path).map_err(|e| WorksetError::io("cannot create", &path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn read(working_dir: &Path) -> Result<Self, WorksetError> {
        let path = working_dir.join(MANIFEST_FILE);
        let file = File::open(&path).map_err(|e| WorksetError::io("cannot open", &path, e))?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DataKind;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_written_and_read_back() {
        let dir = TempDir::new().unwrap();
        let depth = Frameset {
            kind: DataKind::Depth,
            frame_ids: vec![4, 6],
            meta: FramesetMeta {
                reference_index: 1,
                reference_source: "raspi2".into(),
                reference_timestamp: 1_700,
                deltas: vec![-9, 0],
            },
        };
        let colour = ColourFrameset {
            frame_ids: vec![5, 5],
            depth_index: 2,
        };
        let report = ExtractReport {
            working_dir: dir.path().to_path_buf(),
            moved: vec!["raspi1_depth_4.csv".into()],
            missing: Vec::new(),
            removed: 0,
        };
        let sources: Vec<SourceId> = vec!["raspi1".into(), "raspi2".into()];

        let manifest = WorksetManifest::new(Path::new("uploads"), &sources, &depth, &colour, &report);
        manifest.write(dir.path()).unwrap();

        let read = WorksetManifest::read(dir.path()).unwrap();
        assert_eq!(read.depth_index, 2);
        assert_eq!(read.depth_meta.max_skew(), 9);
        assert_eq!(read.sources, sources);
        assert_eq!(read.files, report.moved);
    }
}
