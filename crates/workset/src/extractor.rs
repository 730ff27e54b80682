//! Working-Set Extractor - moves one frameset out of the corpus.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use contracts::{ColourFrameset, DataKind, FrameId, Frameset, SourceId};
use corpus::{frame_file_name, metadata_file_name};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::WorksetError;
use crate::manifest::WorksetManifest;

/// A frame file that was expected in the corpus but not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileMissing {
    pub source: SourceId,
    pub kind: DataKind,
    pub file: String,
}

/// Outcome of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    pub working_dir: PathBuf,
    /// File names now present in the working dir
    pub moved: Vec<String>,
    pub missing: Vec<SourceFileMissing>,
    /// Corpus entries deleted afterwards
    pub removed: usize,
}

impl ExtractReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Moves the files of one (depth, colour) frameset pair into a fresh
/// working directory.
///
/// Not transactional: a failure part way leaves the files moved so far in
/// the working directory.
#[derive(Debug, Clone)]
pub struct Extractor {
    corpus: PathBuf,
    working_dir: PathBuf,
    depth_extension: String,
    delete_remainder: bool,
}

impl Extractor {
    pub fn new(corpus: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus: corpus.into(),
            working_dir: working_dir.into(),
            depth_extension: DataKind::Depth.default_extension().to_string(),
            delete_remainder: false,
        }
    }

    pub fn with_depth_extension(mut self, extension: impl Into<String>) -> Self {
        self.depth_extension = extension.into();
        self
    }

    /// Delete everything else in the corpus after the move.
    pub fn with_delete_remainder(mut self, delete_remainder: bool) -> Self {
        self.delete_remainder = delete_remainder;
        self
    }

    /// Extract `depth` and `colour` for `sources` (same column order).
    #[instrument(
        name = "workset_extract",
        skip(self, sources, depth, colour),
        fields(working_dir = %self.working_dir.display(), depth_index = colour.depth_index)
    )]
    pub fn extract(
        &self,
        sources: &[SourceId],
        depth: &Frameset,
        colour: &ColourFrameset,
    ) -> Result<ExtractReport, WorksetError> {
        for actual in [depth.frame_ids.len(), colour.frame_ids.len()] {
            if actual != sources.len() {
                return Err(WorksetError::FramesetShape {
                    expected: sources.len(),
                    actual,
                });
            }
        }
        self.check_locations()?;

        self.recreate_working_dir()?;

        let mut report = ExtractReport {
            working_dir: self.working_dir.clone(),
            moved: Vec::new(),
            missing: Vec::new(),
            removed: 0,
        };

        for (i, source) in sources.iter().enumerate() {
            for (kind, frame) in [
                (DataKind::Depth, depth.frame_ids[i]),
                (DataKind::Colour, colour.frame_ids[i]),
            ] {
                for file in self.files_of(source, kind, frame) {
                    self.move_one(source, kind, file, &mut report)?;
                }
            }
        }

        if self.delete_remainder {
            report.removed = self.delete_remainder_of_corpus()?;
        }

        let manifest = WorksetManifest::new(&self.corpus, sources, depth, colour, &report);
        manifest.write(&self.working_dir)?;

        metrics::counter!("workset_files_moved_total").increment(report.moved.len() as u64);
        metrics::counter!("workset_files_missing_total").increment(report.missing.len() as u64);
        info!(
            moved = report.moved.len(),
            missing = report.missing.len(),
            removed = report.removed,
            "working set extracted"
        );
        Ok(report)
    }

    fn files_of(&self, source: &str, kind: DataKind, frame: FrameId) -> [String; 2] {
        let extension = match kind {
            DataKind::Depth => self.depth_extension.as_str(),
            DataKind::Colour => kind.default_extension(),
        };
        [
            frame_file_name(source, kind, frame, extension),
            metadata_file_name(source, kind, frame),
        ]
    }

    /// The working dir is recreated empty, so it must be neither the corpus
    /// nor one of its parents.
    fn check_locations(&self) -> Result<(), WorksetError> {
        let corpus = resolve(&self.corpus)
            .map_err(|e| WorksetError::io("cannot resolve", &self.corpus, e))?;
        let working_dir = resolve(&self.working_dir)
            .map_err(|e| WorksetError::io("cannot resolve", &self.working_dir, e))?;

        if corpus == working_dir {
            return Err(WorksetError::WorkingDirIsCorpus {
                path: self.working_dir.clone(),
            });
        }
        if corpus.starts_with(&working_dir) {
            return Err(WorksetError::WorkingDirContainsCorpus {
                working_dir: self.working_dir.clone(),
                corpus: self.corpus.clone(),
            });
        }
        Ok(())
    }

    fn recreate_working_dir(&self) -> Result<(), WorksetError> {
        match fs::remove_dir_all(&self.working_dir) {
            Ok(()) => debug!("removed previous working dir"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(WorksetError::io("cannot clear", &self.working_dir, e)),
        }
        fs::create_dir_all(&self.working_dir)
            .map_err(|e| WorksetError::io("cannot create", &self.working_dir, e))
    }

    fn move_one(
        &self,
        source: &SourceId,
        kind: DataKind,
        file: String,
        report: &mut ExtractReport,
    ) -> Result<(), WorksetError> {
        let from = self.corpus.join(&file);
        let to = self.working_dir.join(&file);

        match move_file(&from, &to) {
            Ok(()) => {
                debug!(file = %file, "moved");
                report.moved.push(file);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(source = %source, %kind, file = %file, "source file missing");
                report.missing.push(SourceFileMissing {
                    source: source.clone(),
                    kind,
                    file,
                });
            }
            Err(e) => return Err(WorksetError::io("cannot move", from, e)),
        }
        Ok(())
    }

    fn delete_remainder_of_corpus(&self) -> Result<usize, WorksetError> {
        let working_dir = fs::canonicalize(&self.working_dir)
            .map_err(|e| WorksetError::io("cannot resolve", &self.working_dir, e))?;
        let entries =
            fs::read_dir(&self.corpus).map_err(|e| WorksetError::io("cannot list", &self.corpus, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| WorksetError::io("cannot list", &self.corpus, e))?;
            let path = entry.path();
            if fs::canonicalize(&path).is_ok_and(|p| p == working_dir) {
                continue;
            }
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| WorksetError::io("cannot delete", &path, e))?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Canonical form of `path`, which need not exist yet: the deepest existing
/// ancestor is canonicalized and the remaining components are appended.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        match fs::canonicalize(existing) {
            Ok(mut resolved) => {
                for component in missing.iter().rev() {
                    resolved.push(component);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                missing.push(name.to_os_string());
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MANIFEST_FILE;
    use contracts::FramesetMeta;
    use corpus::MockCorpus;
    use tempfile::TempDir;

    fn sources() -> Vec<SourceId> {
        vec!["raspi1".into(), "raspi2".into()]
    }

    fn pair(depth: Vec<FrameId>, colour: Vec<FrameId>) -> (Frameset, ColourFrameset) {
        (
            Frameset {
                kind: DataKind::Depth,
                frame_ids: depth,
                meta: FramesetMeta::default(),
            },
            ColourFrameset {
                frame_ids: colour,
                depth_index: 3,
            },
        )
    }

    fn corpus() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let uploads = dir.path().join("uploads");
        fs::create_dir(&uploads).unwrap();
        let mock = MockCorpus::new(&uploads);
        for source in ["raspi1", "raspi2"] {
            mock.add_timestamps(source, DataKind::Depth, &[100, 200]).unwrap();
            mock.add_timestamps(source, DataKind::Colour, &[98, 199]).unwrap();
        }
        (dir, uploads)
    }

    #[test]
    fn test_moves_frames_and_sidecars() {
        let (dir, uploads) = corpus();
        let work = dir.path().join("processing_data");
        let (depth, colour) = pair(vec![1, 0], vec![1, 1]);

        let report = Extractor::new(&uploads, &work)
            .extract(&sources(), &depth, &colour)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.moved.len(), 8);
        for name in [
            "raspi1_depth_1.csv",
            "raspi1_depth_metadata_1.txt",
            "raspi1_colour_1.png",
            "raspi1_colour_metadata_1.txt",
            "raspi2_depth_0.csv",
            "raspi2_colour_metadata_1.txt",
        ] {
            assert!(work.join(name).is_file(), "{name} not moved");
            assert!(!uploads.join(name).exists(), "{name} still in corpus");
        }
        assert!(work.join(MANIFEST_FILE).is_file());
        assert!(uploads.join("raspi1_depth_0.csv").is_file());
    }

    #[test]
    fn test_working_dir_is_recreated() {
        let (dir, uploads) = corpus();
        let work = dir.path().join("processing_data");
        fs::create_dir(&work).unwrap();
        fs::write(work.join("stale.ply"), "old").unwrap();
        let (depth, colour) = pair(vec![0, 0], vec![0, 0]);

        Extractor::new(&uploads, &work)
            .extract(&sources(), &depth, &colour)
            .unwrap();
        assert!(!work.join("stale.ply").exists());
    }

    #[test]
    fn test_missing_file_does_not_abort() {
        let (dir, uploads) = corpus();
        fs::remove_file(uploads.join("raspi1_colour_0.png")).unwrap();
        let work = dir.path().join("processing_data");
        let (depth, colour) = pair(vec![0, 0], vec![0, 0]);

        let report = Extractor::new(&uploads, &work)
            .extract(&sources(), &depth, &colour)
            .unwrap();
        assert_eq!(
            report.missing,
            vec![SourceFileMissing {
                source: "raspi1".into(),
                kind: DataKind::Colour,
                file: "raspi1_colour_0.png".into(),
            }]
        );
        assert_eq!(report.moved.len(), 7);
        assert!(work.join("raspi2_colour_0.png").is_file());
    }

    #[test]
    fn test_delete_remainder_keeps_nested_working_dir() {
        let (_dir, uploads) = corpus();
        let work = uploads.join("processing_data");
        let (depth, colour) = pair(vec![1, 1], vec![1, 1]);

        let report = Extractor::new(&uploads, &work)
            .with_delete_remainder(true)
            .extract(&sources(), &depth, &colour)
            .unwrap();

        assert_eq!(report.removed, 8);
        let left: Vec<_> = fs::read_dir(&uploads).unwrap().collect();
        assert_eq!(left.len(), 1);
        assert_eq!(fs::read_dir(&work).unwrap().count(), 9);
    }

    #[test]
    fn test_rejects_corpus_as_working_dir() {
        let (_dir, uploads) = corpus();
        let (depth, colour) = pair(vec![0, 0], vec![0, 0]);
        let err = Extractor::new(&uploads, uploads.join("."))
            .extract(&sources(), &depth, &colour)
            .unwrap_err();
        assert!(matches!(err, WorksetError::WorkingDirIsCorpus { .. }));
        assert!(uploads.join("raspi1_depth_0.csv").is_file());
    }

    #[test]
    fn test_rejects_parent_of_corpus_as_working_dir() {
        let (dir, uploads) = corpus();
        let (depth, colour) = pair(vec![0, 0], vec![0, 0]);

        for parent in [dir.path().to_path_buf(), uploads.join("..")] {
            let err = Extractor::new(&uploads, &parent)
                .extract(&sources(), &depth, &colour)
                .unwrap_err();
            assert!(
                matches!(err, WorksetError::WorkingDirContainsCorpus { .. }),
                "{err}"
            );
        }
        assert!(uploads.join("raspi1_depth_0.csv").is_file());
        assert!(uploads.join("raspi2_colour_metadata_0.txt").is_file());
    }

    #[test]
    fn test_resolve_handles_missing_tail() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve(&dir.path().join("a/b")).unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(resolved, base.join("a").join("b"));
    }

    #[test]
    fn test_rejects_mismatched_frameset() {
        let (dir, uploads) = corpus();
        let (depth, colour) = pair(vec![0, 0], vec![0]);
        let err = Extractor::new(&uploads, dir.path().join("work"))
            .extract(&sources(), &depth, &colour)
            .unwrap_err();
        assert!(matches!(
            err,
            WorksetError::FramesetShape {
                expected: 2,
                actual: 1
            }
        ));
    }
}
