//! Corpus Index - per-source frame enumeration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use contracts::{ContractError, DataKind, FrameCatalog, FrameCounts, FrameId, SourceId};
use tracing::{debug, warn};

use crate::naming::CorpusName;

/// Read-only view over a flat corpus directory.
///
/// Every query rescans the directory; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    root: PathBuf,
    depth_extension: String,
}

impl CorpusIndex {
    pub fn new(root: impl Into<PathBuf>, depth_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            depth_extension: depth_extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Frame-file extension expected for `kind`
    pub fn extension(&self, kind: DataKind) -> &str {
        match kind {
            DataKind::Depth => &self.depth_extension,
            DataKind::Colour => DataKind::Colour.default_extension(),
        }
    }

    /// Sorted frame ids of `source` for `kind`.
    pub fn list_frame_identifiers(
        &self,
        source: &str,
        kind: DataKind,
    ) -> Result<Vec<FrameId>, ContractError> {
        let extension = self.extension(kind);
        let mut ids = Vec::new();

        for name in self.file_names()? {
            match CorpusName::parse(&name) {
                CorpusName::Frame(frame)
                    if frame.source == source
                        && frame.kind == kind
                        && frame.extension == extension =>
                {
                    ids.push(frame.frame);
                }
                CorpusName::Malformed {
                    source: owner,
                    kind: owner_kind,
                    reason,
                } if owner == source && owner_kind == kind => {
                    warn!(file = %name, reason, "skipping malformed corpus file name");
                    metrics::counter!("corpus_filenames_skipped_total", "source" => source.to_string())
                        .increment(1);
                }
                _ => {}
            }
        }

        ids.sort_unstable();
        debug!(source, %kind, count = ids.len(), "listed frame identifiers");
        Ok(ids)
    }

    /// Frame counts of every source found in the corpus, keyed by source name.
    pub fn summary(&self) -> Result<CorpusSummary, ContractError> {
        let mut sources: BTreeMap<String, FrameCounts> = BTreeMap::new();
        let mut metadata_files = 0;
        let mut foreign_files = 0;

        for name in self.file_names()? {
            match CorpusName::parse(&name) {
                CorpusName::Frame(frame) if frame.extension == self.extension(frame.kind) => {
                    let counts = sources.entry(frame.source).or_default();
                    counts.set(frame.kind, counts.get(frame.kind) + 1);
                }
                CorpusName::Metadata(_) => metadata_files += 1,
                CorpusName::Foreign => foreign_files += 1,
                _ => {}
            }
        }

        Ok(CorpusSummary {
            sources,
            metadata_files,
            foreign_files,
        })
    }

    fn file_names(&self) -> Result<Vec<String>, ContractError> {
        let unreadable = |source| ContractError::CorpusUnreadable {
            path: self.root.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map_err(unreadable)?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(file = ?raw, "skipping non UTF-8 file name"),
            }
        }
        Ok(names)
    }
}

impl FrameCatalog for CorpusIndex {
    fn frame_ids(&self, source: &SourceId, kind: DataKind) -> Result<Vec<FrameId>, ContractError> {
        self.list_frame_identifiers(source.as_str(), kind)
    }
}

/// Result of one full corpus scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    /// Frame counts per source prefix found on disk
    pub sources: BTreeMap<String, FrameCounts>,
    pub metadata_files: usize,
    pub foreign_files: usize,
}

impl CorpusSummary {
    pub fn counts(&self, source: &str) -> FrameCounts {
        self.sources.get(source).copied().unwrap_or_default()
    }
}
