//! Workset error types

use std::path::PathBuf;

use thiserror::Error;

/// Extraction errors
///
/// A single missing frame file is not an error; it is reported in
/// `ExtractReport::missing`.
#[derive(Debug, Error)]
pub enum WorksetError {
    /// Working dir would replace the corpus itself
    #[error("working directory '{}' is the corpus directory", path.display())]
    WorkingDirIsCorpus { path: PathBuf },

    /// Recreating the working dir would delete the corpus inside it
    #[error(
        "working directory '{}' contains the corpus directory '{}'",
        working_dir.display(),
        corpus.display()
    )]
    WorkingDirContainsCorpus { working_dir: PathBuf, corpus: PathBuf },

    /// Depth and colour framesets disagree with the source list
    #[error("frameset has {actual} frame ids but {expected} sources were given")]
    FramesetShape { expected: usize, actual: usize },

    /// Filesystem operation failed
    #[error("{action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be serialized
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl WorksetError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
