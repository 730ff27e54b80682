//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;
use workset::WorksetError;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Corpus directory named by the configuration does not exist
    #[error("Corpus directory not found: {}", path.display())]
    CorpusNotFound { path: PathBuf },

    /// Requested colour frameset does not exist
    #[error("No colour frameset at index {index} ({available} available)")]
    NoFrameset { index: usize, available: usize },

    /// Interrupted by a shutdown signal
    #[error("Interrupted")]
    Interrupted,

    /// Synchronization or configuration error
    #[error(transparent)]
    Sync(#[from] ContractError),

    /// Extraction error
    #[error(transparent)]
    Workset(#[from] WorksetError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn corpus_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CorpusNotFound { path: path.into() }
    }

    pub fn no_frameset(index: usize, available: usize) -> Self {
        Self::NoFrameset { index, available }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
