//! Layered error definitions
//!
//! Categorized by source: config / corpus / sync

use std::path::PathBuf;

use thiserror::Error;

use crate::DataKind;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Corpus Errors =====
    /// Corpus directory could not be listed
    #[error("cannot read corpus directory '{}': {source}", path.display())]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Metadata sidecar does not exist
    #[error("metadata file missing: {}", path.display())]
    MetadataMissing { path: PathBuf },

    /// Metadata sidecar exists but the timestamp field cannot be extracted
    #[error("metadata file malformed: {} ({message})", path.display())]
    MetadataMalformed { path: PathBuf, message: String },

    // ===== Sync Errors =====
    /// Synchronization requested without any source
    #[error("no sources given to synchronize")]
    NoSources,

    /// A source has no frames of the requested kind
    #[error("source '{source_id}' has no {kind} frames")]
    EmptySourceList { source_id: String, kind: DataKind },

    /// Frameset width does not match the source list
    #[error("frameset has {actual} frame ids but {expected} sources were given")]
    FramesetShape { expected: usize, actual: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create malformed metadata error
    pub fn metadata_malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MetadataMalformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create empty source list error
    pub fn empty_source_list(source_id: impl Into<String>, kind: DataKind) -> Self {
        Self::EmptySourceList {
            source_id: source_id.into(),
            kind,
        }
    }

    /// Whether the error comes from reading a metadata sidecar
    pub fn is_metadata_error(&self) -> bool {
        matches!(
            self,
            Self::MetadataMissing { .. } | Self::MetadataMalformed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_list_message() {
        let err = ContractError::empty_source_list("raspi2", DataKind::Depth);
        assert_eq!(err.to_string(), "source 'raspi2' has no depth frames");
    }

    #[test]
    fn test_metadata_classification() {
        let missing = ContractError::MetadataMissing {
            path: PathBuf::from("a_depth_metadata_1.txt"),
        };
        let malformed = ContractError::metadata_malformed("a_colour_metadata_1.txt", "line 6");
        assert!(missing.is_metadata_error());
        assert!(malformed.is_metadata_error());
        assert!(!ContractError::NoSources.is_metadata_error());
    }
}
