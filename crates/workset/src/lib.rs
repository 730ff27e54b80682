//! # Workset
//!
//! Extracts one synchronized frameset pair from a corpus into an isolated
//! working directory for downstream processing.
//!
//! ## Usage Example
//!
//! ```ignore
//! use workset::Extractor;
//!
//! let (depth, colour) = report.pair(0).unwrap();
//! let extracted = Extractor::new("uploads/", "processing_data/")
//!     .with_delete_remainder(false)
//!     .extract(report.sources(), depth, colour)?;
//! for missing in &extracted.missing {
//!     eprintln!("missing {}", missing.file);
//! }
//! ```

mod error;
mod extractor;
mod manifest;

pub use error::WorksetError;
pub use extractor::{ExtractReport, Extractor, SourceFileMissing};
pub use manifest::{WorksetManifest, MANIFEST_FILE};
