//! # Corpus
//!
//! Read access to a flat directory of captured frames.
//!
//! Responsibilities:
//! - Build and parse corpus file names (`<source>_<kind>_<frame>.<ext>`)
//! - Enumerate frame ids per source and kind (`CorpusIndex`)
//! - Read arrival timestamps from metadata sidecars (`MetadataReader`)
//! - Write synthetic corpora for tests (`MockCorpus`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{DataKind, FrameCatalog, TimestampSource};
//! use corpus::{CorpusIndex, MetadataReader};
//!
//! let index = CorpusIndex::new("uploads/", "csv");
//! let ids = index.frame_ids(&"raspi1".into(), DataKind::Depth)?;
//! let mut reader = MetadataReader::new("uploads/");
//! let ts = reader.arrival_timestamp(&"raspi1".into(), DataKind::Depth, ids[0])?;
//! ```

mod index;
mod metadata;
pub mod mock;
pub mod naming;

pub use index::{CorpusIndex, CorpusSummary};
pub use metadata::{parse_timestamp, MetadataReader};
pub use mock::MockCorpus;
pub use naming::{frame_file_name, metadata_file_name, CorpusName, FrameName};
