//! # Sync Engine
//!
//! Software synchronization of independently captured frame streams.
//!
//! Responsibilities:
//! - Match depth frames across sources into framesets (greedy, latest frame
//!   as reference, exclusive threshold)
//! - Bind colour frames to each depth frameset within one source
//! - Per-run timestamp memoization and static clock offsets
//!
//! ## Usage Example
//!
//! ```ignore
//! use corpus::{CorpusIndex, MetadataReader};
//! use sync_engine::{SyncEngine, SyncEngineConfig};
//!
//! let mut engine = SyncEngine::new(
//!     SyncEngineConfig::default(),
//!     CorpusIndex::new("uploads/", "csv"),
//!     MetadataReader::new("uploads/"),
//! );
//! let report = engine.run(&["raspi1".into(), "raspi2".into()])?;
//! for (i, colour) in report.colour.colour.iter().enumerate() {
//!     println!("{i}: {:?}", colour.to_tagged());
//! }
//! ```

mod binder;
mod cache;
mod engine;
mod matcher;
mod report;

pub use contracts::{SyncEngineConfig, TimeUnit};
pub use engine::SyncEngine;
pub use report::{BindRun, BindStats, SyncReport, SyncRun, SyncStats};

// Re-export contracts types
pub use contracts::{ColourFrameset, Frameset, FramesetMeta};
