//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every frame carries an integer arrival timestamp, read from its metadata sidecar
//! - The unit is declared in configuration (`TimeUnit`) and must match across sources
//! - Source clocks are assumed to share an epoch; `SyncEngineConfig::clock_offsets`
//!   holds explicit static corrections (zero by default)

mod blueprint;
mod catalog;
mod error;
mod frameset;
mod kind;
mod source;
mod source_id;
mod sync_engine_config;

pub use blueprint::*;
pub use catalog::{FrameCatalog, TimestampSource};
pub use error::*;
pub use frameset::*;
pub use kind::DataKind;
pub use source::*;
pub use source_id::SourceId;
pub use sync_engine_config::*;
