//! Loading a capture configuration and running the engine on it.

mod session;
mod stats;

pub use session::{run_blocking, Session};
pub use stats::RunStats;
