//! Command implementations.

mod extract;
mod info;
mod sync;
mod validate;

pub use extract::run_extract;
pub use info::run_info;
pub use sync::run_sync;
pub use validate::run_validate;
