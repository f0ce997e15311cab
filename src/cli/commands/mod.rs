//! CLI command implementations.

mod analyze;
mod extract;
mod serve;

pub use analyze::cmd_analyze;
pub use extract::cmd_extract;
pub use serve::cmd_serve;
