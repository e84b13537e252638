//! CLI command implementations.

mod config;
mod init;
mod serve;

pub use config::run_config;
pub use init::run_init;
pub use serve::run_serve;
