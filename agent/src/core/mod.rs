//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;

pub use cli::CliConfig;
pub use config::{AgentConfig, ConfigError, ConfigLoader, FileConfigLoader};
pub use shutdown::ShutdownService;
