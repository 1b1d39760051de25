//! CLI argument models and run configuration for the detrun binary.
//!
//! Exposes the clap-backed flag schema plus the immutable `RunConfig` the
//! dispatcher consumes once per process.

pub mod cli_args;
pub mod cli_types;
pub mod run_config;

pub use cli_args::Cli;
pub use cli_types::*;
pub use run_config::*;
