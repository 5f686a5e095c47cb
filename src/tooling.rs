//! Tooling & Integration Layer
//!
//! Command-line surface over the analysis pipeline.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, ConfigCommands};
