//! Error types for scanning, registry construction, and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Per-file scan failures. These never abort a directory walk; the registry
/// builder records them and moves on.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Grammar initialization failed: {0}")]
    Grammar(String),
}

/// Errors surfaced by the public analysis pipeline and the CLI.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for AnalysisError {
    fn from(err: config::ConfigError) -> Self {
        AnalysisError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for AnalysisError {
    fn from(err: toml::ser::Error) -> Self {
        AnalysisError::ConfigError(format!("Failed to render configuration: {}", err))
    }
}
