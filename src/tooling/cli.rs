//! CLI Tooling
//!
//! Command-line interface over the analysis pipeline. Every command builds
//! the registry fresh from the workspace directory.

use crate::config::{AnalyzerConfig, ConfigLoader};
use crate::error::AnalysisError;
use crate::format::{
    format_file_scan_text, format_registry_text, format_roots_text, format_tree_text,
};
use crate::registry::{Registry, RegistryBuilder, ScanReport};
use crate::roots::discover_roots;
use crate::scan::Scanner;
use crate::tree::expand;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

/// adkmap - Static map of ADK agent hierarchies
#[derive(Parser)]
#[command(name = "adkmap")]
#[command(about = "Build a registry of ADK agents and tools from Python sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory to analyze
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the flat registry of agents and tools
    Registry {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
        /// Include skipped files and duplicate ids
        #[arg(long)]
        report: bool,
    },
    /// Show the nested agent tree under a root
    Tree {
        /// Root id (default: tree.default_root, else the first root candidate)
        #[arg(long)]
        root: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// List agents that can serve as tree roots
    Roots {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Scan a single file without resolution
    ScanFile {
        /// Source file to scan
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

/// CLI context holding the analyzed directory and its configuration
pub struct CliContext {
    workspace_root: PathBuf,
    config: AnalyzerConfig,
}

impl CliContext {
    /// Create a new CLI context, loading configuration for the workspace
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, AnalysisError> {
        let config = if let Some(cfg_path) = &config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: AnalyzerConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, AnalysisError> {
        debug!(workspace = %self.workspace_root.display(), "Executing command");
        match command {
            Commands::Registry { format, report } => self.handle_registry(format, *report),
            Commands::Tree { root, format } => self.handle_tree(root.as_deref(), format),
            Commands::Roots { format } => self.handle_roots(format),
            Commands::ScanFile { path, format } => self.handle_scan_file(path, format),
            Commands::Config { command } => match command {
                ConfigCommands::Show => Ok(toml::to_string_pretty(&self.config)?),
            },
        }
    }

    fn build(&self) -> Result<(Registry, ScanReport), AnalysisError> {
        RegistryBuilder::new(self.config.clone()).build_with_report(&self.workspace_root)
    }

    fn handle_registry(&self, format: &str, report: bool) -> Result<String, AnalysisError> {
        let (registry, scan_report) = self.build()?;
        match (format, report) {
            ("json", true) => to_json(&json!({ "registry": registry, "report": scan_report })),
            ("json", false) => to_json(&registry),
            (_, true) => Ok(format_registry_text(&registry, Some(&scan_report))),
            (_, false) => Ok(format_registry_text(&registry, None)),
        }
    }

    fn handle_tree(&self, root: Option<&str>, format: &str) -> Result<String, AnalysisError> {
        let (registry, _) = self.build()?;
        let root_id = match root {
            Some(root) => root.to_string(),
            None => self.default_root(&registry),
        };
        let tree = expand(&registry, &root_id);
        if format == "json" {
            to_json(&tree)
        } else {
            Ok(format_tree_text(&tree))
        }
    }

    /// The configured root if it names an agent, else the first unreferenced agent.
    fn default_root(&self, registry: &Registry) -> String {
        let preferred = &self.config.tree.default_root;
        discover_roots(registry, preferred)
            .into_iter()
            .next()
            .map(|candidate| candidate.id)
            .unwrap_or_else(|| preferred.clone())
    }

    fn handle_roots(&self, format: &str) -> Result<String, AnalysisError> {
        let (registry, _) = self.build()?;
        let candidates = discover_roots(&registry, &self.config.tree.default_root);
        if format == "json" {
            to_json(&json!({ "roots": candidates, "total": candidates.len() }))
        } else {
            Ok(format_roots_text(&candidates))
        }
    }

    fn handle_scan_file(&self, path: &Path, format: &str) -> Result<String, AnalysisError> {
        let scan = Scanner::new(&self.config)?.scan_path(path)?;
        if format == "json" {
            to_json(&scan)
        } else {
            Ok(format_file_scan_text(&scan))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AnalysisError> {
    Ok(serde_json::to_string_pretty(value)?)
}
