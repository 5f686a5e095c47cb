//! Analyzer configuration.
//!
//! Sources are layered by [`ConfigLoader`]: built-in defaults, the user's
//! global config file, `adkmap.toml` in the analyzed directory, then
//! `ADKMAP__*` environment variables. CLI flags are applied last by the binary.

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg;

use crate::error::AnalysisError;
use crate::logging::LoggingConfig;
use crate::types::EntityKind;
use serde::{Deserialize, Serialize};

/// Name of the per-project config file looked up in the analyzed root.
pub const WORKSPACE_CONFIG_FILE: &str = "adkmap.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub constructors: ConstructorConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub tree: TreeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.constructors.validate()?;
        self.scan.validate()
    }
}

/// Callee names recognized as entity constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorConfig {
    /// Callees whose assignments define agents
    #[serde(default = "default_agent_constructors")]
    pub agents: Vec<String>,

    /// Callees whose assignments define tools
    #[serde(default = "default_tool_constructors")]
    pub tools: Vec<String>,

    /// Adapters whose `agent=` argument is promoted to a plain agent reference
    #[serde(default = "default_wrappers")]
    pub wrappers: Vec<String>,
}

fn default_agent_constructors() -> Vec<String> {
    ["Agent", "BaseAgent", "LlmAgent", "SequentialAgent", "ParallelAgent", "LoopAgent"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tool_constructors() -> Vec<String> {
    vec!["Tool".to_string(), "FunctionTool".to_string()]
}

fn default_wrappers() -> Vec<String> {
    vec!["AgentTool".to_string()]
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self {
            agents: default_agent_constructors(),
            tools: default_tool_constructors(),
            wrappers: default_wrappers(),
        }
    }
}

impl ConstructorConfig {
    /// Kind of entity a callee constructs, if any.
    pub fn classify(&self, callee: &str) -> Option<EntityKind> {
        if self.agents.iter().any(|c| c == callee) {
            Some(EntityKind::Agent)
        } else if self.tools.iter().any(|c| c == callee) {
            Some(EntityKind::Tool)
        } else {
            None
        }
    }

    pub fn is_wrapper(&self, callee: &str) -> bool {
        self.wrappers.iter().any(|c| c == callee)
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        for name in self
            .agents
            .iter()
            .chain(self.tools.iter())
            .chain(self.wrappers.iter())
        {
            if !is_identifier(name) {
                return Err(AnalysisError::ConfigError(format!(
                    "Invalid constructor name: '{}' (must be a bare identifier)",
                    name
                )));
            }
        }
        if let Some(dup) = self.agents.iter().find(|a| self.tools.contains(a)) {
            return Err(AnalysisError::ConfigError(format!(
                "Constructor '{}' is listed as both an agent and a tool constructor",
                dup
            )));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Encoding tried when a file is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackEncoding {
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "none")]
    Disabled,
}

/// Directory walk and per-file scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File extensions to scan, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned from the walk
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Scan files whose name starts with '.'
    #[serde(default)]
    pub include_hidden: bool,

    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: FallbackEncoding,

    /// Scan files on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    vec![
        ".venv".to_string(),
        "venv".to_string(),
        "__pycache__".to_string(),
    ]
}

fn default_fallback_encoding() -> FallbackEncoding {
    FallbackEncoding::Latin1
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            include_hidden: false,
            fallback_encoding: default_fallback_encoding(),
            parallel: false,
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<(), AnalysisError> {
        if self.extensions.is_empty() {
            return Err(AnalysisError::ConfigError(
                "scan.extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tree reconstruction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Root used when none is given on the command line
    #[serde(default = "default_root")]
    pub default_root: String,
}

fn default_root() -> String {
    "root_agent".to_string()
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            default_root: default_root(),
        }
    }
}
