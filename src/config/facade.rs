//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::AnalyzerConfig;
use crate::error::AnalysisError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for an analyzed directory from files and environment.
    pub fn load(workspace_root: &Path) -> Result<AnalyzerConfig, AnalysisError> {
        let config = MergeService::load(workspace_root)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<AnalyzerConfig, AnalysisError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> AnalyzerConfig {
        AnalyzerConfig::default()
    }
}
