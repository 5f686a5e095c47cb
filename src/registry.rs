//! Registry Builder
//!
//! Walks a directory tree, scans every source file, merges the per-file
//! results into agent and tool tables and resolves every reference against
//! the merged tables.

mod resolve;
pub mod walk;

pub use resolve::Collision;

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, ScanError};
use crate::scan::{FileScan, Scanner};
use crate::types::{Entity, EntityKind};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Merged, resolved symbol tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Registry {
    pub agents: BTreeMap<String, Entity>,
    pub tools: BTreeMap<String, Entity>,
}

impl Registry {
    /// Merge scan results in the given order and run the resolution pass.
    pub fn from_scans(scans: Vec<FileScan>) -> (Self, Vec<Collision>) {
        let (mut agents, mut tools, collisions) = resolve::merge(scans);
        resolve::resolve(&mut agents, &mut tools);
        (Self { agents, tools }, collisions)
    }

    pub fn agent(&self, id: &str) -> Option<&Entity> {
        self.agents.get(id)
    }

    pub fn tool(&self, id: &str) -> Option<&Entity> {
        self.tools.get(id)
    }

    /// Look up an id, agents first.
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.agent(id).or_else(|| self.tool(id))
    }

    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        self.get(id).map(|e| e.kind)
    }

    pub fn len(&self) -> usize {
        self.agents.len() + self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.tools.is_empty()
    }

    /// Every entity, agents before tools, each table in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.agents.values().chain(self.tools.values())
    }

    /// Ids named by a resolved reference from some other entity.
    pub fn referenced_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        for entity in self.entities() {
            for value in entity.arguments.values() {
                value.for_each_reference(&mut |reference| {
                    if reference.resolved && reference.target != entity.id {
                        ids.insert(reference.target.clone());
                    }
                });
            }
        }
        ids
    }
}

/// Why a file contributed no entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    Decode,
    Parse,
    Io,
    Grammar,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
    pub message: String,
}

/// Side-channel diagnostics of one registry build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
    pub collisions: Vec<Collision>,
}

/// Builds a [`Registry`] from a directory tree.
pub struct RegistryBuilder {
    config: AnalyzerConfig,
}

impl RegistryBuilder {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn build(&self, root: &Path) -> Result<Registry, AnalysisError> {
        self.build_with_report(root).map(|(registry, _)| registry)
    }

    /// Build the registry and return the diagnostics gathered along the way.
    pub fn build_with_report(
        &self,
        root: &Path,
    ) -> Result<(Registry, ScanReport), AnalysisError> {
        check_root(root)?;
        // Fail fast on a broken grammar instead of skipping every file
        let mut scanner = Scanner::new(&self.config)?;

        let files = walk::discover_source_files(root, &self.config.scan);
        let results: Vec<(PathBuf, Result<FileScan, ScanError>)> = if self.config.scan.parallel {
            files
                .into_par_iter()
                .map_init(
                    || Scanner::new(&self.config),
                    |scanner, path| {
                        let result = match scanner {
                            Ok(scanner) => scanner.scan_path(&path),
                            Err(e) => Err(ScanError::Grammar(e.to_string())),
                        };
                        (path, result)
                    },
                )
                .collect()
        } else {
            files
                .into_iter()
                .map(|path| {
                    let result = scanner.scan_path(&path);
                    (path, result)
                })
                .collect()
        };

        let mut report = ScanReport {
            files_scanned: results.len(),
            ..ScanReport::default()
        };
        let mut scans = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(scan) => scans.push(scan),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping file");
                    report.skipped.push(SkippedFile {
                        path: path.to_string_lossy().into_owned(),
                        reason: skip_reason(&e),
                        message: e.to_string(),
                    });
                }
            }
        }

        let (registry, collisions) = Registry::from_scans(scans);
        report.collisions = collisions;

        info!(
            root = %root.display(),
            files = report.files_scanned,
            skipped = report.skipped.len(),
            agents = registry.agents.len(),
            tools = registry.tools.len(),
            collisions = report.collisions.len(),
            "Registry built"
        );
        Ok((registry, report))
    }
}

/// Build a resolved registry for every source file under `root`.
pub fn build_registry(root: &Path, config: &AnalyzerConfig) -> Result<Registry, AnalysisError> {
    RegistryBuilder::new(config.clone()).build(root)
}

fn check_root(root: &Path) -> Result<(), AnalysisError> {
    let metadata = match std::fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AnalysisError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => return Err(AnalysisError::Io(e)),
    };
    if !metadata.is_dir() {
        return Err(AnalysisError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

fn skip_reason(error: &ScanError) -> SkipReason {
    match error {
        ScanError::Decode { .. } => SkipReason::Decode,
        ScanError::Parse { .. } => SkipReason::Parse,
        ScanError::Io { .. } => SkipReason::Io,
        ScanError::Grammar(_) => SkipReason::Grammar,
    }
}
