//! Source discovery: recursive directory walk with pruning.

use crate::config::ScanConfig;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Collect scannable files under `root`, sorted by path within each directory.
///
/// Directories listed in `exclude_dirs` are pruned wholesale. Entries that
/// cannot be read are logged and skipped.
pub fn discover_source_files(root: &Path, config: &ScanConfig) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry, config));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !config.include_hidden && is_hidden(&entry) {
            continue;
        }
        if has_scanned_extension(entry.path(), config) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_excluded_dir(entry: &DirEntry, config: &ScanConfig) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| config.exclude_dirs.iter().any(|d| d == name))
            .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn has_scanned_extension(path: &Path, config: &ScanConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| config.extensions.iter().any(|e| e == ext))
        .unwrap_or(false)
}
