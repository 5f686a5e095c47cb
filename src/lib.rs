//! adkmap: Static Registry of ADK Agent Hierarchies
//!
//! Parses Python sources written against Google's Agent Development Kit,
//! collects agent and tool construction sites into a resolved registry, and
//! reconstructs the nested agent tree under a chosen root without executing
//! any of the analyzed code.

pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod materialize;
pub mod registry;
pub mod roots;
pub mod scan;
pub mod syntax;
pub mod tooling;
pub mod tree;
pub mod types;

pub use error::{AnalysisError, ScanError};
pub use registry::{build_registry, Registry, RegistryBuilder, ScanReport};
pub use scan::{scan_file, scan_source, FileScan};
pub use tree::{expand, Expansion, TreeNode};
pub use types::{Entity, EntityKind, Origin, Value};
