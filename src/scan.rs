//! Syntax Scanner
//!
//! Finds agent and tool construction sites in one source file. A site is a
//! simple assignment `name = Callee(...)` where `Callee` is a bare identifier
//! listed in the configured constructor sets. Only keyword arguments are kept.

use crate::config::{AnalyzerConfig, ConstructorConfig, FallbackEncoding};
use crate::error::ScanError;
use crate::materialize::materialize;
use crate::syntax::{self, Assignment, Expr};
use crate::types::{Entity, EntityKind, Origin};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use tree_sitter::Parser;

/// Text encoding a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
}

/// Entities discovered in one file, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct FileScan {
    pub path: String,
    pub encoding: SourceEncoding,
    pub agents: Vec<Entity>,
    pub tools: Vec<Entity>,
}

impl FileScan {
    pub fn entity_count(&self) -> usize {
        self.agents.len() + self.tools.len()
    }
}

/// Decode file bytes: UTF-8 first, then the fallback encoding once.
pub fn decode_source(
    bytes: &[u8],
    path: &str,
    fallback: FallbackEncoding,
) -> Result<(String, SourceEncoding), ScanError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok((text.to_string(), SourceEncoding::Utf8)),
        Err(utf8_err) => match fallback {
            // Every byte maps to the code point of the same value
            FallbackEncoding::Latin1 => Ok((
                bytes.iter().map(|&b| char::from(b)).collect(),
                SourceEncoding::Latin1,
            )),
            FallbackEncoding::Disabled => Err(ScanError::Decode {
                path: path.to_string(),
                reason: utf8_err.to_string(),
            }),
        },
    }
}

/// Reusable scanner owning a tree-sitter parser.
///
/// Parsers are not shareable across threads; parallel scans create one
/// scanner per worker.
pub struct Scanner {
    parser: Parser,
    constructors: ConstructorConfig,
    fallback: FallbackEncoding,
}

impl Scanner {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ScanError> {
        Self::with_constructors(config.constructors.clone(), config.scan.fallback_encoding)
    }

    pub fn with_constructors(
        constructors: ConstructorConfig,
        fallback: FallbackEncoding,
    ) -> Result<Self, ScanError> {
        let parser = syntax::python_parser().map_err(ScanError::Grammar)?;
        Ok(Self {
            parser,
            constructors,
            fallback,
        })
    }

    /// Read and scan a file from disk.
    pub fn scan_path(&mut self, path: &Path) -> Result<FileScan, ScanError> {
        let display = path.to_string_lossy().into_owned();
        let bytes = std::fs::read(path).map_err(|source| ScanError::Io {
            path: display.clone(),
            source,
        })?;
        self.scan_bytes(&bytes, &display)
    }

    pub fn scan_bytes(&mut self, bytes: &[u8], path: &str) -> Result<FileScan, ScanError> {
        let (source, encoding) = decode_source(bytes, path, self.fallback)?;
        if encoding != SourceEncoding::Utf8 {
            debug!(path = %path, "Decoded with fallback encoding");
        }
        let mut scan = self.scan_source(&source, path)?;
        scan.encoding = encoding;
        Ok(scan)
    }

    pub fn scan_source(&mut self, source: &str, path: &str) -> Result<FileScan, ScanError> {
        let source = normalize_newlines(source);
        let assignments =
            syntax::parse_assignments(&mut self.parser, &source).map_err(|e| ScanError::Parse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let mut scan = FileScan {
            path: path.to_string(),
            encoding: SourceEncoding::Utf8,
            agents: Vec::new(),
            tools: Vec::new(),
        };
        for assignment in &assignments {
            if let Some(entity) = extract_entity(assignment, path, &self.constructors) {
                match entity.kind {
                    EntityKind::Agent => scan.agents.push(entity),
                    EntityKind::Tool => scan.tools.push(entity),
                }
            }
        }
        debug!(
            path = %path,
            agents = scan.agents.len(),
            tools = scan.tools.len(),
            "Scanned file"
        );
        Ok(scan)
    }
}

/// Scan raw file contents with the given configuration.
pub fn scan_file(bytes: &[u8], path: &str, config: &AnalyzerConfig) -> Result<FileScan, ScanError> {
    Scanner::new(config)?.scan_bytes(bytes, path)
}

/// Scan already-decoded source text.
pub fn scan_source(
    source: &str,
    path: &str,
    constructors: &ConstructorConfig,
) -> Result<FileScan, ScanError> {
    Scanner::with_constructors(constructors.clone(), FallbackEncoding::Latin1)?
        .scan_source(source, path)
}

/// Fold `\r\n` and lone `\r` into `\n`. The grammar only breaks lines on
/// `\n`, while Python accepts all three terminators.
fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if !source.contains('\r') {
        return Cow::Borrowed(source);
    }
    Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Recognize one construction site. Multi-target, annotated, non-name targets
/// and qualified callees are not sites.
fn extract_entity(
    assignment: &Assignment,
    path: &str,
    constructors: &ConstructorConfig,
) -> Option<Entity> {
    if assignment.annotated || assignment.targets.len() != 1 {
        return None;
    }
    let Expr::Name(id) = &assignment.targets[0] else {
        return None;
    };
    let Expr::Call(call) = &assignment.value else {
        return None;
    };
    let Expr::Name(callee) = call.callee.as_ref() else {
        return None;
    };
    let kind = constructors.classify(callee)?;
    if id.is_empty() {
        return None;
    }

    let mut arguments = BTreeMap::new();
    for keyword in &call.keywords {
        arguments.insert(
            keyword.name.clone(),
            materialize(&keyword.value, constructors),
        );
    }

    Some(Entity {
        kind,
        id: id.clone(),
        constructor: callee.clone(),
        origin: Origin {
            file: path.to_string(),
            line_start: assignment.line_start,
            line_end: assignment.line_end,
        },
        arguments,
    })
}
