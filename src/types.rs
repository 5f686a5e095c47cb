//! Core types for the agent/tool registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a discovered construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Agent,
    Tool,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Agent => "agent",
            EntityKind::Tool => "tool",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an entity was constructed. Lines are 1-based and count every
/// physical line of the file, comments and blank lines included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
}

/// A named agent or tool construction site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: String,
    /// Callee that matched, e.g. `LlmAgent`
    pub constructor: String,
    pub origin: Origin,
    pub arguments: BTreeMap<String, Value>,
}

/// Literal argument values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    None,
}

/// Symbolic mention of another entity's name.
///
/// `resolved` and `kind` are settled by the registry's resolution pass. A
/// reference flattened out of a wrapping constructor starts out tagged as an
/// agent and remembers the wrapper in `via`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub target: String,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

impl Reference {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            resolved: false,
            kind: None,
            via: None,
        }
    }

    pub fn wrapped(target: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            resolved: false,
            kind: Some(EntityKind::Agent),
            via: Some(via.into()),
        }
    }
}

/// Semantic value of one keyword argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Literal(Literal),
    Reference(Reference),
    Call { call: String },
    Sequence(Vec<Value>),
    /// Unsupported expression shape; carries its syntax kind
    Opaque { opaque: String },
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Literal(Literal::String(s.into()))
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Value::Reference(Reference::new(target))
    }

    pub fn opaque(kind: impl Into<String>) -> Self {
        Value::Opaque {
            opaque: kind.into(),
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Visit every reference in this value, descending into sequences.
    pub fn for_each_reference<F: FnMut(&Reference)>(&self, f: &mut F) {
        match self {
            Value::Reference(r) => f(r),
            Value::Sequence(items) => {
                for item in items {
                    item.for_each_reference(f);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn for_each_reference_mut<F: FnMut(&mut Reference)>(&mut self, f: &mut F) {
        match self {
            Value::Reference(r) => f(r),
            Value::Sequence(items) => {
                for item in items {
                    item.for_each_reference_mut(f);
                }
            }
            _ => {}
        }
    }
}
