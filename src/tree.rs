//! Tree Reconstructor
//!
//! Expands resolved references under a root id into nested subtrees. The
//! visited set belongs to one [`Expander`] and follows the current path: an
//! id is inserted on the way down and removed on the way back up, so shared
//! entities in independent branches expand in each branch and only genuine
//! cycles produce a marker.

use crate::registry::Registry;
use crate::types::{Entity, EntityKind, Origin, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashSet};

/// Result of expanding one id.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    Node(TreeNode),
    /// The id is already on the current expansion path
    Cycle { target: String },
    /// The id names no entity
    Unresolved { target: String },
}

impl Expansion {
    pub fn as_node(&self) -> Option<&TreeNode> {
        match self {
            Expansion::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Expansion::Cycle { .. })
    }

    /// Number of cycle markers anywhere in this expansion.
    pub fn cycle_count(&self) -> usize {
        match self {
            Expansion::Node(node) => node.arguments.values().map(TreeValue::cycle_count).sum(),
            Expansion::Cycle { .. } => 1,
            Expansion::Unresolved { .. } => 0,
        }
    }
}

impl Serialize for Expansion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expansion::Node(node) => node.serialize(serializer),
            Expansion::Cycle { target } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ref", target)?;
                map.serialize_entry("cycle", &true)?;
                map.end()
            }
            Expansion::Unresolved { target } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ref", target)?;
                map.serialize_entry("resolved", &false)?;
                map.end()
            }
        }
    }
}

/// An entity with its resolved references replaced by their expansions.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TreeNode {
    pub kind: EntityKind,
    pub id: String,
    pub constructor: String,
    pub origin: Origin,
    pub arguments: BTreeMap<String, TreeValue>,
}

/// Argument value inside a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum TreeValue {
    Expanded(Box<Expansion>),
    Sequence(Vec<TreeValue>),
    /// Everything that is not a resolved reference, copied unchanged
    Value(Value),
}

impl TreeValue {
    fn cycle_count(&self) -> usize {
        match self {
            TreeValue::Expanded(expansion) => expansion.cycle_count(),
            TreeValue::Sequence(items) => items.iter().map(TreeValue::cycle_count).sum(),
            TreeValue::Value(_) => 0,
        }
    }
}

/// Depth-first expander with a path-scoped visited set.
pub struct Expander<'r> {
    registry: &'r Registry,
    path: HashSet<(EntityKind, &'r str)>,
}

impl<'r> Expander<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: HashSet::new(),
        }
    }

    /// Expand a root id, looked up in agents before tools.
    pub fn expand(&mut self, id: &str) -> Expansion {
        let registry = self.registry;
        match registry.get(id) {
            Some(entity) => self.expand_entity(entity),
            None => Expansion::Unresolved {
                target: id.to_string(),
            },
        }
    }

    fn expand_entity(&mut self, entity: &'r Entity) -> Expansion {
        let key = (entity.kind, entity.id.as_str());
        if !self.path.insert(key) {
            return Expansion::Cycle {
                target: entity.id.clone(),
            };
        }

        let arguments = entity
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), self.expand_value(value)))
            .collect();
        self.path.remove(&key);

        Expansion::Node(TreeNode {
            kind: entity.kind,
            id: entity.id.clone(),
            constructor: entity.constructor.clone(),
            origin: entity.origin.clone(),
            arguments,
        })
    }

    fn expand_value(&mut self, value: &'r Value) -> TreeValue {
        match value {
            Value::Reference(reference) if reference.resolved => {
                let registry = self.registry;
                let target = match reference.kind {
                    Some(EntityKind::Tool) => registry.tool(&reference.target),
                    Some(EntityKind::Agent) => registry.agent(&reference.target),
                    None => registry.get(&reference.target),
                };
                let expansion = match target {
                    Some(entity) => self.expand_entity(entity),
                    None => Expansion::Unresolved {
                        target: reference.target.clone(),
                    },
                };
                TreeValue::Expanded(Box::new(expansion))
            }
            Value::Sequence(items) => {
                TreeValue::Sequence(items.iter().map(|item| self.expand_value(item)).collect())
            }
            other => TreeValue::Value(other.clone()),
        }
    }
}

/// Expand `root_id` into a nested tree. Each call starts with a fresh
/// visited set.
pub fn expand(registry: &Registry, root_id: &str) -> Expansion {
    Expander::new(registry).expand(root_id)
}
