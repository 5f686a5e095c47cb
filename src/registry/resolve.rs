//! Merge and resolution: per-file scan results to resolved symbol tables.

use crate::scan::FileScan;
use crate::types::{Entity, EntityKind, Origin};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Two entities of the same kind bound to the same id. The later one in
/// scan order replaced the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub kind: EntityKind,
    pub id: String,
    pub kept: Origin,
    pub replaced: Origin,
}

/// Merge scan results in order into kind-specific tables; later ids win.
pub fn merge(
    scans: Vec<FileScan>,
) -> (
    BTreeMap<String, Entity>,
    BTreeMap<String, Entity>,
    Vec<Collision>,
) {
    let mut agents = BTreeMap::new();
    let mut tools = BTreeMap::new();
    let mut collisions = Vec::new();

    for scan in scans {
        for entity in scan.agents.into_iter().chain(scan.tools) {
            let table = match entity.kind {
                EntityKind::Agent => &mut agents,
                EntityKind::Tool => &mut tools,
            };
            let kept = entity.origin.clone();
            if let Some(previous) = table.insert(entity.id.clone(), entity) {
                warn!(
                    kind = %previous.kind,
                    id = %previous.id,
                    kept = %kept.file,
                    replaced = %previous.origin.file,
                    "Duplicate id, later definition wins"
                );
                collisions.push(Collision {
                    kind: previous.kind,
                    id: previous.id,
                    kept,
                    replaced: previous.origin,
                });
            }
        }
    }

    (agents, tools, collisions)
}

/// Annotate every reference in both tables. Agents are looked up before
/// tools, so a name defined as both resolves to the agent.
pub fn resolve(agents: &mut BTreeMap<String, Entity>, tools: &mut BTreeMap<String, Entity>) {
    let agent_ids: HashSet<String> = agents.keys().cloned().collect();
    let tool_ids: HashSet<String> = tools.keys().cloned().collect();
    let lookup = |name: &str| {
        if agent_ids.contains(name) {
            Some(EntityKind::Agent)
        } else if tool_ids.contains(name) {
            Some(EntityKind::Tool)
        } else {
            None
        }
    };

    for entity in agents.values_mut().chain(tools.values_mut()) {
        for value in entity.arguments.values_mut() {
            value.for_each_reference_mut(&mut |reference| {
                let kind = lookup(&reference.target);
                reference.resolved = kind.is_some();
                reference.kind = kind;
            });
        }
    }
}
