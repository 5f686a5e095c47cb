//! Root discovery: which agents are sensible entry points for `expand`.

use crate::registry::Registry;
use crate::types::Origin;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootReason {
    /// Matches the configured root name
    Preferred,
    /// No other entity references it
    Unreferenced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCandidate {
    pub id: String,
    pub origin: Origin,
    pub reason: RootReason,
}

/// List root candidates: the preferred agent first when it exists, then every
/// agent no other entity references, in id order.
pub fn discover_roots(registry: &Registry, preferred: &str) -> Vec<RootCandidate> {
    let mut candidates = Vec::new();
    if let Some(agent) = registry.agent(preferred) {
        candidates.push(RootCandidate {
            id: agent.id.clone(),
            origin: agent.origin.clone(),
            reason: RootReason::Preferred,
        });
    }

    let referenced = registry.referenced_ids();
    for agent in registry.agents.values() {
        if agent.id == preferred || referenced.contains(&agent.id) {
            continue;
        }
        candidates.push(RootCandidate {
            id: agent.id.clone(),
            origin: agent.origin.clone(),
            reason: RootReason::Unreferenced,
        });
    }
    candidates
}
