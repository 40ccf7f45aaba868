//! "Can this initiative start now?"

use crate::domain::{DependencyEdge, Initiative, InitiativeId, InitiativeStatus};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A predecessor that still holds an initiative back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocker {
    /// Predecessor id
    pub id: InitiativeId,

    /// Predecessor name
    pub name: String,

    /// Its current, non-terminal status
    pub status: InitiativeStatus,
}

/// Result of a readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// True iff no BLOCKING predecessor is still open
    pub can_start: bool,

    /// Open BLOCKING predecessors, in edge order
    pub blocked_by: Vec<Blocker>,
}

/// Evaluate readiness from the edges pointing into an initiative.
///
/// SOFT edges are ignored. A predecessor absent from `predecessors` (deleted
/// or never stored) cannot block. Predecessors reached by several edges are
/// listed once.
pub fn evaluate(
    edges_into: &[DependencyEdge],
    predecessors: &HashMap<InitiativeId, Initiative>,
) -> Readiness {
    let mut seen = HashSet::new();
    let blocked_by: Vec<Blocker> = edges_into
        .iter()
        .filter(|edge| edge.kind.is_blocking())
        .filter_map(|edge| predecessors.get(&edge.from_id))
        .filter(|pred| !pred.status.is_terminal())
        .filter(|pred| seen.insert(pred.id.clone()))
        .map(|pred| Blocker {
            id: pred.id.clone(),
            name: pred.name.clone(),
            status: pred.status,
        })
        .collect();

    Readiness {
        can_start: blocked_by.is_empty(),
        blocked_by,
    }
}
