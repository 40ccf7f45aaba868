//! Core in-memory data structures.
//!
//! Not thread-safe on its own; wrapped in `Arc<Mutex<>>` by [`super::InMemoryStore`].

use crate::domain::{DependencyEdge, EdgeId, Initiative, InitiativeId, ProjectId, Scenario};
use crate::id_generation::{EDGE_PREFIX, IdGenerator};
use crate::store::Snapshot;
use std::collections::HashMap;

pub(crate) struct InMemoryStoreInner {
    /// Initiatives indexed by ID for O(1) lookups
    pub(super) initiatives: HashMap<InitiativeId, Initiative>,

    /// Insertion order of `initiatives`. Every key in the map appears here once.
    pub(super) initiative_order: Vec<InitiativeId>,

    /// Dependency edges in insertion order
    pub(super) edges: Vec<DependencyEdge>,

    /// Stored scenarios in insertion order
    pub(super) scenarios: Vec<Scenario>,

    /// Generator for new edge ids
    pub(super) edge_ids: IdGenerator,
}

impl Default for InMemoryStoreInner {
    fn default() -> Self {
        Self {
            initiatives: HashMap::new(),
            initiative_order: Vec::new(),
            edges: Vec::new(),
            scenarios: Vec::new(),
            edge_ids: IdGenerator::new(EDGE_PREFIX),
        }
    }
}

impl InMemoryStoreInner {
    /// Upsert every record in the snapshot, keeping the position of replaced ones.
    pub(super) fn import(&mut self, snapshot: Snapshot) {
        for initiative in snapshot.initiatives {
            let id = initiative.id.clone();
            if self.initiatives.insert(id.clone(), initiative).is_none() {
                self.initiative_order.push(id);
            }
        }

        for edge in snapshot.edges {
            self.edge_ids.register_id(edge.id.as_str());
            match self.edges.iter_mut().find(|e| e.id == edge.id) {
                Some(existing) => *existing = edge,
                None => self.edges.push(edge),
            }
        }

        for scenario in snapshot.scenarios {
            self.upsert_scenario(scenario);
        }
    }

    pub(super) fn upsert_scenario(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(existing) => *existing = scenario,
            None => self.scenarios.push(scenario),
        }
    }

    pub(super) fn project_of(&self, id: &InitiativeId) -> Option<&ProjectId> {
        self.initiatives.get(id).map(|i| &i.project_id)
    }

    pub(super) fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut DependencyEdge> {
        self.edges.iter_mut().find(|e| &e.id == id)
    }

    /// Initiatives in insertion order.
    pub(super) fn ordered_initiatives(&self) -> impl Iterator<Item = &Initiative> {
        self.initiative_order
            .iter()
            .filter_map(|id| self.initiatives.get(id))
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            initiatives: self.ordered_initiatives().cloned().collect(),
            edges: self.edges.clone(),
            scenarios: self.scenarios.clone(),
        }
    }
}
