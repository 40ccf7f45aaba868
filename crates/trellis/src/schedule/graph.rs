//! Per-invocation dependency graph.
//!
//! A [`Graph`] is built fresh from the store's records on every engine call
//! and dropped afterwards. It wraps a petgraph `DiGraph` arena with an id to
//! node index map.
//!
//! ## Edge Direction Convention
//!
//! Edges point **predecessor -> successor** (the direction work flows): for a
//! BLOCKING edge `A -> B`, `B` may not start before `A` finishes.
//!
//! ## Node Set
//!
//! Nodes are the project's initiatives in store order, followed by any edge
//! endpoint that is not one of them. Only edges whose both endpoints are
//! project initiatives enter the adjacency; the rest stay in the raw edge
//! list and are reported by [`Graph::skipped_edges`].

use crate::domain::{DependencyEdge, DependencyKind, EdgeId, Initiative, InitiativeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Weight of an adjacency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GraphEdge {
    id: EdgeId,
    kind: DependencyKind,
}

/// One entry of an adjacency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjacent {
    /// The neighbouring initiative
    pub id: InitiativeId,

    /// Kind of the connecting edge
    pub kind: DependencyKind,

    /// Id of the connecting edge
    pub edge_id: EdgeId,
}

/// In-memory dependency graph for one project.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<InitiativeId, GraphEdge>,
    node_map: HashMap<InitiativeId, NodeIndex>,
    edges: Vec<DependencyEdge>,
    skipped: Vec<EdgeId>,
}

impl Graph {
    /// Build a graph from a project's initiatives and edges.
    ///
    /// Never fails: edges touching unknown initiatives are skipped from the
    /// adjacency (but their endpoints still become nodes).
    pub fn from_records(initiatives: &[Initiative], edges: Vec<DependencyEdge>) -> Self {
        let mut graph = Self::default();
        let known: HashSet<&InitiativeId> = initiatives.iter().map(|i| &i.id).collect();

        for initiative in initiatives {
            graph.ensure_node(&initiative.id);
        }

        for edge in &edges {
            let from = graph.ensure_node(&edge.from_id);
            let to = graph.ensure_node(&edge.to_id);

            if known.contains(&edge.from_id) && known.contains(&edge.to_id) {
                graph.graph.add_edge(
                    from,
                    to,
                    GraphEdge {
                        id: edge.id.clone(),
                        kind: edge.kind,
                    },
                );
            } else {
                tracing::warn!(
                    edge = %edge.id,
                    from = %edge.from_id,
                    to = %edge.to_id,
                    "Skipping dependency edge that references an unknown initiative"
                );
                graph.skipped.push(edge.id.clone());
            }
        }

        graph.edges = edges;
        graph
    }

    /// Add a node explicitly (e.g. an initiative being queried), returning its index.
    pub fn with_node(mut self, id: &InitiativeId) -> Self {
        self.ensure_node(id);
        self
    }

    fn ensure_node(&mut self, id: &InitiativeId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), index);
        index
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &InitiativeId> {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    /// Whether the id is a node of this graph.
    pub fn contains(&self, id: &InitiativeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges in the adjacency (skipped edges excluded).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The raw edge list as read from the store.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Ids of edges left out of the adjacency.
    pub fn skipped_edges(&self) -> &[EdgeId] {
        &self.skipped
    }

    /// Outgoing neighbours of a node in edge insertion order.
    pub fn successors(&self, id: &InitiativeId) -> Vec<Adjacent> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Incoming neighbours of a node in edge insertion order.
    pub fn predecessors(&self, id: &InitiativeId) -> Vec<Adjacent> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Successors over BLOCKING edges only.
    pub fn blocking_successors(&self, id: &InitiativeId) -> Vec<InitiativeId> {
        self.successors(id)
            .into_iter()
            .filter(|a| a.kind.is_blocking())
            .map(|a| a.id)
            .collect()
    }

    /// Predecessors over BLOCKING edges only.
    pub fn blocking_predecessors(&self, id: &InitiativeId) -> Vec<InitiativeId> {
        self.predecessors(id)
            .into_iter()
            .filter(|a| a.kind.is_blocking())
            .map(|a| a.id)
            .collect()
    }

    fn neighbours(&self, id: &InitiativeId, direction: Direction) -> Vec<Adjacent> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };

        // petgraph yields edges newest first
        let mut adjacent: Vec<Adjacent> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                Adjacent {
                    id: self.graph[other].clone(),
                    kind: edge.weight().kind,
                    edge_id: edge.weight().id.clone(),
                }
            })
            .collect();
        adjacent.reverse();
        adjacent
    }

    /// Serializable adjacency view.
    pub fn view(&self) -> GraphView {
        let nodes: Vec<InitiativeId> = self.nodes().cloned().collect();
        let adjacency = nodes
            .iter()
            .map(|id| AdjacencyEntry {
                id: id.clone(),
                successors: self.successors(id),
            })
            .collect();
        GraphView {
            nodes,
            adjacency,
            edges: self.edges.clone(),
            skipped_edges: self.skipped.clone(),
        }
    }
}

/// Serializable snapshot of a [`Graph`].
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    /// Node ids in insertion order
    pub nodes: Vec<InitiativeId>,

    /// Successor lists per node
    pub adjacency: Vec<AdjacencyEntry>,

    /// Raw edge list
    pub edges: Vec<DependencyEdge>,

    /// Edges left out of the adjacency
    pub skipped_edges: Vec<EdgeId>,
}

/// Successor list of one node.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyEntry {
    /// Node id
    pub id: InitiativeId,

    /// Its successors
    pub successors: Vec<Adjacent>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{DependencyEdge, DependencyKind, Initiative};
    use chrono::NaiveDate;

    /// Day `n` of the test calendar (2026-01-01 is day 0).
    pub(crate) fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Duration::days(n)
    }

    /// Initiative named after its id spanning `[start, end)` in test days.
    pub(crate) fn initiative(id: &str, start: i64, end: i64) -> Initiative {
        Initiative::new(id, "p", id, Some(day(start)), Some(day(end)))
    }

    pub(crate) fn blocking(from: &str, to: &str) -> DependencyEdge {
        DependencyEdge::new(format!("{from}-{to}"), from, to, DependencyKind::Blocking)
    }

    pub(crate) fn soft(from: &str, to: &str) -> DependencyEdge {
        DependencyEdge::new(format!("{from}~{to}"), from, to, DependencyKind::Soft)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{blocking, initiative, soft};
    use super::*;

    fn ids(adjacent: &[Adjacent]) -> Vec<&str> {
        adjacent.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_empty_project_yields_empty_graph() {
        let graph = Graph::from_records(&[], vec![]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_successors_preserve_insertion_order() {
        let initiatives = vec![
            initiative("a", 0, 1),
            initiative("b", 0, 1),
            initiative("c", 0, 1),
            initiative("d", 0, 1),
        ];
        let graph = Graph::from_records(
            &initiatives,
            vec![blocking("a", "c"), soft("a", "b"), blocking("a", "d")],
        );

        assert_eq!(ids(&graph.successors(&"a".into())), vec!["c", "b", "d"]);
        assert_eq!(
            graph.blocking_successors(&"a".into()),
            vec![InitiativeId::new("c"), InitiativeId::new("d")]
        );
        assert_eq!(ids(&graph.predecessors(&"b".into())), vec!["a"]);
        assert!(graph.blocking_predecessors(&"b".into()).is_empty());
    }

    #[test]
    fn test_dangling_edges_are_skipped_but_endpoints_are_nodes() {
        let initiatives = vec![initiative("a", 0, 1)];
        let graph = Graph::from_records(&initiatives, vec![blocking("a", "ghost")]);

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains(&"ghost".into()));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.skipped_edges(), &[EdgeId::new("a-ghost")]);
        assert!(graph.successors(&"a".into()).is_empty());
    }

    #[test]
    fn test_self_edge_is_kept() {
        let initiatives = vec![initiative("a", 0, 1)];
        let graph = Graph::from_records(&initiatives, vec![blocking("a", "a")]);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(ids(&graph.successors(&"a".into())), vec!["a"]);
    }

    #[test]
    fn test_explicit_node_and_view() {
        let graph = Graph::from_records(&[initiative("a", 0, 1)], vec![]).with_node(&"q".into());
        let nodes: Vec<&str> = graph.nodes().map(InitiativeId::as_str).collect();
        assert_eq!(nodes, vec!["a", "q"]);

        let view = graph.view();
        assert_eq!(view.adjacency.len(), 2);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["nodes"][1], "q");
    }
}
