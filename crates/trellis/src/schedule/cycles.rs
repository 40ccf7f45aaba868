//! Cycle detection over every edge kind.
//!
//! Iterative depth-first search with a three-state marker. A back edge (one
//! that reaches a node still on the DFS stack) closes a cycle; the recorded
//! cycle is the stack slice from the re-entered node to the current one. A
//! self-edge therefore yields a one-node cycle.
//!
//! Every node is used as a root in graph order, so disconnected components
//! are all covered.

use super::graph::Graph;
use crate::domain::InitiativeId;
use serde::Serialize;
use std::collections::HashMap;

/// Cycles found in a project graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Whether at least one cycle exists
    pub has_cycles: bool,

    /// Each cycle as the sequence of nodes along it
    pub cycles: Vec<Vec<InitiativeId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

struct Frame {
    id: InitiativeId,
    successors: Vec<InitiativeId>,
    next: usize,
}

impl Frame {
    fn new(graph: &Graph, id: InitiativeId) -> Self {
        let successors = graph.successors(&id).into_iter().map(|a| a.id).collect();
        Self {
            id,
            successors,
            next: 0,
        }
    }
}

/// Find every cycle reachable by DFS, considering BLOCKING and SOFT edges.
///
/// Deterministic for a given edge insertion order.
pub fn find_cycles(graph: &Graph) -> CycleReport {
    let mut marks: HashMap<InitiativeId, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for root in graph.nodes() {
        if marks.contains_key(root) {
            continue;
        }

        marks.insert(root.clone(), Mark::OnStack);
        let mut stack = vec![Frame::new(graph, root.clone())];

        while let Some(top) = stack.last_mut() {
            let Some(next) = top.successors.get(top.next).cloned() else {
                marks.insert(top.id.clone(), Mark::Done);
                stack.pop();
                continue;
            };
            top.next += 1;

            match marks.get(&next).copied() {
                None => {
                    marks.insert(next.clone(), Mark::OnStack);
                    stack.push(Frame::new(graph, next));
                }
                Some(Mark::OnStack) => {
                    let start = stack
                        .iter()
                        .position(|frame| frame.id == next)
                        .unwrap_or_default();
                    cycles.push(stack[start..].iter().map(|f| f.id.clone()).collect());
                }
                Some(Mark::Done) => {}
            }
        }
    }

    CycleReport {
        has_cycles: !cycles.is_empty(),
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::super::graph::test_support::{blocking, initiative, soft};
    use super::*;
    use crate::domain::{DependencyEdge, Initiative};

    fn graph(ids: &[&str], edges: Vec<DependencyEdge>) -> Graph {
        let initiatives: Vec<Initiative> = ids.iter().map(|id| initiative(id, 0, 1)).collect();
        Graph::from_records(&initiatives, edges)
    }

    fn as_strs(cycle: &[InitiativeId]) -> Vec<&str> {
        cycle.iter().map(InitiativeId::as_str).collect()
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let g = graph(
            &["a", "b", "c"],
            vec![blocking("a", "b"), blocking("b", "c"), blocking("a", "c")],
        );
        let report = find_cycles(&g);
        assert!(!report.has_cycles);
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn test_three_node_cycle() {
        let g = graph(
            &["a", "b", "c"],
            vec![blocking("a", "b"), blocking("b", "c"), blocking("c", "a")],
        );
        let report = find_cycles(&g);
        assert!(report.has_cycles);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(as_strs(&report.cycles[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_self_edge_is_one_node_cycle() {
        let g = graph(&["a", "b"], vec![blocking("a", "b"), blocking("b", "b")]);
        let report = find_cycles(&g);
        assert_eq!(report.cycles, vec![vec![InitiativeId::new("b")]]);
    }

    #[test]
    fn test_soft_edges_participate() {
        let g = graph(&["a", "b"], vec![blocking("a", "b"), soft("b", "a")]);
        let report = find_cycles(&g);
        assert!(report.has_cycles);
        assert_eq!(as_strs(&report.cycles[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_disconnected_components_are_all_visited() {
        let g = graph(
            &["a", "b", "x", "y"],
            vec![blocking("a", "b"), blocking("x", "y"), blocking("y", "x")],
        );
        let report = find_cycles(&g);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(as_strs(&report.cycles[0]), vec!["x", "y"]);
    }

    #[test]
    fn test_cycle_behind_a_tail_starts_at_reentered_node() {
        let g = graph(
            &["t", "a", "b"],
            vec![blocking("t", "a"), blocking("a", "b"), blocking("b", "a")],
        );
        let report = find_cycles(&g);
        assert_eq!(as_strs(&report.cycles[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_dangling_edges_never_panic() {
        let initiatives = vec![initiative("a", 0, 1)];
        let g = Graph::from_records(
            &initiatives,
            vec![blocking("a", "ghost"), blocking("ghost", "a")],
        );
        assert!(!find_cycles(&g).has_cycles);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let ids: Vec<String> = (0..10_000).map(|i| format!("n{i}")).collect();
        let initiatives: Vec<Initiative> = ids.iter().map(|id| initiative(id, 0, 1)).collect();
        let edges = ids
            .windows(2)
            .map(|pair| blocking(&pair[0], &pair[1]))
            .collect();
        let g = Graph::from_records(&initiatives, edges);
        assert!(!find_cycles(&g).has_cycles);
    }
}
