//! Schedule conflicts against declared dependencies.

use super::cycles::CycleReport;
use super::graph::Graph;
use crate::domain::{EdgeId, Initiative, InitiativeId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// A single conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conflict {
    /// A successor is planned to start before its BLOCKING predecessor ends.
    DependencyViolation {
        /// Offending edge
        edge_id: EdgeId,
        /// Predecessor id
        from_id: InitiativeId,
        /// Predecessor name
        from_name: String,
        /// Successor id
        to_id: InitiativeId,
        /// Successor name
        to_name: String,
        /// Predecessor planned end
        predecessor_end: NaiveDate,
        /// Successor planned start
        successor_start: NaiveDate,
        /// Overlap in days, always positive
        gap_days: i64,
        /// Human-readable summary
        message: String,
    },

    /// The graph contains at least one cycle.
    CircularDependency {
        /// Every cycle found
        cycles: Vec<Vec<InitiativeId>>,
        /// Human-readable summary
        message: String,
    },
}

/// All conflicts of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Whether any conflict exists
    pub has_conflicts: bool,

    /// `conflicts.len()`
    pub conflict_count: usize,

    /// Violations in edge order, then the circular entry if any
    pub conflicts: Vec<Conflict>,
}

/// Compare every BLOCKING edge's dates and fold in the cycle report.
///
/// Edges with an unknown endpoint or a missing date are skipped.
///
/// A BLOCKING self-edge is deliberately left out of the date check, even
/// though every other BLOCKING edge is compared: its end always falls after
/// its own start. It is reported once, inside the circular entry.
pub fn detect(graph: &Graph, initiatives: &[Initiative], cycles: &CycleReport) -> ConflictReport {
    let by_id: HashMap<&InitiativeId, &Initiative> =
        initiatives.iter().map(|i| (&i.id, i)).collect();

    let mut conflicts: Vec<Conflict> = graph
        .edges()
        .iter()
        .filter(|edge| edge.kind.is_blocking() && !edge.is_self_edge())
        .filter_map(|edge| {
            let from = by_id.get(&edge.from_id)?;
            let to = by_id.get(&edge.to_id)?;
            let predecessor_end = from.planned_end?;
            let successor_start = to.planned_start?;
            if successor_start >= predecessor_end {
                return None;
            }

            let gap_days = (predecessor_end - successor_start).num_days();
            Some(Conflict::DependencyViolation {
                edge_id: edge.id.clone(),
                from_id: from.id.clone(),
                from_name: from.name.clone(),
                to_id: to.id.clone(),
                to_name: to.name.clone(),
                predecessor_end,
                successor_start,
                gap_days,
                message: format!(
                    "{} starts {gap_days} day(s) before {} ends",
                    to.name, from.name
                ),
            })
        })
        .collect();

    if cycles.has_cycles {
        conflicts.push(Conflict::CircularDependency {
            cycles: cycles.cycles.clone(),
            message: format!("{} circular dependency chain(s) found", cycles.cycles.len()),
        });
    }

    ConflictReport {
        has_conflicts: !conflicts.is_empty(),
        conflict_count: conflicts.len(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::super::cycles::find_cycles;
    use super::super::graph::test_support::{blocking, initiative, soft};
    use super::*;
    use crate::domain::DependencyEdge;

    fn run(initiatives: &[Initiative], edges: Vec<DependencyEdge>) -> ConflictReport {
        let graph = Graph::from_records(initiatives, edges);
        let cycles = find_cycles(&graph);
        detect(&graph, initiatives, &cycles)
    }

    #[test]
    fn test_overlap_reports_gap_days() {
        let report = run(
            &[initiative("a", 0, 5), initiative("b", 3, 8)],
            vec![blocking("a", "b")],
        );

        assert!(report.has_conflicts);
        assert_eq!(report.conflict_count, 1);
        match &report.conflicts[0] {
            Conflict::DependencyViolation {
                gap_days, to_name, ..
            } => {
                assert_eq!(*gap_days, 2);
                assert_eq!(to_name, "b");
            }
            other => panic!("unexpected conflict: {other:?}"),
        }
    }

    #[test]
    fn test_back_to_back_is_fine() {
        let report = run(
            &[initiative("a", 0, 5), initiative("b", 5, 8)],
            vec![blocking("a", "b")],
        );
        assert!(!report.has_conflicts);
        assert_eq!(report.conflict_count, 0);
    }

    #[test]
    fn test_soft_edges_and_missing_dates_are_skipped() {
        let report = run(
            &[
                initiative("a", 0, 5),
                initiative("b", 1, 8),
                Initiative::new("c", "p", "c", None, None),
            ],
            vec![soft("a", "b"), blocking("a", "c")],
        );
        assert!(!report.has_conflicts);
    }

    #[test]
    fn test_cycles_add_one_circular_entry() {
        let report = run(
            &[initiative("a", 0, 5), initiative("b", 5, 8)],
            vec![blocking("a", "b"), soft("b", "a"), blocking("a", "a")],
        );

        assert_eq!(report.conflict_count, 1);
        let json = serde_json::to_value(&report.conflicts[0]).unwrap();
        assert_eq!(json["type"], "CIRCULAR_DEPENDENCY");
        assert_eq!(json["cycles"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_violation_serializes_with_type_tag() {
        let report = run(
            &[initiative("a", 0, 5), initiative("b", 3, 8)],
            vec![blocking("a", "b")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["conflicts"][0]["type"], "DEPENDENCY_VIOLATION");
        assert_eq!(json["conflicts"][0]["gap_days"], 2);
    }
}
