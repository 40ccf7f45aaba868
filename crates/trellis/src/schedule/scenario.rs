//! What-if evaluation of proposed date changes.
//!
//! Every change is applied to a working copy of the project's initiatives
//! before any of them is evaluated, so a change that moves both ends of a
//! dependency is judged against the final proposed dates. Each change is
//! then checked against its direct BLOCKING neighbours:
//!
//! - a later planned end is a delay: it counts toward the total and breaks
//!   every successor that would now start before it
//! - a planned start breaks every predecessor that would still be running
//!
//! Problems with the input itself (unknown ids, start after end) become
//! warnings; nothing here fails.

use super::graph::Graph;
use crate::domain::{ImpactReport, Initiative, InitiativeId, ScenarioChange, ScenarioField};
use std::collections::{HashMap, HashSet, VecDeque};

/// Evaluate a set of changes without touching the store.
pub fn evaluate(
    graph: &Graph,
    initiatives: &[Initiative],
    changes: &[ScenarioChange],
) -> ImpactReport {
    let original: HashMap<&InitiativeId, &Initiative> =
        initiatives.iter().map(|i| (&i.id, i)).collect();
    let mut working: HashMap<InitiativeId, Initiative> = initiatives
        .iter()
        .map(|i| (i.id.clone(), i.clone()))
        .collect();

    let mut report = ImpactReport::default();
    let mut changed: Vec<InitiativeId> = Vec::new();

    // === Apply ===
    for change in changes {
        let Some(initiative) = working.get_mut(&change.initiative_id) else {
            report.warnings.push(format!(
                "Unknown initiative {}; change to {} ignored",
                change.initiative_id, change.field
            ));
            continue;
        };
        match change.field {
            ScenarioField::PlannedStartDate => initiative.planned_start = Some(change.new_value),
            ScenarioField::PlannedEndDate => initiative.planned_end = Some(change.new_value),
        }
        if !changed.contains(&change.initiative_id) {
            changed.push(change.initiative_id.clone());
        }
    }

    for id in &changed {
        let Some(initiative) = working.get(id) else {
            continue;
        };
        if let (Some(start), Some(end)) = (initiative.planned_start, initiative.planned_end)
            && start > end
        {
            report.warnings.push(format!(
                "{}: planned start {start} is after planned end {end}",
                initiative.name
            ));
        }
    }

    // === Evaluate ===
    let mut delayed: Vec<&InitiativeId> = Vec::new();

    for change in changes {
        let Some(&before) = original.get(&change.initiative_id) else {
            continue;
        };
        let new_value = change.new_value;

        match change.field {
            ScenarioField::PlannedEndDate => {
                let Some(old_end) = before.planned_end else {
                    report.warnings.push(format!(
                        "{} has no planned end date; delay cannot be measured",
                        before.name
                    ));
                    continue;
                };
                let delta = (new_value - old_end).num_days();
                if delta <= 0 {
                    continue;
                }
                report.total_delay_days += delta;
                delayed.push(&before.id);

                for successor in graph.blocking_successors(&before.id) {
                    let Some(next) = working.get(&successor) else {
                        continue;
                    };
                    if let Some(start) = next.planned_start.filter(|start| *start < new_value) {
                        report.dependency_breaks.push(format!(
                            "{} → {}: {} starts {start}, before the new end {new_value}",
                            before.name, next.name, next.name
                        ));
                    }
                }
            }
            ScenarioField::PlannedStartDate => {
                for predecessor in graph.blocking_predecessors(&before.id) {
                    let Some(prev) = working.get(&predecessor) else {
                        continue;
                    };
                    if let Some(end) = prev.planned_end.filter(|end| new_value < *end) {
                        report.dependency_breaks.push(format!(
                            "{} → {}: new start {new_value} precedes {} ending {end}",
                            prev.name, before.name, prev.name
                        ));
                    }
                }
            }
        }
    }

    report.affected_initiative_ids = affected(graph, changed, &delayed);
    report.is_valid = report.dependency_breaks.is_empty();
    report
}

/// Changed initiatives, then everything downstream of a delay, in discovery order.
fn affected(
    graph: &Graph,
    changed: Vec<InitiativeId>,
    delayed: &[&InitiativeId],
) -> Vec<InitiativeId> {
    let mut seen: HashSet<InitiativeId> = changed.iter().cloned().collect();
    let mut affected = changed;
    let mut queue: VecDeque<InitiativeId> = delayed.iter().map(|&id| id.clone()).collect();

    while let Some(id) = queue.pop_front() {
        for successor in graph.blocking_successors(&id) {
            if seen.insert(successor.clone()) {
                affected.push(successor.clone());
                queue.push_back(successor);
            }
        }
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::super::graph::test_support::{blocking, day, initiative, soft};
    use super::*;
    use crate::domain::DependencyEdge;

    fn run(
        initiatives: &[Initiative],
        edges: Vec<DependencyEdge>,
        changes: &[ScenarioChange],
    ) -> ImpactReport {
        let graph = Graph::from_records(initiatives, edges);
        evaluate(&graph, initiatives, changes)
    }

    fn ids(report: &ImpactReport) -> Vec<&str> {
        report
            .affected_initiative_ids
            .iter()
            .map(InitiativeId::as_str)
            .collect()
    }

    #[test]
    fn test_delay_breaks_direct_successor() {
        let initiatives = [initiative("A", 0, 5), initiative("B", 5, 9)];
        let report = run(
            &initiatives,
            vec![blocking("A", "B")],
            &[ScenarioChange::end("A", day(10))],
        );

        assert_eq!(report.total_delay_days, 5);
        assert!(!report.is_valid);
        assert_eq!(report.dependency_breaks.len(), 1);
        assert!(report.dependency_breaks[0].starts_with("A → B"));
        assert_eq!(ids(&report), vec!["A", "B"]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_earlier_end_is_not_a_delay() {
        let initiatives = [initiative("A", 0, 5), initiative("B", 5, 9)];
        let report = run(
            &initiatives,
            vec![blocking("A", "B")],
            &[ScenarioChange::end("A", day(4))],
        );

        assert_eq!(report.total_delay_days, 0);
        assert!(report.is_valid);
        assert_eq!(ids(&report), vec!["A"]);
    }

    #[test]
    fn test_delay_within_slack_is_valid_but_still_propagates() {
        let initiatives = [
            initiative("A", 0, 5),
            initiative("B", 8, 9),
            initiative("C", 9, 12),
        ];
        let report = run(
            &initiatives,
            vec![blocking("A", "B"), blocking("B", "C")],
            &[ScenarioChange::end("A", day(7))],
        );

        assert!(report.is_valid);
        assert_eq!(report.total_delay_days, 2);
        assert_eq!(ids(&report), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_soft_successor_never_breaks() {
        let initiatives = [initiative("A", 0, 5), initiative("B", 5, 9)];
        let report = run(
            &initiatives,
            vec![soft("A", "B")],
            &[ScenarioChange::end("A", day(10))],
        );
        assert!(report.is_valid);
        assert_eq!(ids(&report), vec!["A"]);
    }

    #[test]
    fn test_early_start_breaks_predecessor() {
        let initiatives = [initiative("A", 0, 5), initiative("B", 5, 9)];
        let report = run(
            &initiatives,
            vec![blocking("A", "B")],
            &[ScenarioChange::start("B", day(3))],
        );

        assert!(!report.is_valid);
        assert!(report.dependency_breaks[0].starts_with("A → B"));
        assert_eq!(report.total_delay_days, 0);
    }

    #[test]
    fn test_changes_are_judged_against_final_dates() {
        // Delaying A and pushing B back together keeps the plan consistent
        let initiatives = [initiative("A", 0, 5), initiative("B", 5, 9)];
        let report = run(
            &initiatives,
            vec![blocking("A", "B")],
            &[
                ScenarioChange::end("A", day(10)),
                ScenarioChange::start("B", day(10)),
            ],
        );

        assert!(report.is_valid, "breaks: {:?}", report.dependency_breaks);
        assert_eq!(report.total_delay_days, 5);
        assert_eq!(ids(&report), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_initiative_and_inverted_dates_warn() {
        let initiatives = [initiative("A", 0, 5)];
        let report = run(
            &initiatives,
            vec![],
            &[
                ScenarioChange::end("ghost", day(3)),
                ScenarioChange::start("A", day(8)),
            ],
        );

        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("ghost"));
        assert!(report.warnings[1].contains("after planned end"));
        assert_eq!(ids(&report), vec!["A"]);
    }

    #[test]
    fn test_multiple_delays_accumulate() {
        let initiatives = [initiative("A", 0, 5), initiative("B", 0, 5)];
        let report = run(
            &initiatives,
            vec![],
            &[
                ScenarioChange::end("A", day(8)),
                ScenarioChange::end("B", day(6)),
            ],
        );
        assert_eq!(report.total_delay_days, 4);
    }

    #[test]
    fn test_empty_changes() {
        let report = run(&[initiative("A", 0, 5)], vec![], &[]);
        assert!(report.is_valid);
        assert!(report.affected_initiative_ids.is_empty());
    }
}
