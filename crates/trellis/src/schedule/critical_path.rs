//! Forward-pass critical path calculation.
//!
//! Kahn-style topological pass over BLOCKING edges computing earliest
//! start/finish per initiative. Durations are `max(1, end - start)` days.
//!
//! ## Slack
//!
//! Slack is `latest_finish - earliest_finish`, where the latest finish comes
//! from the configured [`SlackBaseline`]:
//!
//! - `Global` (default): the project makespan for every node. A project
//!   without BLOCKING edges has nothing to measure against, so every node
//!   gets slack 0 and is its own critical path.
//! - `Component`: the makespan of the node's weakly connected BLOCKING
//!   component. Isolated initiatives are each their own critical path.
//! - `BackwardPass`: classical CPM latest finish from successors.
//!
//! The first two skip the backward pass, so along a chain only the node
//! finishing last has zero slack. A node is critical when its slack is
//! `<= 0`.
//!
//! Initiatives that never reach in-degree zero (on or behind a BLOCKING
//! cycle) are left unscheduled.

use super::graph::Graph;
use crate::config::SlackBaseline;
use crate::domain::{Initiative, InitiativeId};
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// One initiative on the critical path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    /// Initiative id
    pub id: InitiativeId,

    /// Initiative name
    pub name: String,

    /// Planned duration in days
    pub duration: i64,

    /// Day offset the initiative can start at
    pub earliest_start: i64,

    /// `earliest_start + duration`
    pub earliest_finish: i64,
}

/// Forward-pass result for one scheduled initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// Initiative id
    pub id: InitiativeId,

    /// Initiative name
    pub name: String,

    /// Planned duration in days
    pub duration: i64,

    /// Day offset the initiative can start at
    pub earliest_start: i64,

    /// `earliest_start + duration`
    pub earliest_finish: i64,

    /// Days the finish can slip against its baseline
    pub slack: i64,

    /// `slack <= 0`
    pub is_critical: bool,
}

impl From<&ScheduleEntry> for PathEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            duration: entry.duration,
            earliest_start: entry.earliest_start,
            earliest_finish: entry.earliest_finish,
        }
    }
}

/// Critical path of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriticalPathReport {
    /// Critical initiatives in topological order
    pub critical_path: Vec<PathEntry>,

    /// Project makespan in days
    pub total_duration: i64,

    /// Number of critical initiatives
    pub critical_count: usize,

    /// Number of other initiatives, unscheduled ones included
    pub non_critical_count: usize,

    /// Every scheduled initiative in topological order
    pub schedule: Vec<ScheduleEntry>,

    /// Initiatives the forward pass never reached
    pub unscheduled: Vec<InitiativeId>,
}

impl CriticalPathReport {
    /// Critical marker for every initiative, in the order to write it back.
    pub fn critical_flags(&self) -> impl Iterator<Item = (&InitiativeId, bool)> {
        self.schedule
            .iter()
            .map(|entry| (&entry.id, entry.is_critical))
            .chain(self.unscheduled.iter().map(|id| (id, false)))
    }
}

/// Run the forward pass over a project's initiatives.
///
/// Only initiatives take part; graph nodes without a record (dangling edge
/// endpoints) are ignored.
pub fn compute(
    graph: &Graph,
    initiatives: &[Initiative],
    baseline: SlackBaseline,
) -> CriticalPathReport {
    let count = initiatives.len();
    let index: HashMap<&InitiativeId, usize> = initiatives
        .iter()
        .enumerate()
        .map(|(i, initiative)| (&initiative.id, i))
        .collect();

    let durations: Vec<i64> = initiatives.iter().map(Initiative::duration_days).collect();
    let successors: Vec<Vec<usize>> = initiatives
        .iter()
        .map(|initiative| {
            graph
                .blocking_successors(&initiative.id)
                .iter()
                .filter_map(|s| index.get(s).copied())
                .collect()
        })
        .collect();

    let mut in_degree = vec![0_usize; count];
    for &s in successors.iter().flatten() {
        in_degree[s] += 1;
    }

    // === Forward pass ===
    let mut earliest_start = vec![0_i64; count];
    let mut earliest_finish: Vec<Option<i64>> = vec![None; count];
    let mut order = Vec::with_capacity(count);
    let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();

    while let Some(node) = queue.pop_front() {
        let finish = earliest_start[node] + durations[node];
        earliest_finish[node] = Some(finish);
        order.push(node);

        for &s in &successors[node] {
            earliest_start[s] = earliest_start[s].max(finish);
            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    let makespan = earliest_finish.iter().flatten().copied().max().unwrap_or(0);

    // === Slack ===
    let latest_finish = match baseline {
        SlackBaseline::Global if successors.iter().all(Vec::is_empty) => earliest_finish
            .iter()
            .map(|finish| finish.unwrap_or(makespan))
            .collect(),
        SlackBaseline::Global => vec![makespan; count],
        SlackBaseline::Component => component_makespans(&successors, &earliest_finish),
        SlackBaseline::BackwardPass => {
            backward_pass(&order, &successors, &durations, &earliest_finish, makespan)
        }
    };

    let schedule: Vec<ScheduleEntry> = order
        .iter()
        .filter_map(|&i| {
            let finish = earliest_finish[i]?;
            let slack = latest_finish[i] - finish;
            Some(ScheduleEntry {
                id: initiatives[i].id.clone(),
                name: initiatives[i].name.clone(),
                duration: durations[i],
                earliest_start: earliest_start[i],
                earliest_finish: finish,
                slack,
                is_critical: slack <= 0,
            })
        })
        .collect();

    let unscheduled: Vec<InitiativeId> = (0..count)
        .filter(|&i| earliest_finish[i].is_none())
        .map(|i| initiatives[i].id.clone())
        .collect();

    let critical_path: Vec<PathEntry> = schedule
        .iter()
        .filter(|entry| entry.is_critical)
        .map(PathEntry::from)
        .collect();

    CriticalPathReport {
        critical_count: critical_path.len(),
        non_critical_count: count - critical_path.len(),
        critical_path,
        total_duration: makespan,
        schedule,
        unscheduled,
    }
}

/// Latest finish = makespan of the node's weakly connected component.
fn component_makespans(successors: &[Vec<usize>], earliest_finish: &[Option<i64>]) -> Vec<i64> {
    let count = successors.len();
    let mut components = UnionFind::<usize>::new(count);
    for (node, succs) in successors.iter().enumerate() {
        for &s in succs {
            components.union(node, s);
        }
    }

    let mut makespans: HashMap<usize, i64> = HashMap::new();
    for (node, finish) in earliest_finish.iter().enumerate() {
        if let Some(finish) = finish {
            let span = makespans.entry(components.find(node)).or_default();
            *span = (*span).max(*finish);
        }
    }

    (0..count)
        .map(|node| {
            makespans
                .get(&components.find(node))
                .copied()
                .unwrap_or_default()
        })
        .collect()
}

/// Classical CPM: latest finish is the minimum latest start of the successors.
fn backward_pass(
    order: &[usize],
    successors: &[Vec<usize>],
    durations: &[i64],
    earliest_finish: &[Option<i64>],
    makespan: i64,
) -> Vec<i64> {
    let mut latest_finish = vec![makespan; successors.len()];
    for &node in order.iter().rev() {
        latest_finish[node] = successors[node]
            .iter()
            .filter(|&&s| earliest_finish[s].is_some())
            .map(|&s| latest_finish[s] - durations[s])
            .min()
            .unwrap_or(makespan);
    }
    latest_finish
}
