//! Schedule risk summary built from the critical path and conflicts.

use super::conflicts::ConflictReport;
use super::critical_path::{CriticalPathReport, PathEntry};
use crate::config::EngineConfig;
use serde::Serialize;
use std::fmt;

/// Overall or per-item risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Nothing notable
    Low,
    /// Worth watching
    Medium,
    /// Needs action
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::Medium => f.write_str("MEDIUM"),
            Self::High => f.write_str("HIGH"),
        }
    }
}

/// What triggered a risk item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskKind {
    /// Makespan over the long-schedule threshold
    LongSchedule,
    /// Dependency violations or cycles
    ScheduleConflicts,
    /// Critical path longer than the chain threshold
    LongCriticalChain,
}

/// One triggered risk condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskItem {
    /// Trigger
    pub kind: RiskKind,

    /// Level this condition contributes
    pub level: RiskLevel,

    /// Human-readable description
    pub message: String,
}

/// Critical path plus the risks it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAnalysis {
    /// Critical initiatives in topological order
    pub critical_path: Vec<PathEntry>,

    /// Project makespan in days
    pub total_duration: i64,

    /// Triggered conditions
    pub risks: Vec<RiskItem>,

    /// One suggestion per triggered condition
    pub recommendations: Vec<String>,

    /// Highest level among the triggered conditions
    pub overall_risk: RiskLevel,
}

/// Combine a critical path and a conflict report into a risk summary.
pub fn assess(
    critical: CriticalPathReport,
    conflicts: &ConflictReport,
    config: &EngineConfig,
) -> RiskAnalysis {
    let mut risks = Vec::new();
    let mut recommendations = Vec::new();

    if critical.total_duration > config.long_schedule_days {
        risks.push(RiskItem {
            kind: RiskKind::LongSchedule,
            level: RiskLevel::High,
            message: format!(
                "Project spans {} days, over the {}-day threshold",
                critical.total_duration, config.long_schedule_days
            ),
        });
        recommendations
            .push("Split the project into phases or trim scope on the critical path".to_string());
    }

    if conflicts.has_conflicts {
        risks.push(RiskItem {
            kind: RiskKind::ScheduleConflicts,
            level: RiskLevel::High,
            message: format!("{} schedule conflict(s) detected", conflicts.conflict_count),
        });
        recommendations
            .push("Reschedule overlapping initiatives and break circular dependencies".to_string());
    }

    if critical.critical_path.len() > config.critical_chain_nodes {
        risks.push(RiskItem {
            kind: RiskKind::LongCriticalChain,
            level: RiskLevel::Medium,
            message: format!(
                "{} initiatives on the critical path, over the limit of {}",
                critical.critical_path.len(),
                config.critical_chain_nodes
            ),
        });
        recommendations
            .push("Parallelize work or add buffer to initiatives on the critical path".to_string());
    }

    let overall_risk = risks
        .iter()
        .map(|risk| risk.level)
        .max()
        .unwrap_or(RiskLevel::Low);

    RiskAnalysis {
        critical_path: critical.critical_path,
        total_duration: critical.total_duration,
        risks,
        recommendations,
        overall_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::super::conflicts::Conflict;
    use super::*;
    use crate::domain::InitiativeId;
    use rstest::rstest;

    fn path(len: usize) -> Vec<PathEntry> {
        (0..len)
            .map(|i| PathEntry {
                id: InitiativeId::new(format!("n{i}")),
                name: format!("N{i}"),
                duration: 1,
                earliest_start: 0,
                earliest_finish: 1,
            })
            .collect()
    }

    fn critical(total_duration: i64, nodes: usize) -> CriticalPathReport {
        CriticalPathReport {
            critical_path: path(nodes),
            total_duration,
            critical_count: nodes,
            ..Default::default()
        }
    }

    fn conflicted() -> ConflictReport {
        ConflictReport {
            has_conflicts: true,
            conflict_count: 1,
            conflicts: vec![Conflict::CircularDependency {
                cycles: vec![vec![InitiativeId::new("a")]],
                message: "1 circular dependency chain(s) found".to_string(),
            }],
        }
    }

    #[rstest]
    #[case::quiet(100, 3, false, RiskLevel::Low, 0)]
    #[case::at_threshold(365, 5, false, RiskLevel::Low, 0)]
    #[case::long(366, 1, false, RiskLevel::High, 1)]
    #[case::conflicts(10, 1, true, RiskLevel::High, 1)]
    #[case::chain(10, 6, false, RiskLevel::Medium, 1)]
    #[case::everything(400, 6, true, RiskLevel::High, 3)]
    fn test_overall_risk(
        #[case] total: i64,
        #[case] nodes: usize,
        #[case] has_conflicts: bool,
        #[case] expected: RiskLevel,
        #[case] items: usize,
    ) {
        let conflicts = if has_conflicts {
            conflicted()
        } else {
            ConflictReport::default()
        };

        let analysis = assess(critical(total, nodes), &conflicts, &EngineConfig::default());

        assert_eq!(analysis.overall_risk, expected);
        assert_eq!(analysis.risks.len(), items);
        assert_eq!(analysis.recommendations.len(), items);
        assert_eq!(analysis.total_duration, total);
        assert_eq!(analysis.critical_path.len(), nodes);
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let config = EngineConfig {
            long_schedule_days: 30,
            critical_chain_nodes: 1,
            ..EngineConfig::default()
        };
        let analysis = assess(critical(31, 2), &ConflictReport::default(), &config);

        let kinds: Vec<RiskKind> = analysis.risks.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RiskKind::LongSchedule, RiskKind::LongCriticalChain]
        );
    }

    #[test]
    fn test_level_serialization() {
        let level = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(level, "\"MEDIUM\"");
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }
}
