//! Output formatting for CLI commands.
//!
//! Every report can be printed as human-readable text or as pretty JSON
//! (the serde form of the report itself). Text renderers write to any
//! `io::Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors)

pub mod color;

use crate::domain::{DependencyEdge, ImpactReport, InitiativeId};
use crate::schedule::{
    Conflict, ConflictReport, CriticalPathReport, CycleReport, GraphView, Readiness, RiskAnalysis,
};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_id, colorize_risk, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TRELLIS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

fn emit<T, F>(value: &T, mode: OutputMode, text: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Text => {
            let mut handle = io::stdout().lock();
            text(&mut handle, &OutputConfig::from_env())
        }
    }
}

/// Print a dependency graph
pub fn print_graph(view: &GraphView, mode: OutputMode) -> io::Result<()> {
    emit(view, mode, |w, config| write_graph(w, view, config))
}

/// Print a cycle report
pub fn print_cycles(report: &CycleReport, mode: OutputMode) -> io::Result<()> {
    emit(report, mode, |w, config| write_cycles(w, report, config))
}

/// Print the readiness of one initiative
pub fn print_readiness(
    id: &InitiativeId,
    readiness: &Readiness,
    mode: OutputMode,
) -> io::Result<()> {
    emit(readiness, mode, |w, config| {
        write_readiness(w, id, readiness, config)
    })
}

/// Print a critical path report
pub fn print_critical_path(report: &CriticalPathReport, mode: OutputMode) -> io::Result<()> {
    emit(report, mode, |w, config| {
        write_critical_path(w, report, config)
    })
}

/// Print a conflict report
pub fn print_conflicts(report: &ConflictReport, mode: OutputMode) -> io::Result<()> {
    emit(report, mode, |w, config| write_conflicts(w, report, config))
}

/// Print a risk analysis
pub fn print_risk(analysis: &RiskAnalysis, mode: OutputMode) -> io::Result<()> {
    emit(analysis, mode, |w, config| write_risk(w, analysis, config))
}

/// Print a scenario impact report
pub fn print_impact(
    impact: &ImpactReport,
    saved_as: Option<&str>,
    mode: OutputMode,
) -> io::Result<()> {
    emit(impact, mode, |w, config| {
        write_impact(w, impact, config)?;
        if let Some(name) = saved_as {
            writeln!(w, "\nSaved as scenario '{name}'")?;
        }
        Ok(())
    })
}

/// Print a dependency edge
pub fn print_edge(edge: &DependencyEdge, mode: OutputMode) -> io::Result<()> {
    emit(edge, mode, |w, config| {
        writeln!(
            w,
            "{} {} -> {} [{}]{}",
            colorize_id(edge.id.as_str(), config),
            edge.from_id,
            edge.to_id,
            edge.kind,
            if edge.satisfied { " (satisfied)" } else { "" }
        )
    })
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn join_ids(ids: &[InitiativeId]) -> String {
    ids.iter()
        .map(InitiativeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub(crate) fn write_graph<W: Write>(
    w: &mut W,
    view: &GraphView,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} nodes, {} edges",
        bold("Graph:", config),
        view.nodes.len(),
        view.edges.len() - view.skipped_edges.len()
    )?;
    for entry in &view.adjacency {
        let successors: Vec<String> = entry
            .successors
            .iter()
            .map(|s| format!("{} ({})", s.id, s.kind))
            .collect();
        if successors.is_empty() {
            writeln!(w, "  {}", colorize_id(entry.id.as_str(), config))?;
        } else {
            writeln!(
                w,
                "  {} -> {}",
                colorize_id(entry.id.as_str(), config),
                successors.join(", ")
            )?;
        }
    }
    if !view.skipped_edges.is_empty() {
        let skipped: Vec<&str> = view.skipped_edges.iter().map(|e| e.as_str()).collect();
        writeln!(
            w,
            "{} {}",
            warning("Skipped edges (unknown initiative):", config),
            skipped.join(", ")
        )?;
    }
    Ok(())
}

pub(crate) fn write_cycles<W: Write>(
    w: &mut W,
    report: &CycleReport,
    config: &OutputConfig,
) -> io::Result<()> {
    if !report.has_cycles {
        return writeln!(w, "{}", success("No circular dependencies", config));
    }
    writeln!(
        w,
        "{}",
        error(
            &format!("{} circular dependency chain(s):", report.cycles.len()),
            config
        )
    )?;
    for cycle in &report.cycles {
        match cycle.first() {
            Some(first) => writeln!(w, "  {} -> {first}", join_ids(cycle))?,
            None => continue,
        }
    }
    Ok(())
}

pub(crate) fn write_readiness<W: Write>(
    w: &mut W,
    id: &InitiativeId,
    readiness: &Readiness,
    config: &OutputConfig,
) -> io::Result<()> {
    if readiness.can_start {
        return writeln!(
            w,
            "{} {}",
            colorize_id(id.as_str(), config),
            success("can start", config)
        );
    }
    writeln!(
        w,
        "{} {}",
        colorize_id(id.as_str(), config),
        error("is blocked by:", config)
    )?;
    for blocker in &readiness.blocked_by {
        writeln!(
            w,
            "  {} {} [{}]",
            colorize_id(blocker.id.as_str(), config),
            blocker.name,
            colorize_status(blocker.status, config)
        )?;
    }
    Ok(())
}

pub(crate) fn write_critical_path<W: Write>(
    w: &mut W,
    report: &CriticalPathReport,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} days ({} critical, {} non-critical)",
        bold("Total duration:", config),
        report.total_duration,
        report.critical_count,
        report.non_critical_count
    )?;

    if !report.schedule.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{}",
            dimmed("  ID                  START  FINISH  DAYS  SLACK", config)
        )?;
    }
    for entry in &report.schedule {
        let marker = if entry.is_critical {
            error("*", config)
        } else {
            " ".to_string()
        };
        let slack = if entry.slack > 0 {
            warning(&entry.slack.to_string(), config)
        } else {
            entry.slack.to_string()
        };
        writeln!(
            w,
            "{marker} {:<18}  {:>5}  {:>6}  {:>4}  {:>5}  {}",
            entry.id.as_str(),
            entry.earliest_start,
            entry.earliest_finish,
            entry.duration,
            slack,
            entry.name
        )?;
    }

    if !report.unscheduled.is_empty() {
        writeln!(
            w,
            "\n{} {}",
            warning("Unscheduled (blocking cycle):", config),
            report
                .unscheduled
                .iter()
                .map(InitiativeId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
    }
    Ok(())
}

fn write_conflict<W: Write>(
    w: &mut W,
    conflict: &Conflict,
    config: &OutputConfig,
) -> io::Result<()> {
    match conflict {
        Conflict::DependencyViolation {
            edge_id,
            from_id,
            to_id,
            gap_days,
            message,
            ..
        } => writeln!(
            w,
            "  {} {from_id} -> {to_id} ({} by {gap_days} day(s)): {message}",
            colorize_id(edge_id.as_str(), config),
            error("overlap", config)
        ),
        Conflict::CircularDependency { cycles, message } => {
            writeln!(w, "  {} {message}", error("cycle", config))?;
            for cycle in cycles {
                writeln!(w, "    {}", join_ids(cycle))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn write_conflicts<W: Write>(
    w: &mut W,
    report: &ConflictReport,
    config: &OutputConfig,
) -> io::Result<()> {
    if !report.has_conflicts {
        return writeln!(w, "{}", success("No schedule conflicts", config));
    }
    writeln!(
        w,
        "{}",
        error(&format!("{} conflict(s):", report.conflict_count), config)
    )?;
    for conflict in &report.conflicts {
        write_conflict(w, conflict, config)?;
    }
    Ok(())
}

pub(crate) fn write_risk<W: Write>(
    w: &mut W,
    analysis: &RiskAnalysis,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        bold("Overall risk:", config),
        colorize_risk(analysis.overall_risk, config)
    )?;
    writeln!(
        w,
        "{} {} days, {} initiative(s) on the critical path",
        dimmed("Duration:", config),
        analysis.total_duration,
        analysis.critical_path.len()
    )?;

    if !analysis.critical_path.is_empty() {
        let path: Vec<&str> = analysis
            .critical_path
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        writeln!(w, "{} {}", dimmed("Critical:", config), path.join(", "))?;
    }

    for risk in &analysis.risks {
        writeln!(
            w,
            "  [{}] {}",
            colorize_risk(risk.level, config),
            risk.message
        )?;
    }
    if !analysis.recommendations.is_empty() {
        writeln!(w, "\n{}", bold("Recommendations:", config))?;
        for recommendation in &analysis.recommendations {
            writeln!(w, "  - {recommendation}")?;
        }
    }
    Ok(())
}

pub(crate) fn write_impact<W: Write>(
    w: &mut W,
    impact: &ImpactReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let verdict = if impact.is_valid {
        success("valid", config)
    } else {
        error("breaks dependencies", config)
    };
    writeln!(w, "{} {verdict}", bold("Scenario:", config))?;
    writeln!(
        w,
        "{} {} day(s)",
        dimmed("Total delay:", config),
        impact.total_delay_days
    )?;

    if !impact.affected_initiative_ids.is_empty() {
        let affected: Vec<&str> = impact
            .affected_initiative_ids
            .iter()
            .map(InitiativeId::as_str)
            .collect();
        writeln!(w, "{} {}", dimmed("Affected:", config), affected.join(", "))?;
    }
    for dependency_break in &impact.dependency_breaks {
        writeln!(w, "  {} {dependency_break}", error("break", config))?;
    }
    for warn in &impact.warnings {
        writeln!(w, "  {} {warn}", warning("warning", config))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InitiativeStatus;
    use crate::schedule::{Blocker, PathEntry, RiskItem, RiskKind, RiskLevel, ScheduleEntry};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>, &OutputConfig) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer, &OutputConfig::new(false)).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_cycles_text() {
        let report = CycleReport {
            has_cycles: true,
            cycles: vec![vec!["a".into(), "b".into()]],
        };
        let text = render(|w, c| write_cycles(w, &report, c));
        assert!(text.contains("1 circular dependency chain(s)"));
        assert!(text.contains("a -> b -> a"));

        let text = render(|w, c| write_cycles(w, &CycleReport::default(), c));
        assert!(text.contains("No circular dependencies"));
    }

    #[test]
    fn test_readiness_text_lists_blockers() {
        let readiness = Readiness {
            can_start: false,
            blocked_by: vec![Blocker {
                id: "a".into(),
                name: "Design".to_string(),
                status: InitiativeStatus::InProgress,
            }],
        };
        let text = render(|w, c| write_readiness(w, &"b".into(), &readiness, c));
        assert!(text.contains("b is blocked by:"));
        assert!(text.contains("a Design [IN_PROGRESS]"));
    }

    #[test]
    fn test_critical_path_text_marks_critical_rows() {
        let report = CriticalPathReport {
            critical_path: vec![PathEntry {
                id: "b".into(),
                name: "Build".to_string(),
                duration: 4,
                earliest_start: 5,
                earliest_finish: 9,
            }],
            total_duration: 9,
            critical_count: 1,
            non_critical_count: 1,
            schedule: vec![ScheduleEntry {
                id: "b".into(),
                name: "Build".to_string(),
                duration: 4,
                earliest_start: 5,
                earliest_finish: 9,
                slack: 0,
                is_critical: true,
            }],
            unscheduled: vec!["x".into()],
        };
        let text = render(|w, c| write_critical_path(w, &report, c));
        assert!(text.contains("Total duration: 9 days (1 critical, 1 non-critical)"));
        assert!(text.lines().any(|l| l.starts_with("* b")));
        assert!(text.contains("Unscheduled (blocking cycle): x"));
    }

    #[test]
    fn test_risk_text() {
        let analysis = RiskAnalysis {
            critical_path: vec![],
            total_duration: 400,
            risks: vec![RiskItem {
                kind: RiskKind::LongSchedule,
                level: RiskLevel::High,
                message: "Project spans 400 days".to_string(),
            }],
            recommendations: vec!["Split the project".to_string()],
            overall_risk: RiskLevel::High,
        };
        let text = render(|w, c| write_risk(w, &analysis, c));
        assert!(text.contains("Overall risk: HIGH"));
        assert!(text.contains("[HIGH] Project spans 400 days"));
        assert!(text.contains("- Split the project"));
    }

    #[test]
    fn test_impact_text() {
        let impact = ImpactReport {
            affected_initiative_ids: vec!["A".into(), "B".into()],
            dependency_breaks: vec!["A → B: late".to_string()],
            total_delay_days: 5,
            is_valid: false,
            warnings: vec![],
        };
        let text = render(|w, c| write_impact(w, &impact, c));
        assert!(text.contains("Scenario: breaks dependencies"));
        assert!(text.contains("Total delay: 5 day(s)"));
        assert!(text.contains("Affected: A, B"));
        assert!(text.contains("break A → B: late"));
    }

    #[test]
    fn test_conflicts_text() {
        let report = ConflictReport {
            has_conflicts: true,
            conflict_count: 1,
            conflicts: vec![Conflict::CircularDependency {
                cycles: vec![vec!["a".into()]],
                message: "1 circular dependency chain(s) found".to_string(),
            }],
        };
        let text = render(|w, c| write_conflicts(w, &report, c));
        assert!(text.contains("1 conflict(s):"));
        assert!(text.contains("cycle 1 circular dependency chain(s) found"));
    }
}
