//! Integration tests for the trellis CLI.
//!
//! These tests run the compiled binary against temporary repositories.

use rstest::{fixture, rstest};
use std::io::Write;
use tempfile::TempDir;
use trellis::store::in_memory::Record;

mod common;
use common::{PROJECT, blocking, initiative, run_json, run_trellis_in_dir, soft};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides an initialized repository with a small imported plan:
/// `design(0-5) -> build(3-9) -> launch(9-10)` plus a soft `docs` link.
#[fixture]
fn planned_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_trellis_in_dir(temp.path(), &["init", "--project", PROJECT, "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize trellis: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let plan = temp.path().join("plan.jsonl");
    let mut file = std::fs::File::create(&plan).unwrap();
    for record in [
        Record::Initiative(initiative("design", 0, 5)),
        Record::Initiative(initiative("build", 3, 9)),
        Record::Initiative(initiative("launch", 9, 10)),
        Record::Initiative(initiative("docs", 0, 2)),
        Record::Edge(blocking("design", "build")),
        Record::Edge(blocking("build", "launch")),
        Record::Edge(soft("docs", "launch")),
    ] {
        writeln!(file, "{}", serde_json::to_string(&record).unwrap()).unwrap();
    }
    drop(file);

    let output = run_trellis_in_dir(temp.path(), &["import", "plan.jsonl"]);
    assert!(
        output.status.success(),
        "Failed to import plan: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    temp
}

// ============================================================================
// Help and Init
// ============================================================================

#[rstest]
fn test_cli_help(temp_dir: TempDir) {
    let output = run_trellis_in_dir(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("trellis"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("critical-path"));
}

#[rstest]
fn test_init_creates_repository(temp_dir: TempDir) {
    let output = run_trellis_in_dir(temp_dir.path(), &["init", "--project", "core"]);

    assert!(output.status.success());
    assert!(temp_dir.path().join(".trellis/config.yaml").exists());
    assert!(temp_dir.path().join(".trellis/schedule.jsonl").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Default project: core"));
}

#[rstest]
fn test_command_outside_repository_fails(temp_dir: TempDir) {
    let output = run_trellis_in_dir(temp_dir.path(), &["cycles"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not a trellis repository"));
}

// ============================================================================
// Engine Commands
// ============================================================================

#[rstest]
fn test_graph_json(planned_dir: TempDir) {
    let graph = run_json(planned_dir.path(), &["graph", "--json"]);

    assert_eq!(graph["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 3);
    assert!(graph["skipped_edges"].as_array().unwrap().is_empty());
}

#[rstest]
fn test_cycles_json(planned_dir: TempDir) {
    let report = run_json(planned_dir.path(), &["cycles", "--json"]);
    assert_eq!(report["has_cycles"], false);
}

#[rstest]
fn test_ready_reports_blocker(planned_dir: TempDir) {
    let readiness = run_json(planned_dir.path(), &["ready", "build", "--json"]);

    assert_eq!(readiness["can_start"], false);
    assert_eq!(readiness["blocked_by"][0]["id"], "design");
    assert_eq!(readiness["blocked_by"][0]["status"], "PLANNED");
}

#[rstest]
fn test_critical_path_writes_flags_unless_no_write(planned_dir: TempDir) {
    let data = planned_dir.path().join(".trellis/schedule.jsonl");

    let report = run_json(
        planned_dir.path(),
        &["critical-path", "--no-write", "--baseline", "backward-pass", "--json"],
    );
    assert_eq!(report["total_duration"], 12);
    let path: Vec<&str> = report["critical_path"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(path, vec!["design", "build", "launch"]);
    let contents = std::fs::read_to_string(&data).unwrap();
    assert!(!contents.contains("is_critical_path\":true"));

    run_json(planned_dir.path(), &["critical-path", "--json"]);
    let contents = std::fs::read_to_string(&data).unwrap();
    assert!(contents.contains("is_critical_path\":true"));
}

#[rstest]
fn test_conflicts_and_risk(planned_dir: TempDir) {
    let conflicts = run_json(planned_dir.path(), &["conflicts", "--json"]);
    assert_eq!(conflicts["conflict_count"], 1);
    assert_eq!(conflicts["conflicts"][0]["type"], "DEPENDENCY_VIOLATION");
    assert_eq!(conflicts["conflicts"][0]["gap_days"], 2);

    let risk = run_json(planned_dir.path(), &["risk", "--json"]);
    assert_eq!(risk["overall_risk"], "HIGH");
}

#[rstest]
fn test_scenario_text_and_save(planned_dir: TempDir) {
    let output = run_trellis_in_dir(
        planned_dir.path(),
        &["scenario", "--change", "build:end=2026-01-13", "--save", "slip"],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("breaks dependencies"));
    assert!(stdout.contains("Total delay: 3 day(s)"));
    assert!(stdout.contains("build → launch"));
    assert!(stdout.contains("Saved as scenario 'slip'"));

    let data = std::fs::read_to_string(planned_dir.path().join(".trellis/schedule.jsonl")).unwrap();
    assert!(data.contains("\"record\":\"scenario\""));
}

#[rstest]
fn test_scenario_rejects_malformed_change(planned_dir: TempDir) {
    let output = run_trellis_in_dir(planned_dir.path(), &["scenario", "--change", "build=2026"]);
    assert!(!output.status.success());
}

// ============================================================================
// Dependency Management
// ============================================================================

#[rstest]
fn test_dep_add_creates_cycle_then_remove(planned_dir: TempDir) {
    let edge = run_json(
        planned_dir.path(),
        &["dep", "add", "launch", "design", "--json"],
    );
    let edge_id = edge["id"].as_str().unwrap().to_string();
    assert!(edge_id.starts_with("dep-"));
    assert_eq!(edge["kind"], "BLOCKING");

    let cycles = run_json(planned_dir.path(), &["cycles", "--json"]);
    assert_eq!(cycles["has_cycles"], true);

    let output = run_trellis_in_dir(planned_dir.path(), &["dep", "remove", &edge_id]);
    assert!(output.status.success());

    let cycles = run_json(planned_dir.path(), &["cycles", "--json"]);
    assert_eq!(cycles["has_cycles"], false);
}

#[rstest]
fn test_dep_satisfy(planned_dir: TempDir) {
    let edge = run_json(
        planned_dir.path(),
        &["dep", "satisfy", "design-build", "--json"],
    );
    assert_eq!(edge["satisfied"], true);

    let edge = run_json(
        planned_dir.path(),
        &["dep", "satisfy", "design-build", "--unset", "--json"],
    );
    assert_eq!(edge["satisfied"], false);
}

#[rstest]
fn test_dep_add_unknown_initiative_fails(planned_dir: TempDir) {
    let output = run_trellis_in_dir(planned_dir.path(), &["dep", "add", "design", "ghost"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost"));
}
