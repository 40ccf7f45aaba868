//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::path::Path;
use std::process::{Command, Output};
use trellis::domain::{DependencyEdge, DependencyKind, Initiative};
use trellis::store::in_memory::InMemoryStore;
use trellis::store::{ScheduleStore, Snapshot};

/// Project every fixture initiative belongs to
pub const PROJECT: &str = "core";

/// Day `n` of the test calendar (2026-01-01 is day 0).
pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(n)
}

/// Initiative in [`PROJECT`] running from day `start` to day `end`, named after its id.
pub fn initiative(id: &str, start: i64, end: i64) -> Initiative {
    Initiative::new(id, PROJECT, id, Some(day(start)), Some(day(end)))
}

/// BLOCKING edge `from -> to` with id `from-to`.
pub fn blocking(from: &str, to: &str) -> DependencyEdge {
    DependencyEdge::new(format!("{from}-{to}"), from, to, DependencyKind::Blocking)
}

/// SOFT edge `from -> to` with id `from~to`.
pub fn soft(from: &str, to: &str) -> DependencyEdge {
    DependencyEdge::new(format!("{from}~{to}"), from, to, DependencyKind::Soft)
}

/// An in-memory store holding the given records.
pub async fn seeded(initiatives: Vec<Initiative>, edges: Vec<DependencyEdge>) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .import(Snapshot {
            initiatives,
            edges,
            ..Default::default()
        })
        .await
        .unwrap();
    store
}

/// Run the trellis binary in the specified directory
pub fn run_trellis_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute trellis binary")
}

/// Run the binary and parse its stdout as JSON, asserting success.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = run_trellis_in_dir(dir, args);
    assert!(
        output.status.success(),
        "trellis {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout of trellis {args:?} is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}
