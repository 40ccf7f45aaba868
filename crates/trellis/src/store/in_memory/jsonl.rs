//! JSONL persistence for the in-memory store.
//!
//! Each line holds one record tagged by `"record"`:
//!
//! ```text
//! {"record":"initiative","id":"design","project_id":"core","name":"Design",...}
//! {"record":"edge","id":"dep-k3f9","from_id":"design","to_id":"build","kind":"BLOCKING","satisfied":false}
//! {"record":"scenario","id":"scn-0a1b","project_id":"core","name":"slip",...}
//! ```

use super::InMemoryStore;
use crate::domain::{DependencyEdge, EdgeId, Initiative, InitiativeId, Scenario, ScenarioId};
use crate::error::{Error, Result, StoreError};
use crate::store::{ScheduleStore, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// One line of a JSONL data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    /// An initiative
    Initiative(Initiative),
    /// A dependency edge
    Edge(DependencyEdge),
    /// A stored scenario
    Scenario(Scenario),
}

/// Non-fatal problems found while loading a JSONL file.
///
/// Loading continues past all of these; the affected line is skipped unless
/// stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line is not a valid record.
    MalformedJson {
        /// 1-based file line
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A record reuses an id seen earlier in the file. The later record wins.
    DuplicateRecord {
        /// 1-based file line
        line_number: usize,
        /// The repeated id
        id: String,
    },

    /// An edge endpoint is not an initiative in the file.
    ///
    /// **Effect**: the edge is still loaded; the graph builder skips it.
    OrphanedDependency {
        /// Edge id
        edge: EdgeId,
        /// The unknown endpoint
        missing: InitiativeId,
    },
}

/// Read a JSONL file into a snapshot plus warnings.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub async fn read_jsonl_snapshot(path: &Path) -> Result<(Snapshot, Vec<LoadWarning>)> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut snapshot = Snapshot::default();
    let mut warnings = Vec::new();
    let mut initiative_ids: HashSet<InitiativeId> = HashSet::new();
    let mut edge_ids: HashSet<EdgeId> = HashSet::new();
    let mut scenario_ids: HashSet<ScenarioId> = HashSet::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let fresh = match &record {
            Record::Initiative(i) => initiative_ids.insert(i.id.clone()),
            Record::Edge(e) => edge_ids.insert(e.id.clone()),
            Record::Scenario(s) => scenario_ids.insert(s.id.clone()),
        };
        if !fresh {
            let id = match &record {
                Record::Initiative(i) => i.id.to_string(),
                Record::Edge(e) => e.id.to_string(),
                Record::Scenario(s) => s.id.to_string(),
            };
            warnings.push(LoadWarning::DuplicateRecord { line_number, id });
        }

        match record {
            Record::Initiative(i) => upsert_by(&mut snapshot.initiatives, i, |x| &x.id),
            Record::Edge(e) => upsert_by(&mut snapshot.edges, e, |x| &x.id),
            Record::Scenario(s) => upsert_by(&mut snapshot.scenarios, s, |x| &x.id),
        }
    }

    for edge in &snapshot.edges {
        for endpoint in [&edge.from_id, &edge.to_id] {
            if !initiative_ids.contains(endpoint) {
                warnings.push(LoadWarning::OrphanedDependency {
                    edge: edge.id.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    Ok((snapshot, warnings))
}

fn upsert_by<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &K) {
    match items.iter().position(|x| key(x) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

/// Load a store from a JSONL file.
///
/// Returns the store and every warning encountered. Warnings never abort
/// the load.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let (snapshot, warnings) = read_jsonl_snapshot(path).await?;
    let store = InMemoryStore::new();
    store.import(snapshot).await?;
    Ok((store, warnings))
}

/// Save a store to a JSONL file with an atomic write.
///
/// Writes to a `.tmp` sibling first, then renames it over the target, so a
/// crash mid-write leaves the previous file intact.
///
/// # Errors
///
/// Returns `Error::Io` on write failure and `StoreError::Serialization` if a
/// record cannot be encoded.
pub async fn save_to_jsonl(store: &dyn ScheduleStore, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path).await.map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);

    let snapshot = store.export_all().await?;
    let records = snapshot
        .initiatives
        .into_iter()
        .map(Record::Initiative)
        .chain(snapshot.edges.into_iter().map(Record::Edge))
        .chain(snapshot.scenarios.into_iter().map(Record::Scenario));

    for record in records {
        let json = serde_json::to_string(&record).map_err(StoreError::Serialization)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;

    tracing::debug!(path = %path.display(), "Saved schedule data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyKind, ProjectId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load_preserves_records_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.jsonl");

        let store = InMemoryStore::new();
        store
            .import(Snapshot {
                initiatives: vec![
                    Initiative::new("b", "core", "Beta", None, None),
                    Initiative::new("a", "core", "Alpha", None, None),
                ],
                edges: vec![DependencyEdge::new("dep-1", "b", "a", DependencyKind::Soft)],
                ..Default::default()
            })
            .await
            .unwrap();
        save_to_jsonl(&store, &path).await.unwrap();

        let (loaded, warnings) = load_from_jsonl(&path).await.unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        let names: Vec<_> = loaded
            .list_initiatives(&ProjectId::new("core"))
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_resilient_loading_reports_warnings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.jsonl");
        let content = [
            r#"{"record":"initiative","id":"a","project_id":"core","name":"A","status":"PLANNED"}"#,
            "not json at all",
            "",
            r#"{"record":"initiative","id":"a","project_id":"core","name":"A again","status":"COMPLETED"}"#,
            r#"{"record":"edge","id":"dep-1","from_id":"a","to_id":"ghost","kind":"BLOCKING"}"#,
        ]
        .join("\n");
        tokio::fs::write(&path, content).await.unwrap();

        let (snapshot, warnings) = read_jsonl_snapshot(&path).await.unwrap();

        assert_eq!(snapshot.initiatives.len(), 1);
        assert_eq!(snapshot.initiatives[0].name, "A again");
        assert_eq!(snapshot.edges.len(), 1);

        assert_eq!(warnings.len(), 3);
        assert!(matches!(
            warnings[0],
            LoadWarning::MalformedJson { line_number: 2, .. }
        ));
        assert!(matches!(
            warnings[1],
            LoadWarning::DuplicateRecord { line_number: 4, .. }
        ));
        assert!(matches!(
            &warnings[2],
            LoadWarning::OrphanedDependency { missing, .. } if missing.as_str() == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_from_jsonl(&dir.path().join("absent.jsonl")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
