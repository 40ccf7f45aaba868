//! Store abstraction for trellis.
//!
//! The scheduling engine never owns persistent state. Everything it reads
//! (initiatives, dependency edges) and the little it writes back (the
//! critical-path marker, named scenarios) goes through [`ScheduleStore`].
//! Two backends ship with the crate:
//!
//! - **In-memory**: ephemeral, backed by `HashMap`s behind an `Arc<Mutex<_>>`
//! - **JSONL**: the in-memory backend plus a JSON Lines file it loads from
//!   and atomically saves to
//!
//! # Test Utilities
//!
//! With the `test-util` feature (or under `cfg(test)`), [`UnavailableStore`]
//! is a backend whose every call fails with `StoreError::Unavailable`. Use it
//! to verify that store failures reach the caller untouched.
//!
//! # Example
//!
//! ```no_run
//! use trellis::domain::{DependencyKind, Initiative, NewDependencyEdge, ProjectId};
//! use trellis::store::{create_store, Snapshot, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = create_store(StorageBackend::InMemory).await?;
//!
//!     store
//!         .import(Snapshot {
//!             initiatives: vec![
//!                 Initiative::new("design", "core", "Design", None, None),
//!                 Initiative::new("build", "core", "Build", None, None),
//!             ],
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let edge = store
//!         .create_dependency_edge(NewDependencyEdge {
//!             from_id: "design".into(),
//!             to_id: "build".into(),
//!             kind: DependencyKind::Blocking,
//!         })
//!         .await?;
//!     println!("Created edge {}", edge.id);
//!
//!     let edges = store.list_dependency_edges(&ProjectId::new("core")).await?;
//!     assert_eq!(edges.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::domain::{
    DependencyEdge, EdgeId, Initiative, InitiativeId, NewDependencyEdge, ProjectId, Scenario,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod in_memory;

use in_memory::InMemoryStore;

/// Everything a store holds, used for bulk import and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Initiatives in insertion order
    pub initiatives: Vec<Initiative>,

    /// Dependency edges in insertion order
    pub edges: Vec<DependencyEdge>,

    /// Stored scenarios
    pub scenarios: Vec<Scenario>,
}

/// The external persistence collaborator consumed by the scheduling core.
///
/// All methods take `&self`: implementations use interior mutability so a
/// single store can be shared by every engine component of an invocation.
///
/// # Method Categories
///
/// - **Reads**: `list_initiatives`, `get_initiative`, `list_dependency_edges`, `list_edges_into`, `list_scenarios`
/// - **Engine write-back**: `update_initiative_critical_flag`, `save_scenario`
/// - **Application mutations**: `create_dependency_edge`, `delete_dependency_edge`, `mark_edge_satisfied`
/// - **Batch**: `import`, `export_all`
/// - **Persistence**: `save`, `reload`
///
/// # Error Handling
///
/// A backend that cannot be reached returns `StoreError::Unavailable`. The
/// engine propagates it as-is and never retries.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    // ========== Reads ==========

    /// List the initiatives of a project in insertion order.
    ///
    /// An unknown project yields an empty list.
    async fn list_initiatives(&self, project: &ProjectId) -> Result<Vec<Initiative>>;

    /// Get an initiative by id. Returns `None` if it doesn't exist.
    async fn get_initiative(&self, id: &InitiativeId) -> Result<Option<Initiative>>;

    /// List edges whose predecessor belongs to the project.
    ///
    /// Edges whose successor is unknown are still returned.
    async fn list_dependency_edges(&self, project: &ProjectId) -> Result<Vec<DependencyEdge>>;

    /// List edges whose successor is the given initiative.
    async fn list_edges_into(&self, id: &InitiativeId) -> Result<Vec<DependencyEdge>>;

    /// List the stored scenarios of a project.
    async fn list_scenarios(&self, project: &ProjectId) -> Result<Vec<Scenario>>;

    // ========== Engine write-back ==========

    /// Write the derived "is on critical path" marker.
    ///
    /// # Errors
    ///
    /// - `Error::InitiativeNotFound` if the initiative doesn't exist
    async fn update_initiative_critical_flag(
        &self,
        id: &InitiativeId,
        is_critical: bool,
    ) -> Result<()>;

    /// Store a named scenario, replacing one with the same id.
    async fn save_scenario(&self, scenario: Scenario) -> Result<()>;

    // ========== Application mutations ==========

    /// Create a dependency edge with a generated id.
    ///
    /// Self-edges are accepted: they are degenerate cycles for the cycle
    /// detector to report.
    ///
    /// # Errors
    ///
    /// - `Error::InitiativeNotFound` if either endpoint doesn't exist
    /// - `Error::InvalidDependency` if the endpoints belong to different
    ///   projects or the same edge already exists
    async fn create_dependency_edge(&self, edge: NewDependencyEdge) -> Result<DependencyEdge>;

    /// Delete a dependency edge.
    ///
    /// # Errors
    ///
    /// - `Error::EdgeNotFound` if the edge doesn't exist
    async fn delete_dependency_edge(&self, id: &EdgeId) -> Result<()>;

    /// Set or clear an edge's satisfied flag, returning the updated edge.
    ///
    /// # Errors
    ///
    /// - `Error::EdgeNotFound` if the edge doesn't exist
    async fn mark_edge_satisfied(&self, id: &EdgeId, satisfied: bool) -> Result<DependencyEdge>;

    // ========== Batch Operations ==========

    /// Import records. Existing records with the same id are replaced in place.
    async fn import(&self, snapshot: Snapshot) -> Result<()>;

    /// Export every record, suitable for JSONL export or backup.
    async fn export_all(&self) -> Result<Snapshot>;

    // ========== Persistence ==========

    /// Save changes to persistent storage. No-op for the in-memory backend.
    async fn save(&self) -> Result<()>;

    /// Discard in-memory changes and re-read persistent state.
    ///
    /// No-op for the in-memory backend.
    async fn reload(&self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// In-memory store whose `save()` and `reload()` go to a JSONL file.
struct JsonlBackedStore {
    inner: InMemoryStore,
    path: PathBuf,
}

#[async_trait]
impl ScheduleStore for JsonlBackedStore {
    async fn list_initiatives(&self, project: &ProjectId) -> Result<Vec<Initiative>> {
        self.inner.list_initiatives(project).await
    }

    async fn get_initiative(&self, id: &InitiativeId) -> Result<Option<Initiative>> {
        self.inner.get_initiative(id).await
    }

    async fn list_dependency_edges(&self, project: &ProjectId) -> Result<Vec<DependencyEdge>> {
        self.inner.list_dependency_edges(project).await
    }

    async fn list_edges_into(&self, id: &InitiativeId) -> Result<Vec<DependencyEdge>> {
        self.inner.list_edges_into(id).await
    }

    async fn list_scenarios(&self, project: &ProjectId) -> Result<Vec<Scenario>> {
        self.inner.list_scenarios(project).await
    }

    async fn update_initiative_critical_flag(
        &self,
        id: &InitiativeId,
        is_critical: bool,
    ) -> Result<()> {
        self.inner
            .update_initiative_critical_flag(id, is_critical)
            .await
    }

    async fn save_scenario(&self, scenario: Scenario) -> Result<()> {
        self.inner.save_scenario(scenario).await
    }

    async fn create_dependency_edge(&self, edge: NewDependencyEdge) -> Result<DependencyEdge> {
        self.inner.create_dependency_edge(edge).await
    }

    async fn delete_dependency_edge(&self, id: &EdgeId) -> Result<()> {
        self.inner.delete_dependency_edge(id).await
    }

    async fn mark_edge_satisfied(&self, id: &EdgeId, satisfied: bool) -> Result<DependencyEdge> {
        self.inner.mark_edge_satisfied(id, satisfied).await
    }

    async fn import(&self, snapshot: Snapshot) -> Result<()> {
        self.inner.import(snapshot).await
    }

    async fn export_all(&self) -> Result<Snapshot> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&self) -> Result<()> {
        let snapshot = if self.path.exists() {
            let (snapshot, warnings) = in_memory::read_jsonl_snapshot(&self.path).await?;
            for warning in &warnings {
                tracing::warn!(warning = ?warning, "JSONL reload warning");
            }
            snapshot
        } else {
            Snapshot::default()
        };
        self.inner.replace_all(snapshot).await
    }
}

/// Create a store for the given backend.
///
/// # Errors
///
/// - `Error::Io` if the JSONL file exists but cannot be read
pub async fn create_store(backend: StorageBackend) -> Result<Box<dyn ScheduleStore>> {
    match backend {
        StorageBackend::InMemory => Ok(Box::new(InMemoryStore::new())),
        StorageBackend::Jsonl(path) => {
            let inner = if path.exists() {
                let (store, warnings) = in_memory::load_from_jsonl(&path).await?;
                for warning in &warnings {
                    // Storage is still usable, the offending lines are skipped
                    tracing::warn!(warning = ?warning, "JSONL load warning");
                }
                store
            } else {
                InMemoryStore::new()
            };
            Ok(Box::new(JsonlBackedStore { inner, path }))
        }
    }
}

// ========== Test Utilities ==========

/// A store whose every operation fails with `StoreError::Unavailable`.
///
/// Available under `cfg(test)` or with the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct UnavailableStore;

#[cfg(any(test, feature = "test-util"))]
impl UnavailableStore {
    /// Create a new failing store.
    pub fn new() -> Self {
        Self
    }

    fn fail<T>() -> Result<T> {
        Err(crate::error::StoreError::Unavailable("store is offline".to_string()).into())
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl ScheduleStore for UnavailableStore {
    async fn list_initiatives(&self, _project: &ProjectId) -> Result<Vec<Initiative>> {
        Self::fail()
    }

    async fn get_initiative(&self, _id: &InitiativeId) -> Result<Option<Initiative>> {
        Self::fail()
    }

    async fn list_dependency_edges(&self, _project: &ProjectId) -> Result<Vec<DependencyEdge>> {
        Self::fail()
    }

    async fn list_edges_into(&self, _id: &InitiativeId) -> Result<Vec<DependencyEdge>> {
        Self::fail()
    }

    async fn list_scenarios(&self, _project: &ProjectId) -> Result<Vec<Scenario>> {
        Self::fail()
    }

    async fn update_initiative_critical_flag(
        &self,
        _id: &InitiativeId,
        _is_critical: bool,
    ) -> Result<()> {
        Self::fail()
    }

    async fn save_scenario(&self, _scenario: Scenario) -> Result<()> {
        Self::fail()
    }

    async fn create_dependency_edge(&self, _edge: NewDependencyEdge) -> Result<DependencyEdge> {
        Self::fail()
    }

    async fn delete_dependency_edge(&self, _id: &EdgeId) -> Result<()> {
        Self::fail()
    }

    async fn mark_edge_satisfied(&self, _id: &EdgeId, _satisfied: bool) -> Result<DependencyEdge> {
        Self::fail()
    }

    async fn import(&self, _snapshot: Snapshot) -> Result<()> {
        Self::fail()
    }

    async fn export_all(&self) -> Result<Snapshot> {
        Self::fail()
    }

    async fn save(&self) -> Result<()> {
        Self::fail()
    }

    async fn reload(&self) -> Result<()> {
        Self::fail()
    }
}
