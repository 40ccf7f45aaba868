//! Dependency-aware scheduling engine.
//!
//! [`Scheduler`] is the entry point: it borrows a [`ScheduleStore`], reads
//! a project's initiatives and edges, builds a fresh [`Graph`], and runs one
//! of the algorithms below. Nothing is cached between calls.
//!
//! | Operation | Algorithm | Writes |
//! |---|---|---|
//! | [`Scheduler::build_graph`] | [`graph`] | - |
//! | [`Scheduler::detect_cycles`] | [`cycles`] | - |
//! | [`Scheduler::can_start`] | [`readiness`] | - |
//! | [`Scheduler::compute_critical_path`] | [`critical_path`] | critical flags |
//! | [`Scheduler::detect_conflicts`] | [`conflicts`] | - |
//! | [`Scheduler::analyze_risk`] | [`risk`] | critical flags |
//! | [`Scheduler::evaluate_scenario`] | [`scenario`] | named scenarios |
//!
//! Store failures are propagated unchanged and never retried. Reads, the
//! computation, and write-backs are not transactional: a concurrent writer
//! may leave results based on a stale snapshot.
//!
//! # Example
//!
//! ```no_run
//! use trellis::domain::{DependencyEdge, DependencyKind, Initiative, ProjectId};
//! use trellis::schedule::Scheduler;
//! use trellis::store::{in_memory::InMemoryStore, ScheduleStore, Snapshot};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryStore::new();
//!     store
//!         .import(Snapshot {
//!             initiatives: vec![
//!                 Initiative::new("a", "core", "Design", None, None),
//!                 Initiative::new("b", "core", "Build", None, None),
//!             ],
//!             edges: vec![DependencyEdge::new("e1", "a", "b", DependencyKind::Blocking)],
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let scheduler = Scheduler::new(&store);
//!     let report = scheduler.detect_cycles(&ProjectId::new("core")).await?;
//!     assert!(!report.has_cycles);
//!     Ok(())
//! }
//! ```

pub mod conflicts;
pub mod critical_path;
pub mod cycles;
pub mod graph;
pub mod readiness;
pub mod risk;
pub mod scenario;

pub use conflicts::{Conflict, ConflictReport};
pub use critical_path::{CriticalPathReport, PathEntry, ScheduleEntry};
pub use cycles::CycleReport;
pub use graph::{Graph, GraphView};
pub use readiness::{Blocker, Readiness};
pub use risk::{RiskAnalysis, RiskItem, RiskKind, RiskLevel};

use crate::config::EngineConfig;
use crate::domain::{
    ImpactReport, Initiative, InitiativeId, ProjectId, Scenario, ScenarioChange, ScenarioId,
    ScenarioPersistence,
};
use crate::error::{Error, Result, StoreError};
use crate::id_generation::{IdGenerator, SCENARIO_PREFIX};
use crate::store::ScheduleStore;
use std::collections::HashMap;

/// Scheduling operations over an injected store.
pub struct Scheduler<'a> {
    store: &'a dyn ScheduleStore,
    config: EngineConfig,
}

impl std::fmt::Debug for Scheduler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("store", &"<dyn ScheduleStore>")
            .finish()
    }
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler with default engine settings.
    pub fn new(store: &'a dyn ScheduleStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create a scheduler with explicit engine settings.
    pub fn with_config(store: &'a dyn ScheduleStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Engine settings in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn load(&self, project: &ProjectId) -> Result<(Vec<Initiative>, Graph)> {
        let initiatives = self.store.list_initiatives(project).await?;
        let edges = self.store.list_dependency_edges(project).await?;
        let graph = Graph::from_records(&initiatives, edges);
        tracing::debug!(
            project = %project,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = graph.skipped_edges().len(),
            "Built dependency graph"
        );
        Ok((initiatives, graph))
    }

    /// Build the dependency graph of a project.
    ///
    /// An unknown or empty project yields an empty graph.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn build_graph(&self, project: &ProjectId) -> Result<Graph> {
        let (_, graph) = self.load(project).await?;
        Ok(graph)
    }

    /// Find circular dependency chains over every edge kind.
    ///
    /// # Errors
    ///
    /// Propagates store failures. Cycles are data, not errors.
    pub async fn detect_cycles(&self, project: &ProjectId) -> Result<CycleReport> {
        let graph = self.build_graph(project).await?;
        let report = cycles::find_cycles(&graph);
        if report.has_cycles {
            tracing::warn!(
                project = %project,
                cycles = report.cycles.len(),
                "Circular dependencies found"
            );
        }
        Ok(report)
    }

    /// Whether every BLOCKING predecessor of an initiative is completed or cancelled.
    ///
    /// # Errors
    ///
    /// - `Error::InitiativeNotFound` if the initiative doesn't exist
    /// - Propagates store failures
    pub async fn can_start(&self, id: &InitiativeId) -> Result<Readiness> {
        if self.store.get_initiative(id).await?.is_none() {
            return Err(Error::InitiativeNotFound(id.clone()));
        }

        let edges = self.store.list_edges_into(id).await?;
        let mut predecessors = HashMap::new();
        for edge in edges.iter().filter(|e| e.kind.is_blocking()) {
            if predecessors.contains_key(&edge.from_id) {
                continue;
            }
            if let Some(pred) = self.store.get_initiative(&edge.from_id).await? {
                predecessors.insert(edge.from_id.clone(), pred);
            }
        }

        let readiness = readiness::evaluate(&edges, &predecessors);
        tracing::debug!(
            initiative = %id,
            can_start = readiness.can_start,
            blockers = readiness.blocked_by.len(),
            "Evaluated readiness"
        );
        Ok(readiness)
    }

    /// Compute the critical path and write the critical marker back.
    ///
    /// Every initiative of the project gets its marker written, then the
    /// store is saved.
    ///
    /// # Errors
    ///
    /// Propagates store failures, including those of the write-back.
    pub async fn compute_critical_path(&self, project: &ProjectId) -> Result<CriticalPathReport> {
        let report = self.plan_critical_path(project).await?;

        for (id, is_critical) in report.critical_flags() {
            self.store
                .update_initiative_critical_flag(id, is_critical)
                .await?;
        }
        self.store.save().await?;

        Ok(report)
    }

    /// Compute the critical path without writing anything.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn plan_critical_path(&self, project: &ProjectId) -> Result<CriticalPathReport> {
        let (initiatives, graph) = self.load(project).await?;
        let report = critical_path::compute(&graph, &initiatives, self.config.slack_baseline);

        if !report.unscheduled.is_empty() {
            tracing::warn!(
                project = %project,
                unscheduled = report.unscheduled.len(),
                "Initiatives on or behind a blocking cycle were left unscheduled"
            );
        }
        tracing::debug!(
            project = %project,
            total_duration = report.total_duration,
            critical = report.critical_count,
            "Computed critical path"
        );
        Ok(report)
    }

    /// Find dependency violations and cycles.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn detect_conflicts(&self, project: &ProjectId) -> Result<ConflictReport> {
        let (initiatives, graph) = self.load(project).await?;
        let cycle_report = cycles::find_cycles(&graph);
        let report = conflicts::detect(&graph, &initiatives, &cycle_report);
        tracing::debug!(
            project = %project,
            conflicts = report.conflict_count,
            "Detected conflicts"
        );
        Ok(report)
    }

    /// Critical path plus conflicts, rolled into a risk level.
    ///
    /// Writes the critical markers like [`Scheduler::compute_critical_path`].
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn analyze_risk(&self, project: &ProjectId) -> Result<RiskAnalysis> {
        let critical = self.compute_critical_path(project).await?;
        let conflict_report = self.detect_conflicts(project).await?;
        let analysis = risk::assess(critical, &conflict_report, &self.config);
        tracing::debug!(project = %project, overall = %analysis.overall_risk, "Analyzed risk");
        Ok(analysis)
    }

    /// Evaluate proposed date changes, optionally storing them as a named scenario.
    ///
    /// The initiatives themselves are never modified.
    ///
    /// # Errors
    ///
    /// Propagates store failures. Invalid scenarios are reported through
    /// `ImpactReport::is_valid` and `warnings`.
    pub async fn evaluate_scenario(
        &self,
        project: &ProjectId,
        changes: &[ScenarioChange],
        persistence: ScenarioPersistence,
    ) -> Result<ImpactReport> {
        let (initiatives, graph) = self.load(project).await?;
        let impact = scenario::evaluate(&graph, &initiatives, changes);

        for warning in &impact.warnings {
            tracing::warn!(project = %project, "{warning}");
        }
        tracing::debug!(
            project = %project,
            changes = changes.len(),
            breaks = impact.dependency_breaks.len(),
            total_delay_days = impact.total_delay_days,
            "Evaluated scenario"
        );

        if let ScenarioPersistence::Named(name) = persistence {
            let id = self.next_scenario_id(project, &name).await?;
            self.store
                .save_scenario(Scenario {
                    id: id.clone(),
                    project_id: project.clone(),
                    name,
                    changes: changes.to_vec(),
                    impact: impact.clone(),
                    created_at: chrono::Utc::now(),
                })
                .await?;
            self.store.save().await?;
            tracing::debug!(scenario = %id, "Stored scenario");
        }

        Ok(impact)
    }

    async fn next_scenario_id(&self, project: &ProjectId, name: &str) -> Result<ScenarioId> {
        let mut ids = IdGenerator::new(SCENARIO_PREFIX);
        for existing in self.store.list_scenarios(project).await? {
            ids.register_id(existing.id.as_str());
        }
        let id = ids
            .generate(&[project.as_str(), name])
            .map_err(|e| StoreError::IdGeneration(e.to_string()))?;
        Ok(ScenarioId::new(id))
    }
}
