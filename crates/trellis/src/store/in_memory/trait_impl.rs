//! `ScheduleStore` implementation for the in-memory store.

use super::InMemoryStore;
use crate::domain::{
    DependencyEdge, EdgeId, Initiative, InitiativeId, NewDependencyEdge, ProjectId, Scenario,
};
use crate::error::{Error, Result, StoreError};
use crate::store::{ScheduleStore, Snapshot};
use async_trait::async_trait;

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn list_initiatives(&self, project: &ProjectId) -> Result<Vec<Initiative>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .ordered_initiatives()
            .filter(|i| &i.project_id == project)
            .cloned()
            .collect())
    }

    async fn get_initiative(&self, id: &InitiativeId) -> Result<Option<Initiative>> {
        let inner = self.inner.lock().await;
        Ok(inner.initiatives.get(id).cloned())
    }

    async fn list_dependency_edges(&self, project: &ProjectId) -> Result<Vec<DependencyEdge>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .edges
            .iter()
            .filter(|edge| inner.project_of(&edge.from_id) == Some(project))
            .cloned()
            .collect())
    }

    async fn list_edges_into(&self, id: &InitiativeId) -> Result<Vec<DependencyEdge>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .edges
            .iter()
            .filter(|edge| &edge.to_id == id)
            .cloned()
            .collect())
    }

    async fn list_scenarios(&self, project: &ProjectId) -> Result<Vec<Scenario>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .scenarios
            .iter()
            .filter(|s| &s.project_id == project)
            .cloned()
            .collect())
    }

    async fn update_initiative_critical_flag(
        &self,
        id: &InitiativeId,
        is_critical: bool,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let initiative = inner
            .initiatives
            .get_mut(id)
            .ok_or_else(|| Error::InitiativeNotFound(id.clone()))?;
        initiative.is_critical_path = Some(is_critical);
        Ok(())
    }

    async fn save_scenario(&self, scenario: Scenario) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.upsert_scenario(scenario);
        Ok(())
    }

    async fn create_dependency_edge(&self, edge: NewDependencyEdge) -> Result<DependencyEdge> {
        let mut inner = self.inner.lock().await;

        // === Phase 1: validation (no mutations) ===
        let from_project = inner
            .project_of(&edge.from_id)
            .ok_or_else(|| Error::InitiativeNotFound(edge.from_id.clone()))?;
        let to_project = inner
            .project_of(&edge.to_id)
            .ok_or_else(|| Error::InitiativeNotFound(edge.to_id.clone()))?;

        if from_project != to_project {
            return Err(Error::InvalidDependency {
                from: edge.from_id,
                to: edge.to_id,
                reason: format!(
                    "initiatives belong to different projects ({from_project} and {to_project})"
                ),
            });
        }

        let duplicate = inner
            .edges
            .iter()
            .any(|e| e.from_id == edge.from_id && e.to_id == edge.to_id && e.kind == edge.kind);
        if duplicate {
            return Err(Error::InvalidDependency {
                from: edge.from_id,
                to: edge.to_id,
                reason: "dependency already exists".to_string(),
            });
        }

        if edge.from_id == edge.to_id {
            tracing::warn!(
                initiative = %edge.from_id,
                "Creating self-dependency; it will be reported as a cycle"
            );
        }

        // === Phase 2: id generation and insert ===
        let kind = edge.kind.to_string();
        let id = inner
            .edge_ids
            .generate(&[edge.from_id.as_str(), edge.to_id.as_str(), &kind])
            .map_err(|e| StoreError::IdGeneration(e.to_string()))?;

        let created = DependencyEdge::new(id, edge.from_id, edge.to_id, edge.kind);
        inner.edges.push(created.clone());

        tracing::debug!(
            edge = %created.id,
            from = %created.from_id,
            to = %created.to_id,
            "Created dependency edge"
        );
        Ok(created)
    }

    async fn delete_dependency_edge(&self, id: &EdgeId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .edges
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| Error::EdgeNotFound(id.clone()))?;
        inner.edges.remove(position);
        Ok(())
    }

    async fn mark_edge_satisfied(&self, id: &EdgeId, satisfied: bool) -> Result<DependencyEdge> {
        let mut inner = self.inner.lock().await;
        let edge = inner
            .edge_mut(id)
            .ok_or_else(|| Error::EdgeNotFound(id.clone()))?;
        edge.satisfied = satisfied;
        Ok(edge.clone())
    }

    async fn import(&self, snapshot: Snapshot) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.import(snapshot);
        Ok(())
    }

    async fn export_all(&self) -> Result<Snapshot> {
        let inner = self.inner.lock().await;
        Ok(inner.snapshot())
    }

    async fn save(&self) -> Result<()> {
        // Nothing to persist; see save_to_jsonl for file-backed storage
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        Ok(())
    }
}
