//! What-if scenario records.

use super::{InitiativeId, ProjectId, ScenarioId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which planned date a scenario change moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioField {
    /// `plannedStartDate`
    PlannedStartDate,

    /// `plannedEndDate`
    PlannedEndDate,
}

impl fmt::Display for ScenarioField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlannedStartDate => f.write_str("plannedStartDate"),
            Self::PlannedEndDate => f.write_str("plannedEndDate"),
        }
    }
}

/// A single proposed date change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioChange {
    /// Initiative being moved
    pub initiative_id: InitiativeId,

    /// Date being moved
    pub field: ScenarioField,

    /// Proposed date
    pub new_value: NaiveDate,
}

impl ScenarioChange {
    /// Move an initiative's planned end date.
    pub fn end(initiative_id: impl Into<InitiativeId>, new_value: NaiveDate) -> Self {
        Self {
            initiative_id: initiative_id.into(),
            field: ScenarioField::PlannedEndDate,
            new_value,
        }
    }

    /// Move an initiative's planned start date.
    pub fn start(initiative_id: impl Into<InitiativeId>, new_value: NaiveDate) -> Self {
        Self {
            initiative_id: initiative_id.into(),
            field: ScenarioField::PlannedStartDate,
            new_value,
        }
    }
}

/// Downstream impact of a set of scenario changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Changed initiatives followed by everything downstream of a delay
    pub affected_initiative_ids: Vec<InitiativeId>,

    /// Human-readable `"A → B: ..."` descriptions of broken constraints
    pub dependency_breaks: Vec<String>,

    /// Sum of positive end-date shifts, in days
    pub total_delay_days: i64,

    /// True iff no dependency was broken
    pub is_valid: bool,

    /// Non-fatal problems with the proposed changes
    pub warnings: Vec<String>,
}

/// A named, persisted scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique identifier
    pub id: ScenarioId,

    /// Owning project
    pub project_id: ProjectId,

    /// Display name
    pub name: String,

    /// Proposed changes
    pub changes: Vec<ScenarioChange>,

    /// Impact computed when the scenario was evaluated
    pub impact: ImpactReport,

    /// When the scenario was stored
    pub created_at: DateTime<Utc>,
}

/// Whether an evaluated scenario is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScenarioPersistence {
    /// Return the impact only
    #[default]
    Transient,

    /// Store the scenario under the given name
    Named(String),
}
