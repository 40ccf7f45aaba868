//! Domain types for dependency-aware scheduling.
//!
//! This module contains the records the scheduling core reads from (and
//! occasionally writes back to) the external store: initiatives, the
//! dependency edges between them, and what-if scenarios.

mod scenario;

pub use scenario::{ImpactReport, Scenario, ScenarioChange, ScenarioField, ScenarioPersistence};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of the project an initiative belongs to.
    ProjectId
);

string_id!(
    /// Unique identifier for an initiative.
    InitiativeId
);

string_id!(
    /// Unique identifier for a dependency edge.
    EdgeId
);

string_id!(
    /// Unique identifier for a stored scenario.
    ScenarioId
);

/// A unit of work scheduled inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Unique identifier
    pub id: InitiativeId,

    /// Owning project
    pub project_id: ProjectId,

    /// Display name
    pub name: String,

    /// Planned start date
    #[serde(default)]
    pub planned_start: Option<NaiveDate>,

    /// Planned end date
    #[serde(default)]
    pub planned_end: Option<NaiveDate>,

    /// Lifecycle status
    pub status: InitiativeStatus,

    /// Owner (optional)
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Derived marker written back by the critical path calculator
    #[serde(default)]
    pub is_critical_path: Option<bool>,

    /// Why the initiative is blocked, if it is
    #[serde(default)]
    pub blocked_reason: Option<String>,
}

impl Initiative {
    /// Create an initiative with the given dates and `Planned` status.
    pub fn new(
        id: impl Into<InitiativeId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
        planned_start: Option<NaiveDate>,
        planned_end: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            planned_start,
            planned_end,
            status: InitiativeStatus::Planned,
            owner_id: None,
            is_critical_path: None,
            blocked_reason: None,
        }
    }

    /// Set the status, builder style.
    #[must_use]
    pub fn with_status(mut self, status: InitiativeStatus) -> Self {
        self.status = status;
        self
    }

    /// Planned duration in whole days, never less than one.
    ///
    /// A missing start or end date counts as a one-day initiative.
    pub fn duration_days(&self) -> i64 {
        match (self.planned_start, self.planned_end) {
            (Some(start), Some(end)) => (end - start).num_days().max(1),
            _ => 1,
        }
    }
}

/// Lifecycle status of an initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitiativeStatus {
    /// Captured but not yet planned
    Draft,

    /// Scheduled, not started
    Planned,

    /// Work under way
    InProgress,

    /// Paused
    OnHold,

    /// Under way but flagged as at risk
    AtRisk,

    /// Done
    Completed,

    /// Abandoned
    Cancelled,
}

impl InitiativeStatus {
    /// Terminal statuses never block successors.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for InitiativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "DRAFT",
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::AtRisk => "AT_RISK",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Kind of dependency between two initiatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    /// Finish-to-start: the successor must not start before the predecessor ends
    #[default]
    Blocking,

    /// Informational link, no scheduling enforcement
    Soft,
}

impl DependencyKind {
    /// Whether this kind takes part in critical path and conflict computation.
    pub fn is_blocking(self) -> bool {
        self == Self::Blocking
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => f.write_str("BLOCKING"),
            Self::Soft => f.write_str("SOFT"),
        }
    }
}

/// Directed dependency: `from_id` (predecessor) -> `to_id` (successor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Unique identifier
    pub id: EdgeId,

    /// Predecessor initiative
    pub from_id: InitiativeId,

    /// Successor initiative
    pub to_id: InitiativeId,

    /// Blocking or soft
    pub kind: DependencyKind,

    /// Whether the surrounding application marked the dependency as met
    #[serde(default)]
    pub satisfied: bool,
}

impl DependencyEdge {
    /// Create an unsatisfied edge.
    pub fn new(
        id: impl Into<EdgeId>,
        from_id: impl Into<InitiativeId>,
        to_id: impl Into<InitiativeId>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            id: id.into(),
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
            satisfied: false,
        }
    }

    /// Self-edges are degenerate one-node cycles.
    pub fn is_self_edge(&self) -> bool {
        self.from_id == self.to_id
    }
}

/// Data for creating a new dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDependencyEdge {
    /// Predecessor initiative
    pub from_id: InitiativeId,

    /// Successor initiative
    pub to_id: InitiativeId,

    /// Blocking or soft
    pub kind: DependencyKind,
}
