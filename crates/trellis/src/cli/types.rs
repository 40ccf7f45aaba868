//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing
//! and their conversions to domain types.

use clap::ValueEnum;

use crate::config::SlackBaseline;
use crate::domain::DependencyKind;

/// Dependency kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKindArg {
    /// Successor may not start before the predecessor finishes
    Blocking,
    /// Informational link, ignored by scheduling
    Soft,
}

impl std::fmt::Display for DependencyKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking => write!(f, "blocking"),
            Self::Soft => write!(f, "soft"),
        }
    }
}

impl From<DependencyKindArg> for DependencyKind {
    fn from(arg: DependencyKindArg) -> Self {
        match arg {
            DependencyKindArg::Blocking => DependencyKind::Blocking,
            DependencyKindArg::Soft => DependencyKind::Soft,
        }
    }
}

/// Slack baseline for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlackBaselineArg {
    /// Makespan of the initiative's connected component
    Component,
    /// Makespan of the whole project
    Global,
    /// Latest finish from a backward pass over successors
    #[value(name = "backward-pass", alias = "backward_pass")]
    BackwardPass,
}

impl From<SlackBaselineArg> for SlackBaseline {
    fn from(arg: SlackBaselineArg) -> Self {
        match arg {
            SlackBaselineArg::Component => SlackBaseline::Component,
            SlackBaselineArg::Global => SlackBaseline::Global,
            SlackBaselineArg::BackwardPass => SlackBaseline::BackwardPass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_kind_conversion() {
        assert_eq!(
            DependencyKind::from(DependencyKindArg::Blocking),
            DependencyKind::Blocking
        );
        assert_eq!(
            DependencyKind::from(DependencyKindArg::Soft),
            DependencyKind::Soft
        );
        assert_eq!(DependencyKindArg::Soft.to_string(), "soft");
    }

    #[test]
    fn test_slack_baseline_conversion() {
        assert_eq!(
            SlackBaseline::from(SlackBaselineArg::BackwardPass),
            SlackBaseline::BackwardPass
        );
        assert_eq!(
            SlackBaseline::from(SlackBaselineArg::Component),
            SlackBaseline::Component
        );
    }
}
