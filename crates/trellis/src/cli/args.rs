//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::types::{DependencyKindArg, SlackBaselineArg};
use super::validators::{parse_change, validate_project_id, validate_record_id};
use crate::domain::ScenarioChange;

/// Project selection shared by the project-scoped commands
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project id (defaults to `default-project` from the config)
    #[arg(short, long, value_parser = validate_project_id)]
    pub project: Option<String>,
}

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Default project for commands run without `--project`
    #[arg(short, long, value_parser = validate_project_id)]
    pub project: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `import` command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// JSONL file of initiative, edge and scenario records
    pub file: PathBuf,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone)]
pub struct CyclesArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Initiative to check
    #[arg(value_parser = validate_record_id)]
    pub initiative_id: String,
}

/// Arguments for the `critical-path` command
#[derive(Parser, Debug, Clone)]
pub struct CriticalPathArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Compute without writing critical flags back to the store
    #[arg(long)]
    pub no_write: bool,

    /// Override the configured slack baseline
    #[arg(long, value_enum)]
    pub baseline: Option<SlackBaselineArg>,
}

/// Arguments for the `conflicts` command
#[derive(Parser, Debug, Clone)]
pub struct ConflictsArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the `risk` command
#[derive(Parser, Debug, Clone)]
pub struct RiskArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the `scenario` command
#[derive(Parser, Debug, Clone)]
pub struct ScenarioArgs {
    /// Project to operate on
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Proposed change: `<initiative>:<start|end>=<YYYY-MM-DD>` (repeatable)
    #[arg(short, long = "change", value_parser = parse_change, required = true)]
    pub changes: Vec<ScenarioChange>,

    /// Store the evaluated scenario under this name
    #[arg(long)]
    pub save: Option<String>,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Edge action to run
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency edge actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency edge: <TO> depends on <FROM>
    Add {
        /// Predecessor initiative
        #[arg(value_parser = validate_record_id)]
        from: String,

        /// Successor initiative
        #[arg(value_parser = validate_record_id)]
        to: String,

        /// Dependency kind
        #[arg(short, long, value_enum, default_value = "blocking")]
        kind: DependencyKindArg,
    },

    /// Remove a dependency edge
    Remove {
        /// Edge id
        #[arg(value_parser = validate_record_id)]
        edge_id: String,
    },

    /// Mark a dependency edge as satisfied
    Satisfy {
        /// Edge id
        #[arg(value_parser = validate_record_id)]
        edge_id: String,

        /// Clear the satisfied flag instead
        #[arg(long)]
        unset: bool,
    },
}
