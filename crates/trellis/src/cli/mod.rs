//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for trellis using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new trellis repository
//! - `import`: Load initiatives, edges and scenarios from a JSONL file
//! - `graph`: Show a project's dependency graph
//! - `cycles`: Detect circular BLOCKING dependencies
//! - `ready`: Check whether an initiative can start
//! - `critical-path`: Compute the critical path and slack
//! - `conflicts`: Find date overlaps and cycles
//! - `risk`: Summarize schedule risk
//! - `scenario`: Evaluate proposed date changes
//! - `dep`: Add, remove or satisfy dependency edges
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis init --project core
//! trellis import plan.jsonl
//! trellis critical-path --no-write
//! trellis scenario --change design:end=2026-02-10 --save "slip design"
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    ConflictsArgs, CriticalPathArgs, CyclesArgs, DepAction, DepArgs, GraphArgs, ImportArgs,
    InitArgs, ProjectArgs, ReadyArgs, RiskArgs, ScenarioArgs,
};
pub use types::{DependencyKindArg, SlackBaselineArg};
pub use validators::{parse_change, validate_project_id, validate_record_id};

/// Trellis - dependency-aware initiative scheduling
///
/// Detect cycles, compute critical paths, find date conflicts, and evaluate
/// what-if scenarios over initiatives stored in `.trellis/schedule.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trellis repository
    ///
    /// Creates the `.trellis/` directory with configuration and an empty data file.
    Init(InitArgs),

    /// Import records from a JSONL file
    ///
    /// Records with an existing id replace the stored one.
    Import(ImportArgs),

    /// Show the dependency graph of a project
    Graph(GraphArgs),

    /// Detect circular BLOCKING dependencies
    Cycles(CyclesArgs),

    /// Check whether an initiative can start
    ///
    /// Lists the BLOCKING predecessors that are not completed yet.
    Ready(ReadyArgs),

    /// Compute the critical path
    ///
    /// Writes each initiative's critical flag back to the store unless
    /// `--no-write` is given.
    #[command(name = "critical-path")]
    CriticalPath(CriticalPathArgs),

    /// Find date overlaps and circular dependencies
    Conflicts(ConflictsArgs),

    /// Summarize schedule risk with recommendations
    Risk(RiskArgs),

    /// Evaluate proposed date changes without applying them
    Scenario(ScenarioArgs),

    /// Manage dependency edges
    Dep(DepArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Trellis initiative scheduling");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args).await;
        }

        let app = App::from_directory(&std::env::current_dir()?).await?;

        match command {
            Commands::Init(_) => Ok(()),
            Commands::Import(args) => execute::execute_import(&app, args, output_mode).await,
            Commands::Graph(args) => execute::execute_graph(&app, args, output_mode).await,
            Commands::Cycles(args) => execute::execute_cycles(&app, args, output_mode).await,
            Commands::Ready(args) => execute::execute_ready(&app, args, output_mode).await,
            Commands::CriticalPath(args) => {
                execute::execute_critical_path(&app, args, output_mode).await
            }
            Commands::Conflicts(args) => execute::execute_conflicts(&app, args, output_mode).await,
            Commands::Risk(args) => execute::execute_risk(&app, args, output_mode).await,
            Commands::Scenario(args) => execute::execute_scenario(&app, args, output_mode).await,
            Commands::Dep(args) => execute::execute_dep(&app, args, output_mode).await,
        }
    }
}
