//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{
    ConflictsArgs, CriticalPathArgs, CyclesArgs, DepAction, DepArgs, GraphArgs, ImportArgs,
    InitArgs, ReadyArgs, RiskArgs, ScenarioArgs,
};
use crate::app::App;
use crate::domain::{EdgeId, InitiativeId, NewDependencyEdge, ScenarioPersistence};
use crate::output::{self, OutputMode};
use crate::schedule::Scheduler;
use crate::store::in_memory::{LoadWarning, read_jsonl_snapshot};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!(
            "Initializing trellis repository{}...",
            args.project
                .as_ref()
                .map(|p| format!(" with default project '{p}'"))
                .unwrap_or_default()
        );
    }

    let result = init::init(&current_dir, args.project.as_deref()).await?;

    if !args.quiet {
        println!("Initialized trellis in {}", result.trellis_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Data: {}", result.data_file.display());
        if let Some(project) = &result.default_project {
            println!("  Default project: {project}");
        }
    }

    Ok(())
}

/// Execute the import command
pub async fn execute_import(app: &App, args: &ImportArgs, output_mode: OutputMode) -> Result<()> {
    let (snapshot, warnings) = read_jsonl_snapshot(&args.file).await?;

    for warning in &warnings {
        match warning {
            LoadWarning::MalformedJson { line_number, error } => {
                tracing::warn!(line = line_number, error = %error, "Skipped malformed record");
            }
            LoadWarning::DuplicateRecord { line_number, id } => {
                tracing::warn!(line = line_number, id = %id, "Duplicate record, later one kept");
            }
            LoadWarning::OrphanedDependency { edge, missing } => {
                tracing::warn!(
                    edge = %edge,
                    missing = %missing,
                    "Edge references unknown initiative"
                );
            }
        }
    }

    let initiatives = snapshot.initiatives.len();
    let edges = snapshot.edges.len();
    let scenarios = snapshot.scenarios.len();

    app.store().import(snapshot).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "file": args.file.display().to_string(),
            "initiatives": initiatives,
            "edges": edges,
            "scenarios": scenarios,
            "warnings": warnings.len(),
        }))?,
        OutputMode::Text => {
            let flagged = if warnings.is_empty() {
                String::new()
            } else {
                format!(" ({} line(s) skipped or flagged)", warnings.len())
            };
            println!(
                "Imported {initiatives} initiative(s), {edges} edge(s), {scenarios} scenario(s) \
                 from {}{flagged}",
                args.file.display()
            );
        }
    }

    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;
    let graph = app.scheduler().build_graph(&project).await?;
    output::print_graph(&graph.view(), output_mode)?;
    Ok(())
}

/// Execute the cycles command
pub async fn execute_cycles(app: &App, args: &CyclesArgs, output_mode: OutputMode) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;
    let report = app.scheduler().detect_cycles(&project).await?;
    output::print_cycles(&report, output_mode)?;
    Ok(())
}

/// Execute the ready command
pub async fn execute_ready(app: &App, args: &ReadyArgs, output_mode: OutputMode) -> Result<()> {
    let id = InitiativeId::new(&args.initiative_id);
    let readiness = app.scheduler().can_start(&id).await?;
    output::print_readiness(&id, &readiness, output_mode)?;
    Ok(())
}

/// Execute the critical-path command
pub async fn execute_critical_path(
    app: &App,
    args: &CriticalPathArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;

    let mut engine = app.config().engine.clone();
    if let Some(baseline) = args.baseline {
        engine.slack_baseline = baseline.into();
    }
    let scheduler = Scheduler::with_config(app.store(), engine);

    let report = if args.no_write {
        scheduler.plan_critical_path(&project).await?
    } else {
        scheduler.compute_critical_path(&project).await?
    };
    output::print_critical_path(&report, output_mode)?;
    Ok(())
}

/// Execute the conflicts command
pub async fn execute_conflicts(
    app: &App,
    args: &ConflictsArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;
    let report = app.scheduler().detect_conflicts(&project).await?;
    output::print_conflicts(&report, output_mode)?;
    Ok(())
}

/// Execute the risk command
pub async fn execute_risk(app: &App, args: &RiskArgs, output_mode: OutputMode) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;
    let analysis = app.scheduler().analyze_risk(&project).await?;
    output::print_risk(&analysis, output_mode)?;
    Ok(())
}

/// Execute the scenario command
pub async fn execute_scenario(
    app: &App,
    args: &ScenarioArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let project = app.resolve_project(args.project.project.as_deref())?;
    let persistence = match &args.save {
        Some(name) => ScenarioPersistence::Named(name.clone()),
        None => ScenarioPersistence::Transient,
    };

    let impact = app
        .scheduler()
        .evaluate_scenario(&project, &args.changes, persistence)
        .await?;
    output::print_impact(&impact, args.save.as_deref(), output_mode)?;
    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add { from, to, kind } => {
            let edge = app
                .store()
                .create_dependency_edge(NewDependencyEdge {
                    from_id: InitiativeId::new(from),
                    to_id: InitiativeId::new(to),
                    kind: (*kind).into(),
                })
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_edge(&edge, output_mode)?,
                OutputMode::Text => {
                    println!("Added dependency: {from} --[{kind}]--> {to} ({})", edge.id);
                }
            }
        }
        DepAction::Remove { edge_id } => {
            app.store()
                .delete_dependency_edge(&EdgeId::new(edge_id))
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "action": "remove",
                    "edge": edge_id,
                    "status": "success"
                }))?,
                OutputMode::Text => println!("Removed dependency {edge_id}"),
            }
        }
        DepAction::Satisfy { edge_id, unset } => {
            let edge = app
                .store()
                .mark_edge_satisfied(&EdgeId::new(edge_id), !unset)
                .await?;
            app.save().await?;
            output::print_edge(&edge, output_mode)?;
        }
    }

    Ok(())
}
