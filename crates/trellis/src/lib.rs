//! Trellis - a dependency-aware scheduling engine for project initiatives.
//!
//! The library builds a dependency graph per project and answers questions
//! about it: circular dependencies, readiness to start, the critical path,
//! date conflicts, schedule risk, and the impact of what-if date changes.
//! Records live behind the [`store::ScheduleStore`] trait; the CLI uses a
//! JSONL-backed store in `.trellis/`.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod schedule;
pub mod store;

// Application context and configuration
pub mod app;
pub mod config;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Output formatting
pub mod output;
