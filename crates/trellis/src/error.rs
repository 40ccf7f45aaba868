//! Error types for trellis operations.
//!
//! Only infrastructure and caller mistakes are errors. Cycles, edges that
//! point outside the project, and invalid scenarios are reported as data in
//! the engine's result types.

use crate::domain::{EdgeId, InitiativeId};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error reported by the external store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Initiative not found.
    #[error("Initiative not found: {0}")]
    InitiativeNotFound(InitiativeId),

    /// Dependency edge not found.
    #[error("Dependency edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// A dependency edge could not be created.
    #[error("Invalid dependency {from} -> {to}: {reason}")]
    InvalidDependency {
        /// Predecessor
        from: InitiativeId,
        /// Successor
        to: InitiativeId,
        /// What was wrong with it
        reason: String,
    },
}

impl Error {
    /// Returns `true` if the external store could not be reached.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable(_)))
    }
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached. Never retried by the engine.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A data file was not in the expected format.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// A record failed to serialize.
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// No unique id could be generated.
    #[error("ID generation failed: {0}")]
    IdGeneration(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.trellis` directory found.
    #[error("Not a trellis repository (no .trellis directory found). Run 'trellis init' first.")]
    NotInitialized,

    /// `init` ran twice.
    #[error("Trellis is already initialized. Found existing '{}'", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The config file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A config value is out of range.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Offending key
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
