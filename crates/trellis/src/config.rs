//! Configuration management for trellis.
//!
//! Configuration lives in `.trellis/config.yaml`:
//!
//! ```yaml
//! default-project: core
//! storage:
//!   backend: jsonl
//!   data_file: .trellis/schedule.jsonl
//! engine:
//!   long_schedule_days: 365
//!   critical_chain_nodes: 5
//!   slack_baseline: global
//! ```
//!
//! `default-project` and `engine` may be omitted.

use crate::error::{ConfigError, Result};
use crate::store::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default makespan (days) above which a schedule is high risk
pub const DEFAULT_LONG_SCHEDULE_DAYS: i64 = 365;

/// Default critical path length (nodes) above which a schedule is medium risk
pub const DEFAULT_CRITICAL_CHAIN_NODES: usize = 5;

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrellisConfig {
    /// Project used when a command is given no `--project`
    #[serde(
        rename = "default-project",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_project: Option<String>,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Scheduling engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Storage configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: BackendKind,

    /// Path to the data file, relative to the repository root
    pub data_file: String,
}

/// Storage backend names accepted in `config.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory store loaded from and saved to the JSONL data file
    Jsonl,

    /// Ephemeral in-memory store; nothing is read or written
    Memory,
}

/// Thresholds and policies of the scheduling engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Makespan in days above which the schedule is high risk
    pub long_schedule_days: i64,

    /// Critical path length above which the schedule is medium risk
    pub critical_chain_nodes: usize,

    /// What an initiative's slack is measured against
    pub slack_baseline: SlackBaseline,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            long_schedule_days: DEFAULT_LONG_SCHEDULE_DAYS,
            critical_chain_nodes: DEFAULT_CRITICAL_CHAIN_NODES,
            slack_baseline: SlackBaseline::default(),
        }
    }
}

impl EngineConfig {
    /// Reject thresholds that would make every schedule risky.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.long_schedule_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.long_schedule_days",
                reason: format!("must be positive, got {}", self.long_schedule_days),
            });
        }
        if self.critical_chain_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.critical_chain_nodes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Latest-finish baseline used for slack.
///
/// None of these is the only "right" answer for every portfolio: the first
/// two reproduce the single-makespan approximation, the last is classical
/// CPM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlackBaseline {
    /// Makespan of the initiative's weakly connected BLOCKING component
    Component,

    /// Project makespan for every initiative
    #[default]
    Global,

    /// Latest finish derived from successors (backward pass)
    BackwardPass,
}

impl TrellisConfig {
    /// Create a configuration storing JSONL data at `data_file`.
    pub fn new(default_project: Option<&str>, data_file: &str) -> Self {
        Self {
            default_project: default_project.map(str::to_string),
            storage: StorageConfig {
                backend: BackendKind::Jsonl,
                data_file: data_file.to_string(),
            },
            engine: EngineConfig::default(),
        }
    }

    /// Load and validate configuration from a file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the file cannot be read
    /// - `ConfigError::Parse` for malformed YAML
    /// - `ConfigError::InvalidValue` for out-of-range engine settings
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the storage backend relative to the repository root.
    pub fn to_backend(&self, root_dir: &Path) -> StorageBackend {
        match self.storage.backend {
            BackendKind::Jsonl => StorageBackend::Jsonl(root_dir.join(&self.storage.data_file)),
            BackendKind::Memory => StorageBackend::InMemory,
        }
    }
}
