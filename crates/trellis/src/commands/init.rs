//! Implementation of the `init` command.
//!
//! This module handles initialization of a new trellis repository, creating
//! the `.trellis/` directory with configuration and an empty data file.

use crate::config::TrellisConfig;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the trellis directory
pub const TRELLIS_DIR_NAME: &str = ".trellis";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the schedule data file
pub const DATA_FILE_NAME: &str = "schedule.jsonl";

/// Name of the gitignore file within .trellis
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum project id length
pub const MAX_PROJECT_ID_LENGTH: usize = 64;

/// Maximum directory depth to traverse when searching for the trellis root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created trellis directory
    pub trellis_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data file
    pub data_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The default project written to the config, if any
    pub default_project: Option<String>,
}

/// Validate a project identifier.
///
/// Requirements:
/// - 1-64 characters
/// - ASCII letters, digits, `-` and `_` only
///
/// Note: Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` describing the first rule broken.
pub fn validate_project_id(project: &str) -> Result<()> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "default-project",
        reason,
    };

    if project.is_empty() {
        return Err(invalid("project id cannot be empty".to_string()).into());
    }

    if project.len() > MAX_PROJECT_ID_LENGTH {
        return Err(invalid(format!(
            "project id cannot exceed {MAX_PROJECT_ID_LENGTH} characters"
        ))
        .into());
    }

    if !project
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "project id must contain only alphanumeric characters, '-' or '_'".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Initialize a new trellis repository in the given directory.
///
/// # Arguments
///
/// * `base_dir` - The base directory where `.trellis/` will be created
/// * `default_project` - Optional project used when commands omit `--project`
///
/// # Errors
///
/// Returns an error if:
/// - The `.trellis/` directory already exists
/// - The project id is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, default_project: Option<&str>) -> Result<InitResult> {
    let default_project = default_project.map(str::trim);
    if let Some(project) = default_project {
        validate_project_id(project)?;
    }

    let trellis_dir = base_dir.join(TRELLIS_DIR_NAME);

    if trellis_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(trellis_dir).into());
    }

    fs::create_dir_all(&trellis_dir).await?;

    let config_file = trellis_dir.join(CONFIG_FILE_NAME);
    let config = TrellisConfig::new(
        default_project,
        &format!("{TRELLIS_DIR_NAME}/{DATA_FILE_NAME}"),
    );
    config.save(&config_file).await?;

    let data_file = trellis_dir.join(DATA_FILE_NAME);
    fs::write(&data_file, "").await?;

    let gitignore_file = trellis_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Temporary files left by interrupted saves
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::debug!(dir = %trellis_dir.display(), "Initialized trellis repository");

    Ok(InitResult {
        trellis_dir,
        config_file,
        data_file,
        gitignore_file,
        default_project: default_project.map(str::to_string),
    })
}

/// Check if a directory has been initialized with trellis.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRELLIS_DIR_NAME).exists()
}

/// Find the trellis root directory by searching up the directory tree.
///
/// Returns `Some(path)` with the directory containing `.trellis/`, or
/// `None` if none is found within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_trellis_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRELLIS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
