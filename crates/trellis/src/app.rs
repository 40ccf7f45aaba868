//! Application context for CLI command execution.
//!
//! `App` discovers the `.trellis/` directory, loads the configuration, and
//! opens the configured store. Commands get a [`Scheduler`] borrowing that
//! store for the duration of one operation.
//!
//! # Example
//!
//! ```no_run
//! use trellis::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let project = app.resolve_project(None)?;
//!     let report = app.scheduler().detect_cycles(&project).await?;
//!     println!("cycles: {}", report.has_cycles);
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, TRELLIS_DIR_NAME, find_trellis_root};
use crate::config::TrellisConfig;
use crate::domain::ProjectId;
use crate::error::{ConfigError, Result};
use crate::schedule::Scheduler;
use crate::store::{ScheduleStore, create_store};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
pub struct App {
    /// The store backend (trait object for polymorphism)
    store: Box<dyn ScheduleStore>,

    /// Path to the trellis directory (.trellis)
    trellis_dir: PathBuf,

    /// Loaded configuration
    config: TrellisConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("trellis_dir", &self.trellis_dir)
            .field("config", &self.config)
            .field("store", &"<dyn ScheduleStore>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.trellis/` directory,
    /// loads configuration, and opens the store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No trellis repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The data file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_trellis_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let trellis_dir = root_dir.join(TRELLIS_DIR_NAME);
        let config = TrellisConfig::load(&trellis_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.to_backend(&root_dir);
        tracing::debug!(backend = ?backend, "Opening store");
        let store = create_store(backend).await?;

        Ok(Self {
            store,
            trellis_dir,
            config,
        })
    }

    /// Get the store.
    pub fn store(&self) -> &dyn ScheduleStore {
        self.store.as_ref()
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// Get the path to the trellis directory.
    pub fn trellis_dir(&self) -> &Path {
        &self.trellis_dir
    }

    /// A scheduler over this app's store with the configured engine settings.
    pub fn scheduler(&self) -> Scheduler<'_> {
        Scheduler::with_config(self.store(), self.config.engine.clone())
    }

    /// Pick the explicit project, falling back to `default-project`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if neither is set.
    pub fn resolve_project(&self, explicit: Option<&str>) -> Result<ProjectId> {
        explicit
            .or(self.config.default_project.as_deref())
            .map(ProjectId::new)
            .ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "default-project",
                    reason: "no --project given and no default-project configured".to_string(),
                }
                .into()
            })
    }

    /// Save store state to persistent storage.
    ///
    /// This should be called after any mutating operation.
    pub async fn save(&self) -> Result<()> {
        self.store.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), Some("core")).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();

        assert!(app.trellis_dir().ends_with(".trellis"));
        assert_eq!(app.resolve_project(None).unwrap().as_str(), "core");
        let other = app.resolve_project(Some("other")).unwrap();
        assert_eq!(other.as_str(), "other");
    }

    #[tokio::test]
    async fn test_app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), None).await.unwrap();

        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert!(app.resolve_project(None).is_err());
    }

    #[tokio::test]
    async fn test_app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a trellis repository"));
    }
}
