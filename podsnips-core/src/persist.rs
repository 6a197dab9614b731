//! Persisted application state
//!
//! Both cache slices are stored verbatim, local annotations included, as a
//! single versioned JSON blob at `$XDG_DATA_HOME/podsnips/state.json`:
//!
//! ```json
//! { "version": 1, "root": "podsnips", "projects": { ... }, "tasks": { ... } }
//! ```
//!
//! The blob is rehydrated wholesale before a command runs. A missing,
//! unreadable or foreign-version blob rehydrates as empty state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{AppState, ProjectsState, TasksState};

/// Blob format version written by this build.
pub const STATE_VERSION: u32 = 1;

/// Namespace key of the blob.
pub const ROOT_KEY: &str = "podsnips";

#[derive(Serialize)]
struct BlobRef<'a> {
    version: u32,
    root: &'a str,
    projects: &'a ProjectsState,
    tasks: &'a TasksState,
}

#[derive(Deserialize)]
struct Blob {
    version: u32,
    root: String,
    #[serde(default)]
    projects: ProjectsState,
    #[serde(default)]
    tasks: TasksState,
}

/// The on-disk location of the persisted blob.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_DATA_HOME/podsnips/state.json`
    pub fn default_location() -> Self {
        Self::new(Config::state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Rehydrate state from disk.
    pub fn load(&self) -> AppState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No persisted state");
                return AppState::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read persisted state");
                return AppState::default();
            }
        };

        match decode(&content) {
            Ok(mut state) => {
                state.settle();
                tracing::info!(
                    projects = state.projects.items().len(),
                    tasks = state.tasks.tasks().len(),
                    project_id = state.tasks.current_project_id().unwrap_or(""),
                    "Rehydrated state"
                );
                state
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring persisted state");
                AppState::default()
            }
        }
    }

    /// Write state atomically (temp file then rename).
    pub fn save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Persist(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let blob = BlobRef {
            version: STATE_VERSION,
            root: ROOT_KEY,
            projects: &state.projects,
            tasks: &state.tasks,
        };
        let json = serde_json::to_vec_pretty(&blob)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::Persist(format!("failed to write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Persist(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), "Persisted state");
        Ok(())
    }

    /// Delete the blob. Returns whether a file was removed.
    pub fn purge(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Purged persisted state");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Persist(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn decode(content: &str) -> Result<AppState> {
    let blob: Blob = serde_json::from_str(content)?;

    if blob.version != STATE_VERSION {
        return Err(Error::Persist(format!(
            "unsupported state version {} (expected {})",
            blob.version, STATE_VERSION
        )));
    }
    if blob.root != ROOT_KEY {
        return Err(Error::Persist(format!("unexpected root key {:?}", blob.root)));
    }

    Ok(AppState {
        projects: blob.projects,
        tasks: blob.tasks,
    })
}
