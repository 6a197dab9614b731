//! Project Cache: the list of projects fetched from the server

use serde::{Deserialize, Serialize};

use crate::types::Project;

/// Cached project list with its load status.
///
/// Reducers mutate, selectors read; the async sequencing lives in
/// [`Store::load_projects`](super::Store::load_projects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectsState {
    #[serde(default)]
    items: Vec<Project>,
    #[serde(default)]
    loading: bool,
    #[serde(default)]
    error: Option<String>,
}

impl ProjectsState {
    // ----- reducers -----

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace the whole list. Overlapping loads resolve last-writer-wins.
    pub fn load_succeeded(&mut self, items: Vec<Project>) {
        self.loading = false;
        self.error = None;
        self.items = items;
    }

    /// Keep the previous list and record the failure.
    pub fn load_failed(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    /// Empty the list and error. The loading flag is left alone.
    pub fn clear(&mut self) {
        self.items.clear();
        self.error = None;
    }

    /// Reset transient flags after rehydrating from disk.
    pub(crate) fn settle(&mut self) {
        self.loading = false;
    }

    // ----- selectors -----

    pub fn items(&self) -> &[Project] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn project_by_id(&self, project_id: &str) -> Option<&Project> {
        self.items.iter().find(|p| p.id == project_id)
    }
}
