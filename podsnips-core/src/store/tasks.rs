//! Task Cache: tasks, transcript and video id of the currently loaded project
//!
//! At most one project is cached at a time. Every `begin_load` (and `clear`)
//! advances a generation counter; reducers that apply fetched data take the
//! generation they were started under and ignore the update when it is no
//! longer current. This keeps a background pagination loop started for one
//! project from merging into another project's list.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Clip, Task, TranscriptSegment};

/// The first page of a project plus its transcript, ready to be cached.
#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    /// Page-1 tasks with derived ids
    pub tasks: Vec<Task>,
    pub transcript: Vec<TranscriptSegment>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasksState {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    loading: bool,
    #[serde(default)]
    loading_more: bool,
    #[serde(default)]
    error: Option<String>,
    /// Failure of the most recent background pagination loop
    #[serde(default)]
    loading_more_error: Option<String>,
    #[serde(default)]
    current_project_id: Option<String>,
    #[serde(default)]
    transcript: Option<Vec<TranscriptSegment>>,
    #[serde(default)]
    video_id: Option<String>,
    /// First page not yet merged, while pagination is unfinished
    #[serde(default)]
    next_page: Option<u32>,
    #[serde(skip)]
    generation: u64,
}

impl TasksState {
    // ----- reducers -----

    /// Start a foreground load and return its generation.
    ///
    /// Any background loop of an earlier generation is abandoned, so its
    /// `loading_more` bracket is closed here.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.loading_more = false;
        self.error = None;
        self.generation
    }

    /// Store page 1 and the transcript. Returns false if `generation` is stale.
    pub fn load_succeeded(
        &mut self,
        generation: u64,
        project_id: &str,
        loaded: LoadedProject,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading = false;
        self.tasks = loaded.tasks;
        self.transcript = Some(loaded.transcript);
        self.video_id = loaded.video_id;
        self.current_project_id = Some(project_id.to_string());
        self.loading_more_error = None;
        self.next_page = None;
        true
    }

    /// Record a failed foreground load. Previously cached data stays in place.
    pub fn load_failed(&mut self, generation: u64, message: String) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading = false;
        self.error = Some(message);
        true
    }

    pub fn begin_loading_more(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading_more = true;
        self.loading_more_error = None;
        true
    }

    /// Append tasks not already present, first-seen wins.
    ///
    /// Returns the number of tasks added, or None if `generation` is stale.
    pub fn append_tasks(&mut self, generation: u64, incoming: Vec<Task>) -> Option<usize> {
        if !self.is_current(generation) {
            return None;
        }
        Some(self.merge(incoming))
    }

    /// Record where pagination stands. `None` means every page is merged.
    ///
    /// A loop that stops early (process exit, failure) leaves the marker set
    /// so a later run can resume from it.
    pub fn set_next_page(&mut self, generation: u64, next_page: Option<u32>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.next_page = next_page;
        true
    }

    /// Close the `loading_more` bracket. `error` is kept for display; the
    /// primary load state is untouched.
    pub fn finish_loading_more(&mut self, generation: u64, error: Option<String>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading_more = false;
        self.loading_more_error = error;
        true
    }

    /// Mark a task rejected. No-op (returns false) on unknown ids.
    pub fn reject_task(&mut self, task_id: &str, at: DateTime<Utc>) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                task.rejected = true;
                task.rejected_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Append a clip to a task. No-op (returns false) on unknown ids.
    pub fn attach_clip(&mut self, task_id: &str, clip: Clip) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                task.clips.push(clip);
                true
            }
            None => false,
        }
    }

    /// Reset to the initial empty state, abandoning in-flight loads.
    pub fn clear(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// Reset transient flags after rehydrating from disk.
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        self.loading_more = false;
    }

    fn merge(&mut self, incoming: Vec<Task>) -> usize {
        let mut seen: HashSet<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let before = self.tasks.len();
        for task in incoming {
            if seen.insert(task.id.clone()) {
                self.tasks.push(task);
            }
        }
        self.tasks.len() - before
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    // ----- selectors -----

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_by_id(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading_more_error(&self) -> Option<&str> {
        self.loading_more_error.as_deref()
    }

    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    pub fn transcript(&self) -> Option<&[TranscriptSegment]> {
        self.transcript.as_deref()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Next page to fetch when the cached list is still partial.
    pub fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    /// Whether every page of the cached project has been merged.
    pub fn is_complete(&self) -> bool {
        self.next_page.is_none()
    }

    /// Whether `project_id` is the cached project and has tasks.
    ///
    /// Callers use this to skip a reload; a partial list ([`Self::is_complete`]
    /// false) is resumed rather than reloaded.
    pub fn is_cached(&self, project_id: &str) -> bool {
        self.current_project_id.as_deref() == Some(project_id) && !self.tasks.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}
