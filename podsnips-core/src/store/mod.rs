//! Application state and the async operations that populate it
//!
//! [`AppState`] holds the two caches as plain values with reducer and
//! selector methods. [`Store`] wraps it behind a mutex together with an API
//! implementation and sequences the network calls:
//!
//! - [`Store::load_projects`] replaces the project list.
//! - [`Store::load_project`] fetches page 1 of a project's tasks and its
//!   transcript concurrently, then continues paging in a spawned task.
//! - [`Store::resume_remaining`] picks up paging of a cached list that an
//!   earlier run left unfinished.
//! - Clip creation is two-phase: [`Store::create_clip`] talks to the server,
//!   [`Store::apply_clip_locally`] mirrors the confirmed clip into the cache.
//!
//! The mutex is never held across an `.await`.

mod projects;
mod tasks;

pub use projects::ProjectsState;
pub use tasks::{LoadedProject, TasksState};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::api::{CreateClipRequest, CreateClipResponse, PodSnipsApi};
use crate::error::Result;
use crate::transcript::extract_video_id;
use crate::types::{Clip, Task};

/// Tasks requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Both cache slices. This is what gets persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub projects: ProjectsState,
    #[serde(default)]
    pub tasks: TasksState,
}

impl AppState {
    /// Reset flags that only make sense while this process is running.
    pub(crate) fn settle(&mut self) {
        self.projects.settle();
        self.tasks.settle();
    }
}

/// Shared handle to the application state and the API.
pub struct Store<A> {
    api: Arc<A>,
    state: Arc<Mutex<AppState>>,
    page_size: u32,
}

impl<A> Clone for Store<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            page_size: self.page_size,
        }
    }
}

impl<A: PodSnipsApi> Store<A> {
    pub fn new(api: A, state: AppState) -> Self {
        Self {
            api: Arc::new(api),
            state: Arc::new(Mutex::new(state)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a selector against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }

    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Copy of the current state, e.g. for persisting.
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    // ============================================
    // Projects
    // ============================================

    /// Fetch the project list. Failures are stored in the project cache.
    pub async fn load_projects(&self) {
        self.update(|s| s.projects.begin_load());
        tracing::info!("Fetching projects");

        match self.api.fetch_projects().await {
            Ok(projects) => {
                tracing::info!(count = projects.len(), "Loaded projects");
                self.update(|s| s.projects.load_succeeded(projects));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch projects");
                self.update(|s| s.projects.load_failed(e.to_string()));
            }
        }
    }

    pub fn clear_projects(&self) {
        self.update(|s| s.projects.clear());
    }

    // ============================================
    // Tasks
    // ============================================

    /// Load page 1 of `project_id` plus its transcript.
    ///
    /// Whether to call this at all (cache hit) is the caller's decision; see
    /// [`TasksState::is_cached`]. When more pages exist, a background task
    /// keeps merging them into the cache and its handle is returned.
    /// Failures are stored in the task cache, never returned.
    pub async fn load_project(&self, project_id: &str) -> Option<JoinHandle<()>> {
        let generation = self.update(|s| s.tasks.begin_load());
        tracing::info!(project_id, generation, "Fetching first page of tasks and transcript");

        let fetched = tokio::try_join!(
            self.api.fetch_project_tasks(project_id, 1, self.page_size),
            self.api.fetch_project_transcript(project_id),
        );

        let (page, transcript) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(project_id, error = %e, "Failed to fetch tasks");
                self.update(|s| s.tasks.load_failed(generation, e.to_string()));
                return None;
            }
        };

        let has_next = page.has_next;
        let loaded = LoadedProject {
            tasks: with_derived_ids(page.tasks),
            transcript: transcript.transcript.unwrap_or_default(),
            // some sources report a full watch URL instead of the bare id
            video_id: transcript
                .video_id
                .map(|v| extract_video_id(&v).unwrap_or(v)),
        };
        let (task_count, segment_count) = (loaded.tasks.len(), loaded.transcript.len());

        let next_page = has_next.then_some(2);
        let committed = self.update(|s| {
            s.tasks.load_succeeded(generation, project_id, loaded)
                && s.tasks.set_next_page(generation, next_page)
        });
        if !committed {
            tracing::debug!(project_id, generation, "Discarding superseded project load");
            return None;
        }

        tracing::info!(
            project_id,
            tasks = task_count,
            segments = segment_count,
            has_next,
            "Loaded first page"
        );

        next_page.map(|page| self.spawn_remaining(project_id.to_string(), generation, page))
    }

    /// Continue paging a partially cached project from where an earlier run
    /// stopped.
    ///
    /// Returns None when `project_id` is not the cached project, its list is
    /// already complete, or a loop is already running.
    pub fn resume_remaining(&self, project_id: &str) -> Option<JoinHandle<()>> {
        let (generation, next_page) = self.read(|s| {
            let resumable = s.tasks.current_project_id() == Some(project_id)
                && !s.tasks.is_loading_more();
            resumable.then(|| (s.tasks.generation(), s.tasks.next_page()))
        })?;
        let next_page = next_page?;

        tracing::info!(project_id, next_page, "Resuming pagination");
        Some(self.spawn_remaining(project_id.to_string(), generation, next_page))
    }

    fn spawn_remaining(&self, project_id: String, generation: u64, start_page: u32) -> JoinHandle<()> {
        // Raise the flag before spawning so callers observe it immediately
        self.update(|s| s.tasks.begin_loading_more(generation));

        let store = self.clone();
        tokio::spawn(async move {
            store
                .fetch_remaining(&project_id, generation, start_page)
                .await
        })
    }

    async fn fetch_remaining(&self, project_id: &str, generation: u64, start_page: u32) {
        let mut page = start_page;
        let mut added_total = 0;

        loop {
            if !self.read(|s| s.tasks.is_current(generation)) {
                tracing::debug!(project_id, generation, page, "Background pagination superseded");
                return;
            }

            let response = match self
                .api
                .fetch_project_tasks(project_id, page, self.page_size)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(project_id, page, error = %e, "Failed to fetch remaining tasks");
                    self.update(|s| s.tasks.finish_loading_more(generation, Some(e.to_string())));
                    return;
                }
            };

            let received = response.tasks.len();
            let has_next = response.has_next && received > 0;
            let next_page = has_next.then_some(page + 1);
            let merged = self.update(|s| {
                let added = s.tasks.append_tasks(generation, with_derived_ids(response.tasks))?;
                s.tasks.set_next_page(generation, next_page);
                Some(added)
            });
            let Some(added) = merged else {
                tracing::debug!(project_id, generation, page, "Dropping page for superseded load");
                return;
            };
            added_total += added;
            tracing::debug!(project_id, page, received, added, "Merged task page");

            if !has_next {
                if received == 0 && response.has_next {
                    tracing::warn!(project_id, page, "Empty page reported has_next; stopping");
                }
                break;
            }
            page += 1;
        }

        self.update(|s| s.tasks.finish_loading_more(generation, None));
        tracing::info!(project_id, added = added_total, last_page = page, "Finished loading remaining tasks");
    }

    /// Mark a task rejected. Local only; false if the id is unknown.
    pub fn reject_task(&self, task_id: &str) -> bool {
        self.update(|s| s.tasks.reject_task(task_id, Utc::now()))
    }

    /// Append a clip to a task. Local only; false if the id is unknown.
    pub fn attach_clip(&self, task_id: &str, clip: Clip) -> bool {
        self.update(|s| s.tasks.attach_clip(task_id, clip))
    }

    /// First phase of clip creation: persist the clip on the server.
    pub async fn create_clip(&self, request: &CreateClipRequest) -> Result<CreateClipResponse> {
        tracing::info!(title = %request.title, start = %request.start, end = %request.end, "Creating clip");
        let response = self.api.create_snippet(request).await?;
        tracing::info!(
            asset_id = response.canva_asset_id.as_deref().unwrap_or(""),
            message = %response.message,
            "Clip created"
        );
        Ok(response)
    }

    /// Second phase of clip creation: mirror the confirmed clip into the cache.
    ///
    /// Returns false, without error, if the task is no longer cached.
    pub fn apply_clip_locally(
        &self,
        task_id: &str,
        request: &CreateClipRequest,
        _response: &CreateClipResponse,
    ) -> bool {
        let clip = Clip {
            title: request.title.clone(),
            start_time: request.start.clone(),
            end_time: request.end.clone(),
            created_at: Utc::now(),
        };
        let applied = self.attach_clip(task_id, clip);
        if !applied {
            tracing::warn!(task_id, "Clip created but task is no longer cached");
        }
        applied
    }

    pub fn clear_tasks(&self) {
        self.update(|s| s.tasks.clear());
    }

    /// Clear both caches.
    pub fn purge(&self) {
        self.update(|s| {
            s.projects.clear();
            s.tasks.clear();
        });
    }
}

fn with_derived_ids(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().map(Task::with_derived_id).collect()
}
