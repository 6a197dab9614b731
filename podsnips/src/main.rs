//! podsnips - review podcast highlight tasks and cut clips from the terminal
//!
//! Views:
//! - `projects`: the project list
//! - `project <id>`: a project's tasks
//! - `task <id> <task>`: one task with the transcript around it
//!
//! Cached projects and tasks (including local rejections and clips) persist
//! between runs in `$XDG_DATA_HOME/podsnips/state.json`; `purge` drops them.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/podsnips/config.toml (~/.config/podsnips/config.toml)
//! - Logs: $XDG_STATE_HOME/podsnips/podsnips.log (~/.local/state/podsnips/podsnips.log)

mod render;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use podsnips_core::api::CreateClipRequest;
use podsnips_core::transcript::{clip_bounds, DEFAULT_AFTER_SECS, DEFAULT_BEFORE_SECS};
use podsnips_core::{ApiClient, Config, Project, StateFile, Store};
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "podsnips")]
#[command(about = "Review podcast highlight tasks and cut clips")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects
    Projects {
        /// Fetch from the server even if projects are cached
        #[arg(short, long)]
        refresh: bool,
    },

    /// Show a project's tasks
    Project {
        project_id: String,

        /// Fetch from the server even if the project is cached
        #[arg(short, long)]
        refresh: bool,

        /// Show the first page without waiting for the remaining pages
        #[arg(long)]
        no_wait: bool,
    },

    /// Show a task with the transcript around it
    Task {
        project_id: String,
        task_id: String,

        /// Seconds of transcript before the task
        #[arg(long, default_value_t = DEFAULT_BEFORE_SECS)]
        before: f64,

        /// Seconds of transcript after the task
        #[arg(long, default_value_t = DEFAULT_AFTER_SECS)]
        after: f64,
    },

    /// Reject a task
    Reject { project_id: String, task_id: String },

    /// Create a clip from a task
    Clip {
        project_id: String,
        task_id: String,

        /// Clip title
        #[arg(short, long)]
        title: String,

        /// Seconds before the task timestamp where the clip starts
        #[arg(long, default_value_t = DEFAULT_BEFORE_SECS)]
        before: f64,

        /// Seconds after the task timestamp where the clip ends
        #[arg(long, default_value_t = DEFAULT_AFTER_SECS)]
        after: f64,
    },

    /// Clear all cached projects and tasks
    Purge,

    /// Check that the API is reachable
    Health,

    /// Show configuration and cache status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        podsnips_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("podsnips starting");
    let config_path = Config::config_path();
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loaded config file");
    } else {
        tracing::info!(path = %config_path.display(), "No config file found, using defaults");
    }
    tracing::info!(api_url = %config.api.base_url, "Using API");

    let state_file = StateFile::default_location();
    let client = ApiClient::new(&config.api).context("failed to create API client")?;
    let store = Store::new(client, state_file.load()).with_page_size(config.api.page_size);

    let persist = match args.command {
        Command::Projects { refresh } => cmd_projects(&store, refresh).await,
        Command::Project {
            project_id,
            refresh,
            no_wait,
        } => cmd_project(&store, &project_id, refresh, !no_wait).await,
        Command::Task {
            project_id,
            task_id,
            before,
            after,
        } => cmd_task(&store, &project_id, &task_id, before, after).await,
        Command::Reject {
            project_id,
            task_id,
        } => cmd_reject(&store, &project_id, &task_id).await,
        Command::Clip {
            project_id,
            task_id,
            title,
            before,
            after,
        } => cmd_clip(&store, &project_id, &task_id, &title, before, after).await,
        Command::Purge => cmd_purge(&store, &state_file),
        Command::Health => cmd_health(&store).await,
        Command::Status => cmd_status(&config, &store, &state_file),
    }?;

    if persist {
        state_file
            .save(&store.snapshot())
            .context("failed to save state")?;
    }

    tracing::info!("podsnips done");
    Ok(())
}

/// Make sure the task cache holds `project_id`, loading it when needed.
///
/// A cached but partial list resumes paging from the first missing page.
/// Returns false if the project could not be loaded; the stored error has
/// already been printed.
async fn ensure_project(
    store: &Store<ApiClient>,
    project_id: &str,
    refresh: bool,
    wait: bool,
) -> Result<bool> {
    let remaining = if !refresh && store.read(|s| s.tasks.is_cached(project_id)) {
        tracing::debug!(project_id, "Using cached tasks");
        store.resume_remaining(project_id)
    } else {
        let remaining = store.load_project(project_id).await;

        if let Some(error) = store.read(|s| s.tasks.error().map(str::to_string)) {
            println!("Failed to load tasks: {error}");
            println!("Run the command again to retry.");
            // stale tasks of this project are still usable
            return Ok(store.read(|s| s.tasks.current_project_id() == Some(project_id)));
        }
        remaining
    };

    // without waiting, the loop dies with the process and the next run resumes it
    if let Some(remaining) = remaining {
        if wait {
            wait_for_remaining(store, remaining).await?;
        }
    }

    Ok(true)
}

async fn wait_for_remaining(store: &Store<ApiClient>, mut remaining: JoinHandle<()>) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            joined = &mut remaining => {
                if let Err(e) = joined {
                    tracing::warn!(error = %e, "Background pagination task failed");
                }
                break;
            }
            _ = ticker.tick() => {
                let loaded = store.read(|s| s.tasks.tasks().len());
                spinner.set_message(format!("Loading more tasks... ({loaded} so far)"));
            }
        }
    }

    spinner.finish_and_clear();
    Ok(())
}

async fn cmd_projects(store: &Store<ApiClient>, refresh: bool) -> Result<bool> {
    if refresh || store.read(|s| s.projects.items().is_empty()) {
        store.load_projects().await;
    }

    store.read(|s| {
        if let Some(error) = s.projects.error() {
            println!("Failed to load projects: {error}");
            println!("Run `podsnips projects --refresh` to retry.");
            println!();
        }
        render::print_projects(s.projects.items());
    });

    Ok(true)
}

async fn cmd_project(
    store: &Store<ApiClient>,
    project_id: &str,
    refresh: bool,
    wait: bool,
) -> Result<bool> {
    if !ensure_project(store, project_id, refresh, wait).await? {
        return Ok(true);
    }

    let project = match store.read(|s| s.projects.project_by_id(project_id).cloned()) {
        Some(project) => Some(project),
        None => fetch_project_header(store, project_id).await,
    };

    render::print_project_header(project_id, project.as_ref());
    store.read(|s| render::print_tasks(&s.tasks));

    Ok(true)
}

/// Header details for a project missing from the project list cache.
async fn fetch_project_header(store: &Store<ApiClient>, project_id: &str) -> Option<Project> {
    match store.api().fetch_project_details(project_id).await {
        Ok(project) => project,
        Err(e) => {
            tracing::warn!(project_id, error = %e, "Failed to fetch project details");
            None
        }
    }
}

async fn cmd_task(
    store: &Store<ApiClient>,
    project_id: &str,
    task_id: &str,
    before: f64,
    after: f64,
) -> Result<bool> {
    if !ensure_project(store, project_id, false, true).await? {
        return Ok(true);
    }

    store.read(|s| match s.tasks.task_by_id(task_id) {
        Some(task) => render::print_task(&s.tasks, task, before, after),
        None => println!("Task not found"),
    });

    Ok(true)
}

async fn cmd_reject(store: &Store<ApiClient>, project_id: &str, task_id: &str) -> Result<bool> {
    if !ensure_project(store, project_id, false, true).await? {
        return Ok(true);
    }

    if store.reject_task(task_id) {
        println!("Rejected task {task_id}");
    } else {
        println!("Task not found");
    }

    Ok(true)
}

async fn cmd_clip(
    store: &Store<ApiClient>,
    project_id: &str,
    task_id: &str,
    title: &str,
    before: f64,
    after: f64,
) -> Result<bool> {
    if title.trim().is_empty() {
        bail!("a clip needs a title");
    }

    if !ensure_project(store, project_id, false, true).await? {
        return Ok(true);
    }

    let (task, video_id) = store.read(|s| {
        (
            s.tasks.task_by_id(task_id).cloned(),
            s.tasks.video_id().map(str::to_string),
        )
    });

    let Some(task) = task else {
        println!("Task not found");
        return Ok(true);
    };
    if task.rejected {
        println!("Task {task_id} was rejected; not creating a clip.");
        return Ok(true);
    }
    if let Some(clip) = task.primary_clip() {
        println!(
            "Task {task_id} already has a clip: {} ({} - {})",
            clip.title, clip.start_time, clip.end_time
        );
        return Ok(true);
    }
    let Some(video_id) = video_id else {
        bail!("project {project_id} has no source video");
    };

    let (start, end) = clip_bounds(&task.timestamp, before, after);
    let request = CreateClipRequest::new(title, &video_id, start, end);

    let response = store
        .create_clip(&request)
        .await
        .context("failed to create clip")?;

    if !store.apply_clip_locally(task_id, &request, &response) {
        println!("Clip created, but the task is no longer cached.");
    }

    println!("Created clip \"{}\" ({} - {})", request.title, request.start, request.end);
    if !response.message.is_empty() {
        println!("Server: {}", response.message);
    }
    if let Some(asset_id) = &response.canva_asset_id {
        println!("Asset:  {asset_id}");
    }

    Ok(true)
}

fn cmd_purge(store: &Store<ApiClient>, state_file: &StateFile) -> Result<bool> {
    store.purge();
    let removed = state_file.purge().context("failed to purge state")?;

    if removed {
        println!("Cleared cached projects and tasks.");
    } else {
        println!("Nothing to clear.");
    }

    Ok(false)
}

async fn cmd_health(store: &Store<ApiClient>) -> Result<bool> {
    let api = store.api();
    if api.health_check().await? {
        println!("API is healthy ({})", api.base_url());
    } else {
        println!("API is not reachable at {}", api.base_url());
    }
    Ok(false)
}

fn cmd_status(config: &Config, store: &Store<ApiClient>, state_file: &StateFile) -> Result<bool> {
    println!("PodSnips Configuration");
    println!("======================");
    println!();
    println!("Config file:   {}", Config::config_path().display());
    println!("API URL:       {}", config.api.base_url);
    println!("Timeout:       {}s", config.api.timeout_secs);
    println!("Page size:     {}", config.api.page_size);
    println!("Log file:      {}", podsnips_core::logging::log_file_path().display());
    println!();
    println!(
        "State file:    {}{}",
        state_file.path().display(),
        if state_file.exists() { "" } else { " (none)" }
    );

    store.read(|s| {
        println!("Projects:      {}", s.projects.items().len());
        match s.tasks.current_project_id() {
            Some(project_id) => println!(
                "Cached tasks:  {} (project {})",
                s.tasks.tasks().len(),
                project_id
            ),
            None => println!("Cached tasks:  none"),
        }
    });

    Ok(false)
}
