//! Plain-text rendering of the list, project and task views.

use podsnips_core::store::TasksState;
use podsnips_core::transcript::{build_video_url, seconds_to_time, select_window, time_to_seconds};
use podsnips_core::{Project, Task};

/// Truncate to `max` characters, adding an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

pub fn task_status(task: &Task) -> &'static str {
    if task.rejected {
        "rejected"
    } else if !task.clips.is_empty() {
        "clipped"
    } else {
        "pending"
    }
}

pub fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    println!(
        "{:<36} {:<24} {:<40} {:>5}  {}",
        "ID", "Show", "Episode", "Snips", "Status"
    );
    println!("{:-<120}", "");
    for project in projects {
        println!(
            "{:<36} {:<24} {:<40} {:>5}  {}",
            truncate(&project.id, 36),
            truncate(&project.podcast_show, 24),
            truncate(&project.episode, 40),
            project
                .snips
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            project.status
        );
    }
    println!();
    println!("{} project(s)", projects.len());
}

pub fn print_project_header(project_id: &str, project: Option<&Project>) {
    match project {
        Some(project) => {
            println!("{}", project.episode);
            if !project.podcast_show.is_empty() {
                println!("Show:    {}", project.podcast_show);
            }
            if let Some(number) = project.episode_number {
                println!("Episode: #{number}");
            }
            if let Some(created) = &project.created_date {
                println!("Created: {created}");
            }
            println!("Status:  {}", project.status);
        }
        None => println!("Project {project_id}"),
    }
    println!();
}

pub fn print_tasks(tasks: &TasksState) {
    if tasks.tasks().is_empty() {
        println!("No tasks found for this project.");
        return;
    }

    println!("{:>3}  {:<10} {:<9} {}", "#", "Time", "Status", "Title");
    println!("{:-<80}", "");
    for (i, task) in tasks.tasks().iter().enumerate() {
        println!(
            "{:>3}  {:<10} {:<9} {}",
            i + 1,
            task.timestamp,
            task_status(task),
            truncate(task.display_title(), 56)
        );
    }
    println!();

    let rejected = tasks.tasks().iter().filter(|t| t.rejected).count();
    let clipped = tasks.tasks().iter().filter(|t| !t.clips.is_empty()).count();
    println!(
        "{} task(s), {} clipped, {} rejected",
        tasks.tasks().len(),
        clipped,
        rejected
    );
    if let Some(error) = tasks.loading_more_error() {
        println!("Some tasks could not be loaded: {error}");
        println!("Run the command again to load the rest, or pass --refresh to reload.");
    } else if !tasks.is_complete() {
        println!("More tasks are available; run the command again to load the rest.");
    }
}

pub fn print_task(tasks: &TasksState, task: &Task, before_secs: f64, after_secs: f64) {
    println!("{}", task.display_title());
    if !task.timestamp.is_empty() {
        println!("[{}]", task.timestamp);
    }
    println!();

    if !task.summary.is_empty() {
        println!("Summary");
        println!("-------");
        println!("{}", task.summary);
        println!();
    }

    let transcript = tasks.transcript().unwrap_or_default();
    let window = select_window(transcript, &task.timestamp, before_secs, after_secs);
    println!("Transcript");
    println!("----------");
    if window.is_empty() {
        println!("No transcript available around this moment.");
    } else {
        for segment in window {
            println!("{}  {}", seconds_to_time(segment.start), segment.text.trim());
        }
    }
    println!();

    let start = time_to_seconds(&task.timestamp) as f64;
    if let Some(url) = build_video_url(tasks.video_id(), Some(start)) {
        println!("Watch:  {url}");
    }

    if task.rejected {
        let at = task
            .rejected_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        println!("Status: rejected ({at})");
    } else if let Some(clip) = task.primary_clip() {
        println!(
            "Clip:   {} ({} - {}, created {})",
            clip.title,
            clip.start_time,
            clip.end_time,
            clip.created_at.format("%Y-%m-%d %H:%M")
        );
    } else {
        println!("Status: pending");
    }
}
