use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Nothing listens here; commands served from the cache never connect.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api/v1";

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn state_path(&self) -> PathBuf {
        self.xdg_data.join("podsnips/state.json")
    }

    fn seed_state(&self) {
        let blob = serde_json::json!({
            "version": 1,
            "root": "podsnips",
            "projects": {
                "items": [{
                    "id": "p1",
                    "episode": "How Habits Stick",
                    "status": "Not started",
                    "podcast_show": "Deep Dives",
                    "snips": 2
                }]
            },
            "tasks": {
                "tasks": [
                    {
                        "id": "00:01:40",
                        "timestamp": "00:01:40",
                        "title": "The hook",
                        "summary": "Why the first minute matters",
                        "clips": [],
                        "rejected": false
                    },
                    {
                        "id": "00:05:00",
                        "timestamp": "00:05:00",
                        "title": "Closing thought",
                        "summary": "",
                        "clips": [],
                        "rejected": false
                    }
                ],
                "current_project_id": "p1",
                "transcript": [
                    {"start": 300.0, "duration": 4.0, "text": "and that's a wrap"},
                    {"start": 90.0, "duration": 6.0, "text": "we talk about the hook"},
                    {"start": 10.0, "duration": 5.0, "text": "welcome back"}
                ],
                "video_id": "abc123"
            }
        });

        let path = self.state_path();
        fs::create_dir_all(path.parent().expect("missing state parent"))
            .expect("failed to create data dir");
        fs::write(&path, serde_json::to_vec_pretty(&blob).expect("failed to encode blob"))
            .expect("failed to seed state");
    }

    /// Seed a cache whose pagination stopped after page 1.
    fn seed_partial_state(&self) {
        self.seed_state();
        let mut state = self.read_state();
        state["tasks"]["next_page"] = serde_json::json!(2);
        fs::write(
            self.state_path(),
            serde_json::to_vec_pretty(&state).expect("failed to encode blob"),
        )
        .expect("failed to rewrite state");
    }

    fn read_state(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.state_path()).expect("failed to read state");
        serde_json::from_str(&content).expect("state is not JSON")
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("podsnips"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env("PODSNIPS_API_URL", UNREACHABLE_API)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute podsnips: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "podsnips {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout_of(env: &CliTestEnv, args: &[&str]) -> String {
    let output = run_bin(env, args);
    assert_success(args, &output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn projects_are_served_from_cache() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["projects"]);
    assert!(stdout.contains("How Habits Stick"), "got:\n{stdout}");
    assert!(stdout.contains("Deep Dives"));
    assert!(stdout.contains("1 project(s)"));
}

#[test]
fn project_view_lists_cached_tasks() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["project", "p1"]);
    assert!(stdout.contains("How Habits Stick"));
    assert!(stdout.contains("The hook"));
    assert!(stdout.contains("Closing thought"));
    assert!(stdout.contains("2 task(s), 0 clipped, 0 rejected"));
}

#[test]
fn task_view_shows_transcript_window_and_link() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["task", "p1", "00:01:40"]);
    assert!(stdout.contains("The hook"));
    assert!(stdout.contains("Why the first minute matters"));
    assert!(stdout.contains("00:01:30  we talk about the hook"), "got:\n{stdout}");
    assert!(!stdout.contains("welcome back"));
    assert!(!stdout.contains("that's a wrap"));
    assert!(stdout.contains("https://www.youtube.com/watch?v=abc123&t=100s"));
}

#[test]
fn unknown_task_renders_empty_state() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["task", "p1", "99:99"]);
    assert!(stdout.contains("Task not found"));
}

#[test]
fn reject_is_persisted() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["reject", "p1", "00:05:00"]);
    assert!(stdout.contains("Rejected task 00:05:00"));

    let state = env.read_state();
    assert_eq!(state["version"], 1);
    let tasks = state["tasks"]["tasks"].as_array().expect("tasks array");
    let closing = tasks
        .iter()
        .find(|t| t["id"] == "00:05:00")
        .expect("task kept");
    assert_eq!(closing["rejected"], true);
    assert!(closing.get("rejectedAt").is_some());

    let stdout = stdout_of(&env, &["project", "p1"]);
    assert!(stdout.contains("rejected"));
}

#[test]
fn clip_without_title_is_refused() {
    let env = CliTestEnv::new();
    env.seed_state();

    let args = ["clip", "p1", "00:01:40", "--title", "  "];
    let output = run_bin(&env, &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a clip needs a title"), "got:\n{stderr}");
}

#[test]
fn failed_load_keeps_stale_cache() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["project", "p2"]);
    assert!(stdout.contains("Failed to load tasks"), "got:\n{stdout}");

    let state = env.read_state();
    assert_eq!(state["tasks"]["current_project_id"], "p1");
    assert_eq!(state["tasks"]["tasks"].as_array().map(Vec::len), Some(2));
    assert!(state["tasks"]["error"].is_string());
}

#[test]
fn purge_removes_state() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["purge"]);
    assert!(stdout.contains("Cleared cached projects and tasks."));
    assert!(!env.state_path().exists());

    let stdout = stdout_of(&env, &["status"]);
    assert!(stdout.contains("PodSnips Configuration"));
    assert!(stdout.contains("Cached tasks:  none"));
    assert!(stdout.contains(UNREACHABLE_API));
}

#[test]
fn partial_cache_resumes_paging_instead_of_counting_as_loaded() {
    let env = CliTestEnv::new();
    env.seed_partial_state();

    // the cached page is shown, and the missing page is requested (and fails here)
    let stdout = stdout_of(&env, &["project", "p1"]);
    assert!(stdout.contains("The hook"), "got:\n{stdout}");
    assert!(stdout.contains("Some tasks could not be loaded"), "got:\n{stdout}");
    assert!(stdout.contains("Run the command again to load the rest"));

    let state = env.read_state();
    assert_eq!(state["tasks"]["next_page"], 2);
    assert!(state["tasks"]["loading_more_error"].is_string());
    assert_eq!(state["tasks"]["tasks"].as_array().map(Vec::len), Some(2));
}

#[test]
fn complete_cache_makes_no_requests() {
    let env = CliTestEnv::new();
    env.seed_state();

    let stdout = stdout_of(&env, &["project", "p1"]);
    assert!(!stdout.contains("could not be loaded"), "got:\n{stdout}");
    assert!(!stdout.contains("More tasks are available"));
    assert!(env.read_state()["tasks"]["loading_more_error"].is_null());
}

#[test]
fn startup_messages_reach_the_log_file() {
    let env = CliTestEnv::new();

    stdout_of(&env, &["status"]);

    let log_dir = env.xdg_state.join("podsnips");
    let logs: String = fs::read_dir(&log_dir)
        .expect("log dir missing")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("podsnips.log"))
        .map(|entry| fs::read_to_string(entry.path()).unwrap_or_default())
        .collect();
    assert!(logs.contains("No config file found, using defaults"), "got:\n{logs}");
    assert!(logs.contains(UNREACHABLE_API));
}
