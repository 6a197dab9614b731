//! # podsnips-core
//!
//! Core library for podsnips - a client for reviewing podcast highlight
//! moments and cutting clips from them.
//!
//! This library provides:
//! - Domain types for projects, tasks, clips and transcript segments
//! - An HTTP client for the PodSnips API
//! - The project and task caches, with background pagination
//! - Transcript windowing and video deep links
//! - Persistence of the caches between runs
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use podsnips_core::{ApiClient, Config, StateFile, Store};
//!
//! # async fn run() -> podsnips_core::Result<()> {
//! let config = Config::load()?;
//! let state_file = StateFile::default_location();
//!
//! let store = Store::new(ApiClient::new(&config.api)?, state_file.load());
//! if !store.read(|s| s.tasks.is_cached("project-id")) {
//!     if let Some(remaining) = store.load_project("project-id").await {
//!         let _ = remaining.await;
//!     }
//! }
//! state_file.save(&store.snapshot())?;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use api::{ApiClient, PodSnipsApi};
pub use config::Config;
pub use error::{Error, Result};
pub use persist::StateFile;
pub use store::{AppState, Store};
pub use types::*;

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod persist;
pub mod store;
pub mod transcript;
pub mod types;
