//! Shared types, error model, and configuration for Forager.
//!
//! This crate is the foundation depended on by all other Forager crates.
//! It provides:
//! - [`ForagerError`] — the unified error type
//! - Domain types ([`Goal`], [`Category`], [`Record`], [`SearchHit`], [`RunId`])
//! - The run-state aggregate ([`RunState`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod state;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PlannerConfig, RunConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{ForagerError, Result};
pub use state::{DEFAULT_TARGET_COUNT, RunState};
pub use types::{Category, Goal, GoalStatus, Record, RunId, SearchHit};
