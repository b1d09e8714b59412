//! Application configuration for Forager.
//!
//! User config lives at `~/.forager/forager.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ForagerError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "forager.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".forager";

// ---------------------------------------------------------------------------
// Config structs (matching forager.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Planning service settings.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Search provider and fetch settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Target result count when the planner cannot determine one.
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Maximum rounds before a run fails.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// How many unattempted queries a round picks up.
    #[serde(default = "default_queries_per_round")]
    pub queries_per_round: usize,

    /// Maximum raw hits requested per search call.
    #[serde(default = "default_results_per_search")]
    pub results_per_search: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            max_iterations: default_max_iterations(),
            queries_per_round: default_queries_per_round(),
            results_per_search: default_results_per_search(),
        }
    }
}

fn default_target_count() -> usize {
    10
}
fn default_max_iterations() -> usize {
    5
}
fn default_queries_per_round() -> usize {
    3
}
fn default_results_per_search() -> usize {
    5
}

/// `[planner]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID for planning/analysis calls.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions endpoint URL.
    #[serde(default = "default_planner_endpoint")]
    pub endpoint: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_planner_endpoint(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "meta-llama/llama-3.3-70b-instruct".into()
}
fn default_planner_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SearXNG-compatible search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// HTTP timeout for search and fetch calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// [min, max] ms pacing delay between per-URL fetches.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: [u64; 2],

    /// [min, max] ms pacing delay between per-query searches.
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: [u64; 2],
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            timeout_secs: default_timeout_secs(),
            fetch_delay_ms: default_fetch_delay_ms(),
            search_delay_ms: default_search_delay_ms(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://searx.be/search".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_fetch_delay_ms() -> [u64; 2] {
    [1000, 2000]
}
fn default_search_delay_ms() -> [u64; 2] {
    [2000, 4000]
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime run configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Result target when the planner cannot determine one.
    pub target_count: usize,
    /// Maximum rounds before the run fails.
    pub max_iterations: usize,
    /// Unattempted queries picked up per round.
    pub queries_per_round: usize,
    /// Maximum raw hits per search call.
    pub results_per_search: usize,
    /// [min, max] ms pacing between per-URL fetches. `[0, 0]` disables.
    pub fetch_delay_ms: [u64; 2],
    /// [min, max] ms pacing between per-query searches. `[0, 0]` disables.
    pub search_delay_ms: [u64; 2],
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            target_count: config.defaults.target_count,
            max_iterations: config.defaults.max_iterations,
            queries_per_round: config.defaults.queries_per_round,
            results_per_search: config.defaults.results_per_search,
            fetch_delay_ms: config.search.fetch_delay_ms,
            search_delay_ms: config.search.search_delay_ms,
        }
    }
}

impl RunConfig {
    /// A pacing-free config for tests and scripted runs.
    pub fn without_delays(mut self) -> Self {
        self.fetch_delay_ms = [0, 0];
        self.search_delay_ms = [0, 0];
        self
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.forager/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ForagerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.forager/forager.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ForagerError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ForagerError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ForagerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ForagerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ForagerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the planner API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.planner.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(ForagerError::config(format!(
            "planner API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("target_count"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_iterations, 5);
        assert_eq!(parsed.defaults.target_count, 10);
        assert_eq!(parsed.planner.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(parsed.search.fetch_delay_ms, [1000, 2000]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_iterations = 8

[search]
endpoint = "http://localhost:8888/search"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_iterations, 8);
        assert_eq!(config.defaults.queries_per_round, 3);
        assert_eq!(config.search.endpoint, "http://localhost:8888/search");
        assert_eq!(config.search.search_delay_ms, [2000, 4000]);
    }

    #[test]
    fn run_config_from_app_config() {
        let app = AppConfig::default();
        let run = RunConfig::from(&app);
        assert_eq!(run.target_count, 10);
        assert_eq!(run.max_iterations, 5);
        assert_eq!(run.queries_per_round, 3);
        assert_eq!(run.results_per_search, 5);

        let quiet = run.without_delays();
        assert_eq!(quiet.fetch_delay_ms, [0, 0]);
        assert_eq!(quiet.search_delay_ms, [0, 0]);
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.planner.api_key_env = "FORAGER_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
