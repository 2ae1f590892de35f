//! Configuration loading for the writing desk.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the desk can still open.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    /// Directory holding the durable storage slots.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Directory holding the advisory query cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_catalog_path")]
    pub shelf_catalog_path: String,
    #[serde(default = "default_kindle_notes_path")]
    pub shelf_kindle_notes_path: String,
    #[serde(default = "default_remote_endpoint")]
    pub remote_endpoint: String,
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,
    #[serde(default = "default_assistant_base_url")]
    pub assistant_base_url: String,
    /// Name of the environment variable carrying the assistant API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Quiet period, in milliseconds, between the last store mutation and the
    /// debounced autosave write.
    #[serde(default = "default_autosave_quiet_ms")]
    pub autosave_quiet_ms: u64,
    #[serde(default = "default_word_goal")]
    pub default_word_goal: u64,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
            shelf_catalog_path: default_catalog_path(),
            shelf_kindle_notes_path: default_kindle_notes_path(),
            remote_endpoint: default_remote_endpoint(),
            assistant_model: default_assistant_model(),
            assistant_base_url: default_assistant_base_url(),
            api_key_env: default_api_key_env(),
            autosave_quiet_ms: default_autosave_quiet_ms(),
            default_word_goal: default_word_goal(),
            log_level: default_log_level(),
        }
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

fn default_catalog_path() -> String {
    "shelf/livros-catalogo.md".to_string()
}

fn default_kindle_notes_path() -> String {
    "shelf/NOTAS KINDLE.md".to_string()
}

fn default_remote_endpoint() -> String {
    "http://localhost:3001/api/save".to_string()
}

fn default_assistant_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_assistant_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_autosave_quiet_ms() -> u64 {
    1000
}

fn default_word_goal() -> u64 {
    1000
}

fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
