use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Section requested from `workspace/configuration` unless overridden
pub const DEFAULT_CONFIG_SECTION: &str = "compiler-lsp";

/// Default cap on the number of diagnostics published for one document
pub const DEFAULT_MAX_NUMBER_OF_PROBLEMS: usize = 100;

pub const DEFAULT_NUM_REQUEST_THREADS: usize = 4;

pub const DEFAULT_NUM_WORKER_THREADS: usize = 4;

/// Returns the path to the data directory for compiler-lsp.
/// Uses $XDG_DATA_HOME/compiler-lsp if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/compiler-lsp,
/// or ./compiler-lsp if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("compiler-lsp.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("compiler-lsp")
}

/// Workspace settings as sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub max_number_of_problems: usize,
    pub compiler: CompilerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_number_of_problems: DEFAULT_MAX_NUMBER_OF_PROBLEMS,
            compiler: CompilerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Flags prepended to the document path when deriving compiler options
    pub flags: Vec<String>,
}

impl ServerConfig {
    /// Extracts settings from a `didChangeConfiguration` or
    /// `initializationOptions` payload.
    ///
    /// Accepts either `{ "<section>": { ... } }` or the settings object
    /// itself. Returns `Ok(None)` when the payload carries nothing usable.
    pub fn from_settings(settings: &Value, section: &str) -> serde_json::Result<Option<Self>> {
        let value = match settings.get(section) {
            Some(value) => value,
            None if settings.is_object() => settings,
            None => return Ok(None),
        };

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value.clone()).map(Some)
    }
}

/// Options fixed for the lifetime of the server process
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub config_section: String,
    pub defaults: ServerConfig,
    pub num_request_threads: usize,
    pub num_worker_threads: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config_section: DEFAULT_CONFIG_SECTION.to_string(),
            defaults: ServerConfig::default(),
            num_request_threads: DEFAULT_NUM_REQUEST_THREADS,
            num_worker_threads: DEFAULT_NUM_WORKER_THREADS,
        }
    }
}
