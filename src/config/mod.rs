//! Configuration Management
//!
//! This module resolves the immutable [`Settings`] snapshot a console session
//! runs with.
//!
//! # Configuration Locations
//! - Explicit: `--config <PATH>`
//! - Global: `~/.config/grnsh/config.json` (per-user)
//!
//! # Resolution Precedence
//! 1. Command-line flags (highest priority)
//! 2. Config file
//! 3. Built-in defaults
//!
//! # File Format
//! ```json
//! {
//!   "engine_path": "/usr/local/bin/groonga",
//!   "complete_arguments": true,
//!   "format_select": true,
//!   "history_file": "~/.grnsh_history",
//!   "history_size": 1000
//! }
//! ```
//! Every field is optional; a missing file is an empty configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::EngineCommand;
use crate::error::{GrnshError, Result};

/// Engine executable used when none is configured
pub const DEFAULT_ENGINE: &str = "groonga";

/// History file name, placed in the home directory
pub const HISTORY_FILE_NAME: &str = ".grnsh_history";

/// Number of history entries kept
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Config file contents (every field optional)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Engine executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_path: Option<PathBuf>,

    /// Offer argument names for bare words too
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_arguments: Option<bool>,

    /// Render select results as row records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_select: Option<bool>,

    /// History file (a leading `~/` is expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Number of history entries kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_size: Option<usize>,
}

/// Values given on the command line
///
/// Flags can only switch features on; they never switch off what the config
/// file enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub engine_path: Option<PathBuf>,
    pub complete_arguments: bool,
    pub format_select: bool,
    pub history_file: Option<PathBuf>,
}

/// Immutable configuration snapshot of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Engine executable
    pub engine_path: PathBuf,

    /// Database handed to the engine
    pub database_path: PathBuf,

    /// Offer argument names for bare words too
    pub complete_arguments: bool,

    /// Render select results as row records
    pub format_select: bool,

    /// Persisted line history
    pub history_file: PathBuf,

    /// Number of history entries kept
    pub history_size: usize,
}

impl Settings {
    /// Merge command-line overrides over the config file over defaults
    ///
    /// # Errors
    /// `ConfigError` if no history file is configured and the home directory
    /// cannot be determined.
    pub fn resolve(
        database_path: impl Into<PathBuf>,
        overrides: Overrides,
        file: FileConfig,
    ) -> Result<Self> {
        let history_file = match overrides.history_file.or(file.history_file) {
            Some(path) => expand_home(&path)?,
            None => default_history_path()?,
        };

        Ok(Self {
            engine_path: overrides
                .engine_path
                .or(file.engine_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE)),
            database_path: database_path.into(),
            complete_arguments: overrides.complete_arguments
                || file.complete_arguments.unwrap_or(false),
            format_select: overrides.format_select || file.format_select.unwrap_or(false),
            history_file,
            history_size: file.history_size.unwrap_or(DEFAULT_HISTORY_SIZE),
        })
    }

    /// Launch command for the engine
    #[must_use]
    pub fn engine_command(&self) -> EngineCommand {
        EngineCommand::new(&self.engine_path, &self.database_path)
    }
}

/// Get path to the global config file (`~/.config/grnsh/config.json`)
pub fn global_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| GrnshError::config_error("Could not determine user config directory"))?;

    Ok(config_dir.join("grnsh").join("config.json"))
}

/// Get path to the default history file (`~/.grnsh_history`)
pub fn default_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GrnshError::config_error("Could not determine home directory"))?;

    Ok(home.join(HISTORY_FILE_NAME))
}

/// Replace a leading `~` component with the home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| GrnshError::config_error("Could not determine home directory"))?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Load a config file
///
/// A missing file is an empty configuration.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| GrnshError::config_error(format!("Could not read config file: {e}")))?;

    serde_json::from_str(&contents)
        .map_err(|e| GrnshError::config_error(format!("Invalid config file format: {e}")))
}

/// Load the explicit config file if given, the global one otherwise
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(GrnshError::config_error(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            load_file_config(path)
        }
        None => load_file_config(&global_config_path()?),
    }
}
