//! Configuration management for Workbook Publisher
//!
//! Handles locating and loading application configuration.
//! Configuration is kept as JSON in `<config_dir>/<APP_ID>/config.json`.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.kdp.WorkbookPublisher";

/// Key the workspace snapshot is stored under
pub const STORAGE_KEY: &str = "kdpWorkbookEditorWorkspaceState";

/// How long a transient notification stays visible, in milliseconds
pub const NOTIFICATION_DURATION_MS: u64 = 2500;

/// Number of pages drawn in the layout preview
pub const PREVIEW_PAGE_COUNT: usize = 3;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the workspace snapshot lives
    pub storage: StorageConfig,

    /// Export output settings
    pub export: ExportConfig,

    /// UI configuration
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the config directory or return defaults
    pub fn load() -> ConfigResult<Self> {
        Self::load_from_dir(Self::config_dir().ok().as_deref())
    }

    /// Load `config.json` from `dir`; no directory gives defaults
    pub fn load_from_dir(dir: Option<&Path>) -> ConfigResult<Self> {
        match dir {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE_NAME)),
            None => {
                log::debug!("No configuration directory on this system, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from `path`; a missing file gives defaults
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No configuration at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::LoadError(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Directory the file-backed storage uses
    pub fn storage_dir(&self) -> ConfigResult<PathBuf> {
        match &self.storage.directory {
            Some(dir) => Ok(dir.clone()),
            None => Self::data_dir().map(|p| p.join("storage")),
        }
    }

    /// Directory export payloads are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory, the platform data directory when unset
    pub directory: Option<PathBuf>,

    /// Key the workspace snapshot is stored under
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: None,
            key: STORAGE_KEY.to_string(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory, the working directory when unset
    pub directory: Option<PathBuf>,

    /// Pretty-print written payloads
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            pretty: true,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Transient notification lifetime in milliseconds
    pub notification_duration_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_duration_ms: NOTIFICATION_DURATION_MS,
        }
    }
}
