//! Engine configuration
//!
//! Loaded from a YAML file (`inquiry.yaml`), with every field optional. The
//! storage directory can also be overridden with `INQUIRY_STORAGE_DIR`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the storage directory
pub const STORAGE_DIR_ENV: &str = "INQUIRY_STORAGE_DIR";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the inquiry engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Field delimiter for BOM imports
    pub delimiter: char,

    /// Manufacturer recorded for imported rows that do not name one
    pub manufacturer_placeholder: String,

    /// Prefix for human-readable inquiry numbers
    pub inquiry_number_prefix: String,

    /// Days between submission and expiry
    pub expiry_days: i64,

    /// Maximum number of saved company templates
    pub max_company_templates: usize,

    /// Maximum number of favorite products
    pub max_favorite_products: usize,

    /// Save the active draft to the drafts collection after each change
    pub autosave_drafts: bool,

    /// Directory for the JSON file store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            manufacturer_placeholder: "pending confirmation".to_string(),
            inquiry_number_prefix: "INQ".to_string(),
            expiry_days: 30,
            max_company_templates: 5,
            max_favorite_products: 10,
            autosave_drafts: true,
            storage_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            Self::from_yaml(&contents).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: path.to_path_buf(),
                    message,
                },
                other => other,
            })?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.storage_dir = Some(PathBuf::from(dir));
            }
        }

        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_yml::from_str(contents).map_err(|e| ConfigError::Parse {
                path: PathBuf::new(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(ConfigError::Invalid(format!(
                "delimiter must be a single ASCII character other than a line break, got {:?}",
                self.delimiter
            )));
        }
        if self.expiry_days <= 0 {
            return Err(ConfigError::Invalid(
                "expiry_days must be positive".to_string(),
            ));
        }
        if self.max_company_templates == 0 || self.max_favorite_products == 0 {
            return Err(ConfigError::Invalid(
                "collection capacities must be at least 1".to_string(),
            ));
        }
        if self.inquiry_number_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "inquiry_number_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory the JSON store should use: the configured one, or the
    /// platform data directory
    pub fn resolved_storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir.clone().or_else(Self::default_storage_dir)
    }

    /// Platform-specific data directory (e.g. `~/.local/share/inquiry`)
    pub fn default_storage_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "inquiry").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
