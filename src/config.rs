//! Configuration management for Scribe
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::chat::DEFAULT_MODEL;
use crate::error::{Result, ScribeError};
use crate::storage::StoreLocation;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Scribe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the notes and chat databases live
    #[serde(default)]
    pub storage: StorageConfig,
    /// Completion endpoint settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the databases; the platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the directory the stores are opened in
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::StorageUnavailable` if no data directory is
    /// configured and the platform one cannot be determined
    pub fn location(&self) -> Result<StoreLocation> {
        if let Some(dir) = &self.data_dir {
            return Ok(StoreLocation::Directory(dir.clone()));
        }
        let proj_dirs = ProjectDirs::from("com", "scribe", "scribe").ok_or_else(|| {
            ScribeError::StorageUnavailable("Could not determine data directory".into())
        })?;
        Ok(StoreLocation::Directory(proj_dirs.data_dir().to_path_buf()))
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used until one is chosen in settings
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            default_model: default_model(),
            timeout_seconds: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars()?;
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScribeError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ScribeError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(data_dir) = std::env::var("SCRIBE_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(data_dir));
        }

        if let Ok(api_base) = std::env::var("SCRIBE_API_BASE") {
            self.chat.api_base = api_base;
        }

        if let Ok(model) = std::env::var("SCRIBE_DEFAULT_MODEL") {
            self.chat.default_model = model;
        }

        if let Ok(timeout) = std::env::var("SCRIBE_TIMEOUT_SECONDS") {
            let seconds = timeout.parse::<u64>().map_err(|_| {
                ScribeError::Config(format!("Invalid SCRIBE_TIMEOUT_SECONDS value: {}", timeout))
            })?;
            self.chat.timeout_seconds = Some(seconds);
        }

        Ok(())
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(dir) = &cli.data_dir {
            tracing::debug!("Using data directory override from CLI: {}", dir.display());
            self.storage.data_dir = Some(dir.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let api_base = self.chat.api_base.trim();
        if api_base.is_empty() {
            return Err(ScribeError::Config("chat.api_base cannot be empty".to_string()).into());
        }

        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ScribeError::Config(format!(
                "chat.api_base must be an http(s) URL: {}",
                api_base
            ))
            .into());
        }

        if self.chat.default_model.trim().is_empty() {
            return Err(
                ScribeError::Config("chat.default_model cannot be empty".to_string()).into(),
            );
        }

        if self.chat.timeout_seconds == Some(0) {
            return Err(ScribeError::Config(
                "chat.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
