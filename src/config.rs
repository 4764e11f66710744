//! Session configuration loaded from TOML.

use crate::games::puzzles::{LevelCatalog, SessionSettings};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for a play session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Pause between a level's last correct answer and the next stage.
    #[serde(default = "default_settle_delay_ms")]
    settle_delay_ms: u64,

    /// Keep image overrides when the session is reset.
    #[serde(default = "default_retain_overrides")]
    retain_overrides_on_reset: bool,

    /// Optional catalog definition; the built-in catalog when absent.
    #[serde(default)]
    catalog: Option<PathBuf>,
}

fn default_settle_delay_ms() -> u64 {
    1500
}

fn default_retain_overrides() -> bool {
    true
}

impl GameConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            retain_overrides_on_reset: default_retain_overrides(),
            catalog: None,
        }
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// A relative catalog path is resolved against the config file's
    /// directory.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(catalog) = &config.catalog
            && catalog.is_relative()
            && let Some(dir) = path.as_ref().parent()
        {
            config.catalog = Some(dir.join(catalog));
        }

        info!(settle_delay_ms = config.settle_delay_ms, "Config loaded successfully");
        Ok(config)
    }

    /// The settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Session settings derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            retain_overrides_on_reset: self.retain_overrides_on_reset,
        }
    }

    /// Loads the configured catalog, or the built-in one.
    #[instrument(skip(self), fields(catalog = ?self.catalog))]
    pub fn load_catalog(&self) -> Result<LevelCatalog, ConfigError> {
        match &self.catalog {
            Some(path) => LevelCatalog::from_file(path)
                .map_err(|e| ConfigError::new(format!("Failed to load catalog: {}", e))),
            None => {
                debug!("Using built-in catalog");
                Ok(LevelCatalog::builtin())
            }
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
