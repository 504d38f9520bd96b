// packages/engine/src/utils/config.rs
//! Engine configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! config file, then `SENTRA__`-prefixed environment variables
//! (e.g. `SENTRA__LOGGING__LEVEL=debug`).

use crate::utils::errors::{EngineError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default config file stem looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "sentra-intercept";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SENTRA_CONFIG";

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub interception: InterceptionConfig,

    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A single configured interception: capability path to named handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptionRule {
    /// Capability path, e.g. `openai:OpenAI().chat.completions.create`
    pub path: String,

    /// Name of a handler in the handler registry
    pub handler: String,
}

/// Interception configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptionConfig {
    /// Install the resolver hook at startup
    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<InterceptionRule>,
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
        }
    }
}

/// Call recording configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Bounded queue capacity (events)
    pub queue_capacity: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) => Self::build(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        }
    }

    /// Load configuration from an explicit file (format from extension)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        Self::build(File::from(path.to_path_buf()).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();

        let config: EngineConfig = Config::builder()
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .set_default("interception.enabled", defaults.interception.enabled)?
            .set_default(
                "recording.queue_capacity",
                defaults.recording.queue_capacity as i64,
            )?
            .add_source(file)
            .add_source(Environment::with_prefix("SENTRA").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.recording.queue_capacity == 0 {
            return Err(EngineError::ConfigError(
                "recording.queue_capacity cannot be 0".to_string(),
            ));
        }

        for rule in &self.interception.rules {
            if rule.handler.trim().is_empty() {
                return Err(EngineError::ConfigError(format!(
                    "Interception rule for '{}' has no handler",
                    rule.path
                )));
            }
        }

        Ok(())
    }
}
