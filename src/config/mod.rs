//! Configuration module for dyndata-rs
//!
//! Evaluator settings live in a TOML file. The file is looked up in this
//! order:
//!
//! 1. The path in the `DYNDATA_CONFIG` environment variable
//! 2. `config.toml` in the platform data directory under `dev.hxyulin.dyndata-rs`
//!
//! - **Linux**: `~/.local/share/dev.hxyulin.dyndata-rs/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.dyndata-rs/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.dyndata-rs\`
//!
//! Missing fields fall back to their defaults, so an empty file is valid.
//!
//! # Example
//!
//! ```toml
//! max_nodes = 64
//! tick_interval_ms = 500
//! log_filter = "info,dyndata_rs=debug"
//! log_dir = "/tmp/dyndata-logs"
//! ```

use crate::error::{DynDataError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.dyndata-rs";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "DYNDATA_CONFIG";

/// Default node budget for one binding
pub const DEFAULT_MAX_NODES: usize = 200;

/// Default interval between platform time ticks
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Resolve the config file path (environment override first).
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .or_else(|| app_data_dir().map(|p| p.join(CONFIG_FILE)))
}

/// Settings for a [`DynamicTypeEvaluator`](crate::pipeline::DynamicTypeEvaluator)
/// and the `dyndata` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum number of nodes a single binding may create
    pub max_nodes: usize,

    /// Interval between platform time ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,

    /// Directory for daily rolling log files; stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            log_filter: "info".to_string(),
            log_dir: None,
        }
    }
}

impl EvaluatorConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DynDataError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load a config file, or return defaults when it does not exist.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from the default location. A missing file gives defaults; an
    /// unreadable or invalid one is an error.
    pub fn try_load_default() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_if_exists(path),
            None => Ok(Self::default()),
        }
    }

    /// Like [`try_load_default`](Self::try_load_default), but logs the error
    /// and falls back to defaults. Needs a subscriber to already be installed.
    pub fn load_or_default() -> Self {
        Self::try_load_default().unwrap_or_else(|e| {
            tracing::warn!("Ignoring config: {}", e);
            Self::default()
        })
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(DynDataError::Config(
                "max_nodes must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(DynDataError::Config(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
