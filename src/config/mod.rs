//! Configuration module for nodegraph-rs
//!
//! Engine configuration is read once at startup. It covers:
//! - Scheduler cadence (`tick_rate_hz`)
//! - Capacities of the command and outbound channels
//! - Logging (filter, optional rolling log file, output format)
//! - An optional graph snapshot to load before the first tick
//!
//! # Config Location
//!
//! The default config file lives in the platform config directory:
//! - **Linux**: `~/.config/dev.hxyulin.nodegraph-rs/engine.toml`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.nodegraph-rs/engine.toml`
//! - **Windows**: `%APPDATA%\dev.hxyulin.nodegraph-rs\engine.toml`
//!
//! Files ending in `.toml` are parsed as TOML, anything else as JSON.
//!
//! # Example
//!
//! ```ignore
//! use nodegraph_rs::config::EngineConfig;
//!
//! let config = EngineConfig::load_or_default(EngineConfig::default_path().unwrap());
//! assert!(config.scheduler.tick_rate_hz > 0);
//! ```

use crate::error::{NodeGraphError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hxyulin.nodegraph-rs";

/// Default config filename
pub const CONFIG_FILE: &str = "engine.toml";

/// Default scheduler rate in Hz
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Default capacity of the inbound command channel
pub const DEFAULT_COMMAND_CAPACITY: usize = 256;

/// Default outbound backlog at which node messages are dropped
pub const DEFAULT_MESSAGE_CAPACITY: usize = 10_000;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,nodegraph_rs=debug";

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Default directory for rolling log files
pub fn default_log_dir() -> Option<PathBuf> {
    dirs_next::data_local_dir().map(|p| p.join(APP_ID).join("logs"))
}

// ==================== Engine Config ====================

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub channels: ChannelConfig,
    pub logging: LoggingConfig,
    pub snapshot: SnapshotConfig,
}

impl EngineConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NodeGraphError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content).map_err(|e| {
                NodeGraphError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                NodeGraphError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Using default configuration: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Save config to disk (TOML or JSON depending on the extension)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    NodeGraphError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| NodeGraphError::Config(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| NodeGraphError::Config(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            NodeGraphError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.tick_rate_hz == 0 {
            return Err(NodeGraphError::Config(
                "scheduler.tick_rate_hz must be greater than 0".to_string(),
            ));
        }
        if self.channels.command_capacity == 0 || self.channels.message_capacity == 0 {
            return Err(NodeGraphError::Config(
                "channel capacities must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

// ==================== Scheduler Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How often `Engine::run` ticks, in Hz
    pub tick_rate_hz: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

// ==================== Channel Config ====================

/// Limits of the channels between I/O threads and the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Capacity of the bounded command channel
    pub command_capacity: usize,
    /// Outbound backlog at which node messages start being dropped. Replies
    /// and error reports are never dropped.
    pub message_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
        }
    }
}

// ==================== Logging Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,

    /// Also write logs to a daily rolling file
    pub log_to_file: bool,

    /// Directory for log files (platform default if unset)
    pub log_directory: Option<PathBuf>,

    /// Console output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_to_file: false,
            log_directory: None,
            format: LogFormat::Full,
        }
    }
}

impl LoggingConfig {
    /// Directory log files go to, if file logging can be enabled at all
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_directory.clone().or_else(default_log_dir)
    }
}

/// Console log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default multi-field format
    #[default]
    Full,
    /// Single-line compact format
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Full => write!(f, "full"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

// ==================== Snapshot Config ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Graph snapshot (JSON) applied before the first tick
    pub startup_snapshot: Option<PathBuf>,
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.scheduler.tick_rate_hz, DEFAULT_TICK_RATE_HZ);
        assert_eq!(config.channels.command_capacity, 256);
        assert_eq!(config.channels.message_capacity, 10_000);
        assert!(!config.logging.log_to_file);
        assert!(config.snapshot.startup_snapshot.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [scheduler]
            tick_rate_hz = 120

            [logging]
            format = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.tick_rate_hz, 120);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.channels, ChannelConfig::default());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.toml");

        let mut config = EngineConfig::default();
        config.scheduler.tick_rate_hz = 30;
        config.snapshot.startup_snapshot = Some(PathBuf::from("graph.json"));
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut config = EngineConfig::default();
        config.channels.message_capacity = 8;
        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[scheduler]\ntick_rate_hz = 0\n").unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(NodeGraphError::Config(_))
        ));
        assert_eq!(EngineConfig::load_or_default(&path), EngineConfig::default());
    }
}
