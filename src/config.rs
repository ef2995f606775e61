//! Configuration management for HID Telemetry
//!
//! Configuration is stored as TOML in a platform-specific config file. Every
//! section is optional; missing sections and fields take their defaults.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/hid-telemetry/config.toml` |
//! | macOS | `~/Library/Application Support/hid-telemetry/config.toml` |
//! | Windows | `%APPDATA%\hid-telemetry\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use hid_telemetry::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.velocity.automation_threshold = 30.0;
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file, creating its directory if needed.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("hid-telemetry");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// CTRL artifact filter settings
    #[serde(default)]
    pub filter: FilterConfig,
    /// Analyzer buffer bounds
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Typing velocity thresholds
    #[serde(default)]
    pub velocity: VelocityConfig,
    /// Replay script encoding
    #[serde(default)]
    pub script: ScriptConfig,
}

/// CTRL artifact filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Start with the CTRL artifact filter enabled
    pub ctrl_artifact_fix: bool,
}

/// Analyzer state bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Captured events kept for replay (oldest evicted first, 0 = unbounded)
    pub max_events: usize,
    /// Timestamps kept for velocity estimation
    pub timing_window: usize,
    /// Characters kept in the signature buffer
    pub signature_buffer_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            timing_window: 100,
            signature_buffer_chars: 1000,
        }
    }
}

/// Typing velocity thresholds in events per second
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VelocityConfig {
    /// Above this rate input is treated as automated
    pub automation_threshold: f64,
    /// Above this rate (and below automation) input is suspicious
    pub suspicious_threshold: f64,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            automation_threshold: 40.0,
            suspicious_threshold: 15.0,
        }
    }
}

/// Replay script encoding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptConfig {
    /// Gaps longer than this split typed text and may produce a DELAY
    pub delay_gap_ms: u64,
    /// Shortest DELAY worth emitting
    pub min_delay_ms: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            delay_gap_ms: 100,
            min_delay_ms: 50,
        }
    }
}

impl ScriptConfig {
    pub fn delay_gap(&self) -> Duration {
        Duration::from_millis(self.delay_gap_ms)
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
