//! Configuration file support for breathe.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/breathe/config.toml`.
//! Every field has a default, so a missing file or a partial file is fine.

use crate::audio::SoundMode;
use crate::presets::{validate_cycle, Preset};
use crate::types::BreathCycle;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sound: SoundConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<CustomPattern>,
}

/// Audio cue configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Mode used when `--sound` is not given
    #[serde(default)]
    pub mode: SoundMode,

    /// Directory holding inhale.mp3, exhale.mp3, hold.mp3 and 1.mp3..9.mp3
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            mode: SoundMode::default(),
            assets_dir: default_assets_dir(),
        }
    }
}

/// Terminal display configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Height of the status box below the gauge
    #[serde(default = "default_status_rows")]
    pub status_rows: u16,

    /// Close the screen as soon as the last cycle ends
    #[serde(default)]
    pub exit_on_complete: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            status_rows: default_status_rows(),
            exit_on_complete: false,
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file used while the terminal UI is active
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// User-defined breathing pattern
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomPattern {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub inhale_ms: u64,
    #[serde(default)]
    pub inhale_hold_ms: u64,
    pub exhale_ms: u64,
    #[serde(default)]
    pub exhale_hold_ms: u64,
    #[serde(default = "default_pattern_cycles")]
    pub cycles: usize,
}

impl CustomPattern {
    pub fn cycle(&self) -> BreathCycle {
        BreathCycle::from_millis(
            self.inhale_ms,
            self.inhale_hold_ms,
            self.exhale_ms,
            self.exhale_hold_ms,
        )
    }

    pub fn to_preset(&self) -> Preset {
        Preset {
            name: self.name.clone(),
            title: self
                .description
                .clone()
                .unwrap_or_else(|| format!("Custom breath cycle '{}'", self.name)),
            description: self.description.clone().unwrap_or_default(),
            cycle: self.cycle(),
            cycles: self.cycles,
        }
    }
}

// Default value functions
fn data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(".local/share"))
            .unwrap_or_else(std::env::temp_dir)
    });
    base.join("breathe")
}

fn default_assets_dir() -> PathBuf {
    data_dir().join("assets")
}

fn default_log_file() -> PathBuf {
    data_dir().join("breathe.log")
}

fn default_status_rows() -> u16 {
    10
}

fn default_log_level() -> String {
    "info".into()
}

fn default_pattern_cycles() -> usize {
    20
}

/// Upper bound on `cycles` for a custom pattern
pub const MAX_PATTERN_CYCLES: usize = 10_000;

/// Upper bound on any single phase of a custom pattern
pub const MAX_PHASE_MS: u64 = 3_600_000;

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(".config"))
                .unwrap_or_else(std::env::temp_dir)
        });
        base.join("breathe").join("config.toml")
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the session cannot run with
    ///
    /// Durations off the 100 ms grid are only warned about.
    pub fn validate(&self) -> Result<()> {
        if self.display.status_rows == 0 {
            return Err(Error::Config("display.status_rows must be at least 1".into()));
        }

        let mut seen = std::collections::HashSet::new();
        for pattern in &self.patterns {
            if pattern.name.trim().is_empty() {
                return Err(Error::Config("pattern name must not be empty".into()));
            }
            if !seen.insert(pattern.name.as_str()) {
                return Err(Error::Config(format!(
                    "pattern '{}' is defined more than once",
                    pattern.name
                )));
            }
            if pattern.cycles == 0 || pattern.cycles > MAX_PATTERN_CYCLES {
                return Err(Error::Config(format!(
                    "pattern '{}' must have between 1 and {} cycles",
                    pattern.name, MAX_PATTERN_CYCLES
                )));
            }
            let longest = [
                pattern.inhale_ms,
                pattern.inhale_hold_ms,
                pattern.exhale_ms,
                pattern.exhale_hold_ms,
            ]
            .into_iter()
            .max()
            .unwrap_or_default();
            if longest > MAX_PHASE_MS {
                return Err(Error::Config(format!(
                    "pattern '{}' has a phase longer than {}ms",
                    pattern.name, MAX_PHASE_MS
                )));
            }
            for problem in validate_cycle(&pattern.cycle()) {
                tracing::warn!("Pattern '{}': {}", pattern.name, problem);
            }
        }
        Ok(())
    }

    /// Look up a custom pattern by name
    pub fn pattern(&self, name: &str) -> Result<Preset> {
        self.patterns
            .iter()
            .find(|p| p.name == name)
            .map(CustomPattern::to_preset)
            .ok_or_else(|| Error::Preset(format!("no custom pattern named '{}'", name)))
    }
}
