//! Error types for the breath_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for breath_core operations
///
/// The cycle engine itself never fails; these variants cover the setup
/// boundary (configuration, presets, terminal and audio acquisition).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown or invalid preset
    #[error("Preset error: {0}")]
    Preset(String),

    /// Audio asset could not be loaded or the output device is unavailable
    #[error("Audio error: {0}")]
    Audio(String),

    /// Terminal surface could not be acquired
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The background engine stopped abnormally
    #[error("Engine error: {0}")]
    Engine(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
