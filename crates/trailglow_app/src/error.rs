//! Error types for trailglow_app

use std::path::PathBuf;

use thiserror::Error;
use trailglow_animation::ConfigError;
use trailglow_platform::PlatformError;

/// Errors that can occur while configuring or starting the trail engine
#[derive(Error, Debug)]
pub enum TrailError {
    /// Particle tuning failed validation
    #[error("Invalid trail configuration: {0}")]
    Config(#[from] ConfigError),

    /// Overlay settings failed validation
    #[error("Invalid overlay configuration: {0}")]
    Overlay(String),

    /// Config file is not valid TOML for [`EngineConfig`](crate::EngineConfig)
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written out as TOML
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Platform error (surface, listeners, frame scheduling)
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type for trailglow_app operations
pub type Result<T> = std::result::Result<T, TrailError>;
