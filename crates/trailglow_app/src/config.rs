//! Engine configuration
//!
//! Everything is optional in the TOML form; missing keys fall back to the
//! design defaults.
//!
//! ```toml
//! [overlay]
//! z_index = 10
//!
//! [trail]
//! max_particles = 400
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use trailglow_animation::TrailConfig;
use trailglow_platform::OverlayConfig;

use crate::error::{Result, TrailError};

/// Overlay and particle settings for one engine
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub overlay: OverlayConfig,
    pub trail: TrailConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TrailError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.trail.validate()?;

        let ratio = self.overlay.max_pixel_ratio;
        if !(ratio.is_finite() && ratio >= 1.0) {
            return Err(TrailError::Overlay(format!(
                "max_pixel_ratio must be a finite number >= 1, got {ratio}"
            )));
        }
        Ok(())
    }

    /// Pretty-printed TOML form
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
