//! Tuning constants for the pointer trail
//!
//! The defaults are the design values of the effect. [`TrailConfig`] exists
//! so they live in one place and can be overridden from a config file; the
//! engine uses the defaults unless told otherwise.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 600;
/// Per-tick velocity multiplier
pub const DAMPING: f32 = 0.98;
/// Life value that maps to full alpha
pub const ALPHA_LIFE_SCALE: f32 = 90.0;
/// Alpha of a particle at full life
pub const PEAK_OPACITY: f32 = 0.35;
/// Largest particle cap a config may ask for
pub const MAX_PARTICLES_LIMIT: usize = 100_000;

/// Invalid tuning values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A `min..max` pair that contains no values
    #[error("Empty range for {name}: {min} .. {max}")]
    EmptyRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    /// A value outside the range it must lie in
    #[error("{name} = {value} is out of range ({expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// The cap could evict part of the newest batch
    #[error("max_particles ({cap}) is smaller than the largest batch ({batch_max})")]
    CapBelowBatch { cap: usize, batch_max: u32 },
}

/// Particle trail tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Fewest particles spawned per pointer move (inclusive)
    pub batch_min: u32,
    /// Most particles spawned per pointer move (inclusive)
    pub batch_max: u32,
    /// Slowest initial speed in px/frame (inclusive)
    pub speed_min: f32,
    /// Fastest initial speed in px/frame (exclusive)
    pub speed_max: f32,
    /// Smallest radius in px (inclusive)
    pub radius_min: f32,
    /// Largest radius in px (exclusive)
    pub radius_max: f32,
    /// Shortest life in frames (inclusive)
    pub life_min: u32,
    /// Longest life in frames (inclusive)
    pub life_max: u32,
    /// Live particle cap; oldest are evicted first
    pub max_particles: usize,
    /// Velocity multiplier applied every tick
    pub damping: f32,
    /// Life value that maps to alpha 1.0
    pub alpha_life_scale: f32,
    /// Fill alpha multiplier
    pub peak_opacity: f32,
    /// Base fill color (8-bit RGB)
    pub base_color: [u8; 3],
    /// Largest random amount added to the green channel per draw (inclusive)
    pub green_jitter: u8,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            batch_min: 6,
            batch_max: 10,
            speed_min: 0.4,
            speed_max: 1.6,
            radius_min: 1.0,
            radius_max: 3.2,
            life_min: 60,
            life_max: 89,
            max_particles: MAX_PARTICLES,
            damping: DAMPING,
            alpha_life_scale: ALPHA_LIFE_SCALE,
            peak_opacity: PEAK_OPACITY,
            base_color: [16, 230, 255],
            green_jitter: 24,
        }
    }
}

impl TrailConfig {
    /// Check that every range is non-empty and every factor is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_min == 0 {
            return Err(ConfigError::OutOfRange {
                name: "batch_min",
                value: 0.0,
                expected: ">= 1",
            });
        }
        check_inclusive("batch", self.batch_min, self.batch_max)?;
        check_exclusive("speed", self.speed_min, self.speed_max)?;
        check_exclusive("radius", self.radius_min, self.radius_max)?;
        if self.radius_min <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "radius_min",
                value: f64::from(self.radius_min),
                expected: "> 0",
            });
        }
        if self.life_min == 0 {
            return Err(ConfigError::OutOfRange {
                name: "life_min",
                value: 0.0,
                expected: ">= 1",
            });
        }
        check_inclusive("life", self.life_min, self.life_max)?;

        if self.max_particles > MAX_PARTICLES_LIMIT {
            return Err(ConfigError::OutOfRange {
                name: "max_particles",
                value: self.max_particles as f64,
                expected: "<= 100000",
            });
        }
        if self.max_particles < self.batch_max as usize {
            return Err(ConfigError::CapBelowBatch {
                cap: self.max_particles,
                batch_max: self.batch_max,
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "damping",
                value: f64::from(self.damping),
                expected: "0 < damping <= 1",
            });
        }
        if !(self.alpha_life_scale.is_finite() && self.alpha_life_scale > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "alpha_life_scale",
                value: f64::from(self.alpha_life_scale),
                expected: "> 0",
            });
        }
        if !(self.peak_opacity > 0.0 && self.peak_opacity <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "peak_opacity",
                value: f64::from(self.peak_opacity),
                expected: "0 < peak_opacity <= 1",
            });
        }
        let green_peak = u16::from(self.base_color[1]) + u16::from(self.green_jitter);
        if green_peak > 255 {
            return Err(ConfigError::OutOfRange {
                name: "base_color[1] + green_jitter",
                value: f64::from(green_peak),
                expected: "<= 255",
            });
        }
        Ok(())
    }
}

fn check_inclusive(name: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::EmptyRange {
            name,
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(())
}

fn check_exclusive(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    // Also rejects NaN bounds
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(ConfigError::EmptyRange {
            name,
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(TrailConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TrailConfig = toml::from_str("batch_max = 12\ndamping = 0.95").unwrap();
        assert_eq!(config.batch_max, 12);
        assert_eq!(config.damping, 0.95);
        assert_eq!(config.life_min, 60);
        assert_eq!(config.max_particles, MAX_PARTICLES);
    }

    #[test]
    fn test_rejects_empty_ranges() {
        let config = TrailConfig {
            speed_min: 2.0,
            speed_max: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { name: "speed", .. })
        ));

        let config = TrailConfig {
            life_min: 90,
            life_max: 80,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { name: "life", .. })
        ));
    }

    #[test]
    fn test_rejects_cap_below_batch() {
        let config = TrailConfig {
            max_particles: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapBelowBatch {
                cap: 5,
                batch_max: 10
            })
        );
    }

    #[test]
    fn test_rejects_oversized_cap() {
        let config = TrailConfig {
            max_particles: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                name: "max_particles",
                ..
            })
        ));

        let config = TrailConfig {
            max_particles: MAX_PARTICLES_LIMIT,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_factors() {
        for damping in [0.0, 1.5, f32::NAN] {
            let config = TrailConfig {
                damping,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "damping {damping} accepted");
        }

        let config = TrailConfig {
            green_jitter: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
