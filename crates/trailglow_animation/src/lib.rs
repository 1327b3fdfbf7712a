//! Trailglow Particle Field
//!
//! The simulation behind the pointer trail: particles spawned in bursts at the
//! pointer, moving outward, slowing down and fading until they expire.
//!
//! # Features
//!
//! - **Burst Spawning**: 6 to 10 particles per pointer move, random direction
//! - **Damped Motion**: Velocity shrinks by a constant factor every frame
//! - **Life-Driven Fade**: Alpha follows remaining life, then the particle is removed
//! - **Bounded Population**: Oldest particles are evicted above the cap
//! - **Additive Rendering**: Drawn through any [`trailglow_core::DrawContext`]
//! - **Seeded Randomness**: A field replays identically from the same seed

pub mod config;
pub mod field;
pub mod particle;

pub use config::{
    ConfigError, TrailConfig, ALPHA_LIFE_SCALE, DAMPING, MAX_PARTICLES, MAX_PARTICLES_LIMIT,
    PEAK_OPACITY,
};
pub use field::{FieldStats, ParticleField, TickStats};
pub use particle::Particle;
