//! The live particle field
//!
//! Pointer moves call [`ParticleField::spawn`]; the frame loop calls
//! [`ParticleField::tick`], which advances every particle one frame, drops
//! the ones that ran out of life, and paints the rest additively.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use trailglow_core::{BlendMode, Color, DrawContext, DrawContextExt, Point, Vec2};

use crate::config::{ConfigError, TrailConfig, MAX_PARTICLES};
use crate::particle::Particle;

/// Running totals for a field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    /// Particles created by spawn calls
    pub spawned_total: u64,
    /// Particles discarded by the cap
    pub evicted_total: u64,
    /// Particles removed because their life ran out
    pub expired_total: u64,
    /// Particles drawn by the most recent tick
    pub last_drawn: usize,
}

/// Outcome of one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub drawn: usize,
    pub expired: usize,
}

/// Owns the live particles, oldest first
pub struct ParticleField {
    particles: VecDeque<Particle>,
    config: TrailConfig,
    rng: StdRng,
    stats: FieldStats,
}

impl ParticleField {
    /// Field with the default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(TrailConfig::default(), seed)
    }

    /// Field with custom tuning, rejected if the config is invalid
    pub fn with_config(config: TrailConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: TrailConfig, seed: u64) -> Self {
        Self {
            particles: VecDeque::with_capacity(config.max_particles.min(MAX_PARTICLES)),
            config,
            rng: StdRng::seed_from_u64(seed),
            stats: FieldStats::default(),
        }
    }

    /// Emit a burst of particles at a pointer position
    ///
    /// Returns the batch size. The batch is appended after every existing
    /// particle; if that pushes the field over its cap, the oldest particles
    /// are evicted until it fits, so the new batch always survives whole.
    pub fn spawn(&mut self, x: f32, y: f32) -> usize {
        let config = &self.config;
        let rng = &mut self.rng;
        let count = rng.gen_range(config.batch_min..=config.batch_max) as usize;
        let origin = Point::new(x, y);

        self.particles.extend((0..count).map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(config.speed_min..config.speed_max);
            let radius = rng.gen_range(config.radius_min..config.radius_max);
            let life = rng.gen_range(config.life_min..=config.life_max);
            Particle::new(origin, Vec2::from_polar(angle, speed), radius, life)
        }));

        let overflow = self.particles.len().saturating_sub(self.config.max_particles);
        if overflow > 0 {
            self.particles.drain(..overflow);
            self.stats.evicted_total += overflow as u64;
        }

        self.stats.spawned_total += count as u64;
        count
    }

    /// Advance and draw one frame
    ///
    /// Clears the surface, switches to additive blending, steps every
    /// particle from newest to oldest and fills a circle for each one still
    /// alive, then restores normal blending. Particles whose life reaches
    /// zero are removed in the same tick and never drawn.
    pub fn tick(&mut self, ctx: &mut dyn DrawContext) -> TickStats {
        ctx.clear();

        let Self {
            particles,
            config,
            rng,
            ..
        } = self;
        let [red, green, blue] = config.base_color;
        let mut stats = TickStats::default();

        ctx.with_blend_mode(BlendMode::Lighter, |ctx| {
            for particle in particles.iter_mut().rev() {
                if !particle.step(config.damping, config.alpha_life_scale) {
                    stats.expired += 1;
                    continue;
                }

                let jitter = rng.gen_range(0..=config.green_jitter);
                let color = Color::from_rgba8(
                    red,
                    green.saturating_add(jitter),
                    blue,
                    particle.alpha * config.peak_opacity,
                );
                ctx.fill_circle(particle.position, particle.radius, color);
                stats.drawn += 1;
            }
        });

        if stats.expired > 0 {
            particles.retain(Particle::is_alive);
        }

        self.stats.expired_total += stats.expired as u64;
        self.stats.last_drawn = stats.drawn;
        tracing::trace!(
            "Particle tick: drawn={}, expired={}, live={}",
            stats.drawn,
            stats.expired,
            self.particles.len()
        );
        stats
    }

    /// Drop every live particle
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Live particles, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Particle> + ExactSizeIterator + '_ {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn stats(&self) -> FieldStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailglow_core::{DrawCommand, RecordingContext, Size};

    fn recording() -> RecordingContext {
        RecordingContext::new(Size::new(800.0, 600.0))
    }

    fn fixed_life(life: u32) -> TrailConfig {
        TrailConfig {
            life_min: life,
            life_max: life,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_sizes_within_range() {
        for seed in 0..8 {
            let mut field = ParticleField::new(seed);
            for i in 0..200 {
                let before = field.len();
                let count = field.spawn(i as f32, 0.0);
                assert!((6..=10).contains(&count), "batch of {count}");
                assert!(field.len() <= 600);
                if before + count <= 600 {
                    assert_eq!(field.len(), before + count);
                }
            }
        }
    }

    #[test]
    fn test_spawned_particles_follow_tuning() {
        let mut field = ParticleField::new(7);
        for _ in 0..50 {
            field.spawn(120.0, 80.0);
        }

        for p in field.iter() {
            assert_eq!(p.position, Point::new(120.0, 80.0));
            assert_eq!(p.alpha, 1.0);
            assert!((60..=89).contains(&p.life));
            assert!(p.radius >= 1.0 && p.radius < 3.2);
            // Speed range is [0.4, 1.6); allow for float rounding in cos/sin
            let speed = p.speed();
            assert!(speed > 0.4 - 1e-4 && speed < 1.6 + 1e-4, "speed {speed}");
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = ParticleField::new(42);
        let mut b = ParticleField::new(42);
        a.spawn(5.0, 5.0);
        b.spawn(5.0, 5.0);

        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn test_cap_keeps_most_recent_spawns() {
        let mut field = ParticleField::new(3);
        let mut batches = Vec::new();

        // Encode the spawn index in x so particles can be traced back
        for i in 0..100 {
            let count = field.spawn(i as f32, 0.0);
            batches.push(count);
        }

        assert!(batches.iter().sum::<usize>() >= 600);
        assert_eq!(field.len(), 600);

        // The newest batch is present in full at the back
        let last = *batches.last().unwrap();
        assert!(field.iter().rev().take(last).all(|p| p.position.x == 99.0));

        // Insertion order is preserved and only the newest spawns remain
        let xs: Vec<f32> = field.iter().map(|p| p.position.x).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
        let mut kept = 0;
        let mut oldest_full = 100;
        for (i, count) in batches.iter().enumerate().rev() {
            if kept + count > 600 {
                break;
            }
            kept += count;
            oldest_full = i;
        }
        assert!(xs.iter().all(|&x| x as usize >= oldest_full - 1));

        let stats = field.stats();
        assert_eq!(stats.spawned_total, batches.iter().sum::<usize>() as u64);
        assert_eq!(stats.evicted_total, stats.spawned_total - 600);
    }

    #[test]
    fn test_life_alpha_and_speed_decay_every_tick() {
        let mut field = ParticleField::new(11);
        field.spawn(100.0, 100.0);
        let mut ctx = recording();

        let mut previous: Vec<Particle> = field.iter().copied().collect();
        for _ in 0..59 {
            field.tick(&mut ctx);
            let current: Vec<Particle> = field.iter().copied().collect();
            assert_eq!(current.len(), previous.len());

            for (before, after) in previous.iter().zip(&current) {
                assert_eq!(after.life, before.life - 1);
                assert_eq!(after.alpha, (after.life as f32 / 90.0).max(0.0));
                assert!(after.alpha <= before.alpha);
                assert!(after.speed() < before.speed());
                assert_eq!(after.radius, before.radius);
            }
            previous = current;
        }
    }

    #[test]
    fn test_nothing_expires_before_tick_sixty() {
        let mut field = ParticleField::new(5);
        let spawned = field.spawn(100.0, 100.0);
        assert!((6..=10).contains(&spawned));
        let mut ctx = recording();

        for _ in 0..59 {
            field.tick(&mut ctx);
        }
        assert_eq!(field.len(), spawned);
        assert!(field.iter().all(|p| p.life >= 1));
    }

    #[test]
    fn test_everything_expires_by_tick_eighty_nine() {
        let mut field = ParticleField::new(5);
        field.spawn(100.0, 100.0);
        let mut ctx = recording();

        for _ in 0..89 {
            field.tick(&mut ctx);
        }
        assert!(field.is_empty());
        assert_eq!(ctx.circles().count(), 0);
    }

    #[test]
    fn test_longest_life_boundary() {
        let mut field = ParticleField::with_config(fixed_life(89), 1).unwrap();
        let spawned = field.spawn(0.0, 0.0);
        let mut ctx = recording();

        for _ in 0..88 {
            field.tick(&mut ctx);
        }
        assert_eq!(field.len(), spawned);
        assert!(field.iter().all(|p| p.life == 1));

        let last = field.tick(&mut ctx);
        assert_eq!(last.expired, spawned);
        assert_eq!(last.drawn, 0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_shortest_life_boundary() {
        let mut field = ParticleField::with_config(fixed_life(60), 1).unwrap();
        let spawned = field.spawn(0.0, 0.0);
        let mut ctx = recording();

        for _ in 0..59 {
            field.tick(&mut ctx);
        }
        assert_eq!(field.len(), spawned);

        field.tick(&mut ctx);
        assert!(field.is_empty());
    }

    #[test]
    fn test_expiring_particle_is_not_drawn() {
        let mut field = ParticleField::with_config(fixed_life(1), 9).unwrap();
        let spawned = field.spawn(10.0, 10.0);
        let mut ctx = recording();

        let stats = field.tick(&mut ctx);

        assert_eq!(stats, TickStats { drawn: 0, expired: spawned });
        assert_eq!(ctx.circles().count(), 0);
        assert_eq!(field.stats().expired_total, spawned as u64);
    }

    #[test]
    fn test_tick_draws_additively_and_restores_blending() {
        let mut field = ParticleField::new(21);
        field.spawn(50.0, 60.0);
        field.spawn(70.0, 80.0);
        let mut ctx = recording();

        let stats = field.tick(&mut ctx);

        let commands = ctx.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Clear));
        assert_eq!(commands.get(1), Some(&DrawCommand::PushBlendMode(BlendMode::Lighter)));
        assert_eq!(commands.last(), Some(&DrawCommand::PopBlendMode));
        assert_eq!(ctx.blend_mode(), BlendMode::Normal);
        assert_eq!(stats.drawn, field.len());
        assert_eq!(field.stats().last_drawn, field.len());

        let circles: Vec<_> = ctx.circles().collect();
        assert_eq!(circles.len(), field.len());
        // Drawn newest first
        for ((center, radius, color, mode), particle) in circles.iter().zip(field.iter().rev()) {
            assert_eq!(*mode, BlendMode::Lighter);
            assert_eq!(*center, particle.position);
            assert_eq!(*radius, particle.radius);

            let [r, g, b] = color.to_rgb8();
            assert_eq!((r, b), (16, 255));
            assert!((230..=254).contains(&g), "green {g}");
            assert!((color.a - particle.alpha * 0.35).abs() < 1e-6);
            assert!(color.a < 0.35);
        }
    }

    #[test]
    fn test_tick_on_empty_field_only_clears() {
        let mut field = ParticleField::new(0);
        let mut ctx = recording();

        let stats = field.tick(&mut ctx);

        assert_eq!(stats, TickStats::default());
        assert_eq!(ctx.clear_count(), 1);
        assert_eq!(ctx.circles().count(), 0);
    }

    #[test]
    fn test_with_config_rejects_invalid_tuning() {
        let config = TrailConfig {
            batch_min: 12,
            batch_max: 4,
            ..Default::default()
        };
        assert!(ParticleField::with_config(config, 0).is_err());
    }
}
