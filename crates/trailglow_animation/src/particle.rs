//! A single trail particle

use trailglow_core::{Point, Vec2};

/// One glowing dot of the trail
///
/// Position and velocity are in logical pixels and pixels per frame. `life`
/// counts the frames the particle has left; `alpha` is derived from it on
/// every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Vec2,
    pub alpha: f32,
    pub radius: f32,
    pub life: u32,
}

impl Particle {
    /// A fresh particle at full opacity
    pub fn new(position: Point, velocity: Vec2, radius: f32, life: u32) -> Self {
        Self {
            position,
            velocity,
            alpha: 1.0,
            radius,
            life,
        }
    }

    /// Advance one frame
    ///
    /// Moves by the current velocity, then damps the velocity, spends one
    /// unit of life and recomputes alpha as `max(0, life / alpha_life_scale)`.
    /// Returns false once life has run out.
    #[inline]
    pub fn step(&mut self, damping: f32, alpha_life_scale: f32) -> bool {
        self.position = self.position.offset(self.velocity);
        self.velocity = self.velocity.scale(damping);
        self.life = self.life.saturating_sub(1);
        self.alpha = (self.life as f32 / alpha_life_scale).max(0.0);
        self.is_alive()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_integrates_then_damps() {
        let mut p = Particle::new(Point::new(10.0, 10.0), Vec2::new(1.0, -2.0), 2.0, 60);

        assert!(p.step(0.5, 90.0));

        assert_eq!(p.position, Point::new(11.0, 8.0));
        assert_eq!(p.velocity, Vec2::new(0.5, -1.0));
        assert_eq!(p.life, 59);
        assert!((p.alpha - 59.0 / 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_last_frame_reports_dead() {
        let mut p = Particle::new(Point::ZERO, Vec2::ZERO, 1.0, 1);

        assert!(!p.step(0.98, 90.0));
        assert_eq!(p.life, 0);
        assert_eq!(p.alpha, 0.0);

        // Stepping a dead particle never underflows
        assert!(!p.step(0.98, 90.0));
        assert_eq!(p.life, 0);
    }
}
