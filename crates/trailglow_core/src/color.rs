//! Color and compositing types

use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color, channels in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from 8-bit color channels and a 0.0..=1.0 alpha
    pub fn from_rgba8(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    /// 8-bit color channels (alpha is left as a float)
    pub fn to_rgb8(&self) -> [u8; 3] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// CSS `rgba(r, g, b, a)` notation, as accepted by canvas fill styles
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a.clamp(0.0, 1.0))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compositing
// ─────────────────────────────────────────────────────────────────────────────

/// How new paint combines with what is already on the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source over destination
    #[default]
    Normal,
    /// Additive: overlapping paint brightens instead of occluding
    Lighter,
}

impl BlendMode {
    /// Canvas 2D `globalCompositeOperation` keyword for this mode
    pub fn composite_operation(self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Lighter => "lighter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba8_round_trips_channels() {
        let color = Color::from_rgba8(16, 241, 255, 0.35);
        assert_eq!(color.to_rgb8(), [16, 241, 255]);
        assert!((color.a - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn test_css_notation() {
        let color = Color::from_rgba8(16, 230, 255, 0.5);
        assert_eq!(color.to_css(), "rgba(16, 230, 255, 0.5)");
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(Color::from_rgba8(0, 0, 0, 3.0).a, 1.0);
        assert_eq!(Color::from_rgba8(0, 0, 0, -1.0).a, 0.0);
    }

    #[test]
    fn test_composite_keywords() {
        assert_eq!(BlendMode::default().composite_operation(), "source-over");
        assert_eq!(BlendMode::Lighter.composite_operation(), "lighter");
    }
}
