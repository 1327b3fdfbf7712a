//! Trailglow Core
//!
//! Foundational types for the Trailglow pointer-trail overlay:
//!
//! - **Geometry**: points, vectors, sizes, and the affine transform used for
//!   device pixel ratio scaling
//! - **Color**: RGBA colors with CSS formatting, and canvas blend modes
//! - **Draw Context**: the drawing API every overlay surface implements, plus
//!   a recording implementation for headless rendering and tests

pub mod color;
pub mod draw;
pub mod geometry;

pub use color::{BlendMode, Color};
pub use draw::{DrawCommand, DrawContext, DrawContextExt, RecordingContext};
pub use geometry::{Affine2D, Point, Rect, Size, Vec2};
