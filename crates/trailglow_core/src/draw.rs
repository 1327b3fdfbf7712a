//! Drawing abstraction
//!
//! Everything that paints onto an overlay goes through [`DrawContext`]. The
//! browser canvas implements it in `trailglow_platform_web`; tests and the
//! headless host use [`RecordingContext`], which keeps the commands of the
//! current frame so they can be inspected.
//!
//! # Example
//!
//! ```rust
//! use trailglow_core::{BlendMode, Color, DrawContext, DrawContextExt, Point, RecordingContext, Size};
//!
//! let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
//! ctx.clear();
//! ctx.with_blend_mode(BlendMode::Lighter, |ctx| {
//!     ctx.fill_circle(Point::new(10.0, 10.0), 2.0, Color::CYAN);
//! });
//! assert_eq!(ctx.blend_mode(), BlendMode::Normal);
//! ```

use smallvec::SmallVec;

use crate::color::{BlendMode, Color};
use crate::geometry::{Affine2D, Point, Size};

// ─────────────────────────────────────────────────────────────────────────────
// DrawContext Trait
// ─────────────────────────────────────────────────────────────────────────────

/// The drawing surface API used by the particle renderer
///
/// Coordinates are logical pixels. The base transform set with
/// [`set_transform`](DrawContext::set_transform) maps them onto the physical
/// backing store.
pub trait DrawContext {
    /// Replace the base transform (device pixel ratio scaling)
    fn set_transform(&mut self, transform: Affine2D);

    /// Current base transform
    fn transform(&self) -> Affine2D;

    /// Erase the whole surface to transparent
    fn clear(&mut self);

    /// Push a blend mode; subsequent fills composite with it
    fn push_blend_mode(&mut self, mode: BlendMode);

    /// Restore the blend mode active before the matching push
    fn pop_blend_mode(&mut self);

    /// Blend mode currently in effect
    fn blend_mode(&self) -> BlendMode;

    /// Fill a circle
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Logical size of the surface being drawn on
    fn viewport(&self) -> Size;
}

/// Convenience helpers available on every [`DrawContext`], including trait objects
pub trait DrawContextExt: DrawContext {
    /// Run `f` with `mode` pushed, popping it afterwards
    fn with_blend_mode<R, F: FnOnce(&mut Self) -> R>(&mut self, mode: BlendMode, f: F) -> R {
        self.push_blend_mode(mode);
        let result = f(self);
        self.pop_blend_mode();
        result
    }
}

impl<T: DrawContext + ?Sized> DrawContextExt for T {}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Draw Context
// ─────────────────────────────────────────────────────────────────────────────

/// A draw command that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SetTransform(Affine2D),
    Clear,
    PushBlendMode(BlendMode),
    PopBlendMode,
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
        blend_mode: BlendMode,
    },
}

/// Records draw commands instead of rasterizing them
///
/// `clear()` discards everything recorded before it, the same way clearing
/// a canvas discards the previous frame, so `commands()` always describes
/// the latest frame.
#[derive(Debug)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    blend_mode_stack: SmallVec<[BlendMode; 4]>,
    transform: Affine2D,
    viewport: Size,
    clear_count: u64,
}

impl RecordingContext {
    /// Create a new recording context
    pub fn new(viewport: Size) -> Self {
        let mut blend_mode_stack = SmallVec::new();
        blend_mode_stack.push(BlendMode::Normal);
        Self {
            commands: Vec::new(),
            blend_mode_stack,
            transform: Affine2D::IDENTITY,
            viewport,
            clear_count: 0,
        }
    }

    /// Commands recorded since the last clear
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Circles filled since the last clear
    pub fn circles(&self) -> impl Iterator<Item = (Point, f32, Color, BlendMode)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::FillCircle {
                center,
                radius,
                color,
                blend_mode,
            } => Some((*center, *radius, *color, *blend_mode)),
            _ => None,
        })
    }

    /// Number of times the surface has been cleared
    pub fn clear_count(&self) -> u64 {
        self.clear_count
    }

    /// Update the logical viewport (the surface was resized)
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}

impl DrawContext for RecordingContext {
    fn set_transform(&mut self, transform: Affine2D) {
        self.commands.push(DrawCommand::SetTransform(transform));
        self.transform = transform;
    }

    fn transform(&self) -> Affine2D {
        self.transform
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.clear_count += 1;
    }

    fn push_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::PushBlendMode(mode));
        self.blend_mode_stack.push(mode);
    }

    fn pop_blend_mode(&mut self) {
        self.commands.push(DrawCommand::PopBlendMode);
        if self.blend_mode_stack.len() > 1 {
            self.blend_mode_stack.pop();
        }
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend_mode_stack
            .last()
            .copied()
            .unwrap_or_default()
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let blend_mode = self.blend_mode();
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
            blend_mode,
        });
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}
