//! Canvas overlay and its 2D drawing context

use std::f64::consts::TAU;

use smallvec::SmallVec;
use trailglow_core::{Affine2D, BlendMode, Color, DrawContext, Point, Size};
use trailglow_platform::{Result, Surface, SurfaceMetrics};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::js_error;

/// [`DrawContext`] over a `CanvasRenderingContext2d`
pub struct CanvasContext {
    ctx: CanvasRenderingContext2d,
    transform: Affine2D,
    viewport: Size,
    blend_stack: SmallVec<[BlendMode; 4]>,
}

impl CanvasContext {
    fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            transform: Affine2D::IDENTITY,
            viewport: Size::ZERO,
            blend_stack: SmallVec::new(),
        }
    }

    /// The underlying browser context
    pub fn raw(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn apply_blend_mode(&self, mode: BlendMode) {
        if let Err(err) = self
            .ctx
            .set_global_composite_operation(mode.composite_operation())
        {
            tracing::trace!("globalCompositeOperation rejected: {}", js_error(&err));
        }
    }
}

impl DrawContext for CanvasContext {
    fn set_transform(&mut self, transform: Affine2D) {
        self.transform = transform;
        let [a, b, c, d, tx, ty] = transform.elements.map(f64::from);
        if let Err(err) = self.ctx.set_transform(a, b, c, d, tx, ty) {
            tracing::debug!("setTransform failed: {}", js_error(&err));
        }
    }

    fn transform(&self) -> Affine2D {
        self.transform
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.viewport.width),
            f64::from(self.viewport.height),
        );
    }

    fn push_blend_mode(&mut self, mode: BlendMode) {
        self.blend_stack.push(mode);
        self.apply_blend_mode(mode);
    }

    fn pop_blend_mode(&mut self) {
        self.blend_stack.pop();
        self.apply_blend_mode(self.blend_mode());
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend_stack.last().copied().unwrap_or_default()
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radius),
                0.0,
                TAU,
            )
            .is_err()
        {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

/// The overlay `<canvas>` element
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: Option<CanvasContext>,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Self {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|object| object.dyn_into::<CanvasRenderingContext2d>().ok())
            .map(CanvasContext::new);

        if context.is_none() {
            tracing::debug!("Canvas has no 2d context");
        }
        Self { canvas, context }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasContext;

    fn configure(&mut self, metrics: &SurfaceMetrics) {
        // Resizing the backing store resets all context state
        self.canvas.set_width(metrics.physical_width);
        self.canvas.set_height(metrics.physical_height);

        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", metrics.logical_size.width));
        let _ = style.set_property("height", &format!("{}px", metrics.logical_size.height));

        if let Some(context) = self.context.as_mut() {
            context.viewport = metrics.logical_size;
            context.set_transform(metrics.transform());
            context.apply_blend_mode(context.blend_mode());
        }
    }

    fn context_mut(&mut self) -> Option<&mut CanvasContext> {
        self.context.as_mut()
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    fn detach(&mut self) -> Result<()> {
        if self.canvas.is_connected() {
            self.canvas.remove();
        }
        Ok(())
    }
}
