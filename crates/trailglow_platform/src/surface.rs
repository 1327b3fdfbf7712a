//! Overlay surface management
//!
//! [`SurfaceManager`] owns the single full-viewport overlay: it asks the host
//! for a surface, sizes it for the device pixel ratio, keeps it sized on
//! viewport resize, and removes it again on stop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use trailglow_core::{Affine2D, Size};

use crate::error::{PlatformError, Result};
use crate::event::EventKind;
use crate::host::{Host, ListenerId, Surface};

/// Overlay presentation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Stacking order; high enough to sit above page content
    pub z_index: i32,
    /// Upper bound applied to the device pixel ratio
    pub max_pixel_ratio: f64,
    /// Optional CSS class added to the overlay element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            z_index: 5,
            max_pixel_ratio: 2.0,
            class_name: None,
        }
    }
}

impl OverlayConfig {
    /// Inline style for the overlay element: fixed, full viewport,
    /// transparent, and invisible to pointer hit testing
    pub fn css_text(&self) -> String {
        format!(
            "position:fixed;inset:0;pointer-events:none;background:transparent;z-index:{}",
            self.z_index
        )
    }
}

/// Size and scale of an overlay surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMetrics {
    /// Display size in logical pixels
    pub logical_size: Size,
    /// Physical pixels per logical pixel (capped device pixel ratio)
    pub scale: f32,
    /// Backing store width in physical pixels
    pub physical_width: u32,
    /// Backing store height in physical pixels
    pub physical_height: u32,
}

impl SurfaceMetrics {
    /// Metrics for a viewport at a device pixel ratio
    ///
    /// A missing (non-finite or non-positive) ratio counts as 1. The backing
    /// store is `floor(viewport × min(ratio, max_pixel_ratio))`.
    pub fn compute(viewport: Size, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        let ratio = sanitize_ratio(device_pixel_ratio);
        let scale = ratio.min(sanitize_ratio(max_pixel_ratio));
        let width = f64::from(viewport.width.max(0.0));
        let height = f64::from(viewport.height.max(0.0));

        Self {
            logical_size: Size::new(width as f32, height as f32),
            scale: scale as f32,
            physical_width: (width * scale).floor() as u32,
            physical_height: (height * scale).floor() as u32,
        }
    }

    /// Transform mapping logical drawing coordinates onto the backing store
    pub fn transform(&self) -> Affine2D {
        Affine2D::uniform_scale(self.scale)
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Shared access to the managed surface
///
/// Cloned into frame callbacks; becomes empty when the manager stops.
pub struct SurfaceHandle<S: Surface> {
    slot: Rc<RefCell<Option<S>>>,
}

impl<S: Surface> Clone for SurfaceHandle<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<S: Surface> SurfaceHandle<S> {
    /// Run `f` against the drawing context
    ///
    /// Returns None when there is no surface, no context, or the surface is
    /// already borrowed further up the stack.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut S::Context) -> R) -> Option<R> {
        let mut slot = match self.slot.try_borrow_mut() {
            Ok(slot) => slot,
            Err(_) => {
                tracing::trace!("Surface busy, skipping draw");
                return None;
            }
        };
        slot.as_mut()?.context_mut().map(f)
    }

    /// Whether a surface is currently held
    pub fn is_live(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the overlay surface for one start/stop cycle at a time
pub struct SurfaceManager<H: Host> {
    host: H,
    config: OverlayConfig,
    slot: Rc<RefCell<Option<H::Surface>>>,
    metrics: Rc<Cell<Option<SurfaceMetrics>>>,
    resize_listener: Option<ListenerId>,
}

impl<H: Host> SurfaceManager<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, OverlayConfig::default())
    }

    pub fn with_config(host: H, config: OverlayConfig) -> Self {
        Self {
            host,
            config,
            slot: Rc::new(RefCell::new(None)),
            metrics: Rc::new(Cell::new(None)),
            resize_listener: None,
        }
    }

    /// Create, size, and attach the overlay, then follow viewport resizes
    ///
    /// Fails with [`PlatformError::SurfaceUnavailable`] when the host cannot
    /// provide a surface with a drawing context; nothing stays attached in
    /// that case.
    pub fn start(&mut self) -> Result<()> {
        if self.is_started() {
            tracing::warn!("SurfaceManager::start() called while already started");
            return Err(PlatformError::AlreadyStarted);
        }

        let mut surface = self.host.create_surface(&self.config)?;
        if surface.context_mut().is_none() {
            if let Err(err) = surface.detach() {
                tracing::debug!("Ignoring detach failure for context-less surface: {}", err);
            }
            return Err(PlatformError::SurfaceUnavailable(
                "surface has no 2d drawing context".to_string(),
            ));
        }

        let metrics = SurfaceMetrics::compute(
            self.host.viewport_size(),
            self.host.device_pixel_ratio(),
            self.config.max_pixel_ratio,
        );
        surface.configure(&metrics);
        self.metrics.set(Some(metrics));
        *self.slot.borrow_mut() = Some(surface);

        tracing::debug!(
            "Overlay attached on {} host: {}x{} logical, scale {}",
            self.host.name(),
            metrics.logical_size.width,
            metrics.logical_size.height,
            metrics.scale
        );

        let slot = Rc::clone(&self.slot);
        let metrics_cell = Rc::clone(&self.metrics);
        let host = self.host.clone();
        let max_pixel_ratio = self.config.max_pixel_ratio;
        let registered = self.host.add_listener(
            EventKind::Resize,
            Box::new(move |event| {
                let viewport = event
                    .viewport_size()
                    .unwrap_or_else(|| host.viewport_size());
                let metrics =
                    SurfaceMetrics::compute(viewport, host.device_pixel_ratio(), max_pixel_ratio);
                if let Some(surface) = slot.borrow_mut().as_mut() {
                    surface.configure(&metrics);
                    metrics_cell.set(Some(metrics));
                    tracing::trace!(
                        "Overlay resized to {}x{} physical",
                        metrics.physical_width,
                        metrics.physical_height
                    );
                }
            }),
        );

        match registered {
            Ok(id) => {
                self.resize_listener = Some(id);
                Ok(())
            }
            Err(err) => {
                self.stop();
                Err(err)
            }
        }
    }

    /// Remove the resize listener and detach the overlay
    ///
    /// Safe to call repeatedly, and safe when the overlay was already
    /// removed by someone else.
    pub fn stop(&mut self) {
        if let Some(id) = self.resize_listener.take() {
            self.host.remove_listener(id);
        }

        let surface = self.slot.borrow_mut().take();
        if let Some(mut surface) = surface {
            if !surface.is_attached() {
                tracing::debug!("Overlay was already removed from the document");
            }
            if let Err(err) = surface.detach() {
                tracing::debug!("Ignoring overlay detach failure: {}", err);
            }
        }

        self.metrics.set(None);
    }

    /// Whether a surface is currently owned
    pub fn is_started(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Run `f` against the drawing context of the current surface
    pub fn with_drawing_context<R>(
        &self,
        f: impl FnOnce(&mut <H::Surface as Surface>::Context) -> R,
    ) -> Option<R> {
        self.handle().with_context(f)
    }

    /// Cloneable accessor for the surface, for use inside callbacks
    pub fn handle(&self) -> SurfaceHandle<H::Surface> {
        SurfaceHandle {
            slot: Rc::clone(&self.slot),
        }
    }

    /// Current logical viewport size
    pub fn viewport_size(&self) -> Size {
        match self.metrics.get() {
            Some(metrics) => metrics.logical_size,
            None => self.host.viewport_size(),
        }
    }

    /// Metrics last applied to the surface
    pub fn metrics(&self) -> Option<SurfaceMetrics> {
        self.metrics.get()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: Host> Drop for SurfaceManager<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use trailglow_core::{DrawCommand, DrawContext};

    #[test]
    fn test_metrics_cap_pixel_ratio() {
        let metrics = SurfaceMetrics::compute(Size::new(800.0, 600.0), 3.0, 2.0);
        assert_eq!(metrics.scale, 2.0);
        assert_eq!((metrics.physical_width, metrics.physical_height), (1600, 1200));
    }

    #[test]
    fn test_metrics_floor_fractional_sizes() {
        let metrics = SurfaceMetrics::compute(Size::new(333.0, 101.0), 1.5, 2.0);
        assert_eq!((metrics.physical_width, metrics.physical_height), (499, 151));
    }

    #[test]
    fn test_metrics_missing_ratio_defaults_to_one() {
        for ratio in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let metrics = SurfaceMetrics::compute(Size::new(100.0, 50.0), ratio, 2.0);
            assert_eq!(metrics.scale, 1.0);
            assert_eq!((metrics.physical_width, metrics.physical_height), (100, 50));
        }
    }

    #[test]
    fn test_overlay_config_from_toml() {
        let config: OverlayConfig = toml::from_str("z_index = 40").unwrap();
        assert_eq!(config.z_index, 40);
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert!(config.css_text().contains("pointer-events:none"));
        assert!(config.css_text().ends_with("z-index:40"));
    }

    #[test]
    fn test_start_attaches_and_scales() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0)).with_pixel_ratio(3.0);
        let mut manager = SurfaceManager::new(host.clone());

        manager.start().unwrap();

        assert_eq!(host.attached_surface_count(), 1);
        assert_eq!(host.listener_count_for(EventKind::Resize), 1);
        let metrics = manager.metrics().unwrap();
        assert_eq!(metrics.scale, 2.0);
        assert_eq!(metrics.physical_width, 1600);

        let transform = manager.with_drawing_context(|ctx| ctx.transform()).unwrap();
        assert_eq!(transform, Affine2D::uniform_scale(2.0));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let mut manager = SurfaceManager::new(host.clone());

        manager.start().unwrap();
        assert_eq!(manager.start(), Err(PlatformError::AlreadyStarted));
        assert_eq!(host.attached_surface_count(), 1);
    }

    #[test]
    fn test_resize_reconfigures_surface() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0)).with_pixel_ratio(2.0);
        let mut manager = SurfaceManager::new(host.clone());
        manager.start().unwrap();

        host.resize(400.0, 300.0);

        let metrics = manager.metrics().unwrap();
        assert_eq!(metrics.logical_size, Size::new(400.0, 300.0));
        assert_eq!((metrics.physical_width, metrics.physical_height), (800, 600));
        assert_eq!(manager.viewport_size(), Size::new(400.0, 300.0));

        let last = manager
            .with_drawing_context(|ctx| ctx.commands().last().cloned())
            .flatten();
        assert_eq!(
            last,
            Some(DrawCommand::SetTransform(Affine2D::uniform_scale(2.0)))
        );
    }

    #[test]
    fn test_stop_removes_everything_and_is_idempotent() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let mut manager = SurfaceManager::new(host.clone());
        manager.start().unwrap();

        manager.stop();
        manager.stop();

        assert_eq!(host.attached_surface_count(), 0);
        assert_eq!(host.listener_count(), 0);
        assert!(manager.with_drawing_context(|_| ()).is_none());

        // A resize after stop must not touch anything
        host.resize(100.0, 100.0);
        assert!(manager.metrics().is_none());
    }

    #[test]
    fn test_stop_tolerates_external_removal() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        let mut manager = SurfaceManager::new(host.clone());
        manager.start().unwrap();

        host.remove_all_surfaces();
        manager.stop();

        assert_eq!(host.listener_count(), 0);
        assert!(!manager.is_started());
    }

    #[test]
    fn test_unavailable_surface_leaves_nothing_attached() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        host.set_surface_available(false);
        let mut manager = SurfaceManager::new(host.clone());

        assert!(matches!(
            manager.start(),
            Err(PlatformError::SurfaceUnavailable(_))
        ));
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.attached_surface_count(), 0);
    }

    #[test]
    fn test_missing_context_detaches_surface() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        host.set_context_available(false);
        let mut manager = SurfaceManager::new(host.clone());

        assert!(matches!(
            manager.start(),
            Err(PlatformError::SurfaceUnavailable(_))
        ));
        assert_eq!(host.attached_surface_count(), 0);
        assert_eq!(host.listener_count(), 0);
        assert!(!manager.is_started());
    }

    #[test]
    fn test_drop_stops_manager() {
        let host = HeadlessHost::new(Size::new(800.0, 600.0));
        {
            let mut manager = SurfaceManager::new(host.clone());
            manager.start().unwrap();
        }
        assert_eq!(host.attached_surface_count(), 0);
        assert_eq!(host.listener_count(), 0);
    }
}
