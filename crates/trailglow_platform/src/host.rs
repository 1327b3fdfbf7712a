//! Host environment abstraction
//!
//! A [`Host`] is whatever embeds the overlay: a browser window, or the
//! in-memory [`HeadlessHost`](crate::HeadlessHost). Everything runs on one
//! thread, so callbacks are plain boxed closures without `Send` bounds and
//! handles are cheap `Clone`s of shared state.

use slotmap::new_key_type;
use trailglow_core::{DrawContext, Size};

use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::surface::{OverlayConfig, SurfaceMetrics};

new_key_type! {
    /// Handle to a registered event listener
    pub struct ListenerId;
    /// Handle to a pending animation frame request
    pub struct FrameHandle;
}

/// Callback invoked for every event of the kind it was registered for
pub type EventCallback = Box<dyn FnMut(&Event)>;

/// Callback invoked once, on the next frame, with a timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host environment trait
///
/// Implemented by each platform backend (web, headless) to give the engine
/// viewport information, an overlay surface, event delivery, and frame
/// scheduling.
pub trait Host: Clone + 'static {
    /// The overlay surface type for this host
    type Surface: Surface;

    /// Get the host name, e.g. "web" or "headless"
    fn name(&self) -> &'static str;

    /// Current viewport size in logical pixels
    fn viewport_size(&self) -> Size;

    /// Physical pixels per logical pixel
    fn device_pixel_ratio(&self) -> f64;

    /// Seed for the particle random number generator
    fn random_seed(&self) -> u64;

    /// Create and attach a full-viewport overlay surface
    fn create_surface(&self, config: &OverlayConfig) -> Result<Self::Surface>;

    /// Register a listener for one kind of event
    fn add_listener(&self, kind: EventKind, callback: EventCallback) -> Result<ListenerId>;

    /// Remove a listener; returns false if it was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Schedule `callback` for the next frame
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle>;

    /// Cancel a pending frame; returns false if it already ran or was unknown
    fn cancel_frame(&self, handle: FrameHandle) -> bool;
}

/// Overlay surface trait
///
/// A surface is attached to the host's document when created and stays
/// attached until [`detach`](Surface::detach) is called or something outside
/// the engine removes it.
pub trait Surface: 'static {
    /// The drawing context type for this surface
    type Context: DrawContext;

    /// Apply new metrics: backing store size, display size, and scale transform
    fn configure(&mut self, metrics: &SurfaceMetrics);

    /// The drawing context, or None if the surface could not provide one
    fn context_mut(&mut self) -> Option<&mut Self::Context>;

    /// Whether the surface is still part of the host document
    fn is_attached(&self) -> bool;

    /// Remove the surface from the host document
    ///
    /// A surface that is already gone is not an error.
    fn detach(&mut self) -> Result<()>;
}
