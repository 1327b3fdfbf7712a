//! In-memory host
//!
//! `HeadlessHost` behaves like a browser window without one: it has a
//! viewport and a pixel ratio, keeps a registry of overlay surfaces standing
//! in for document nodes, delivers synthetic events to registered listeners,
//! and runs frame callbacks only when asked to. The CLI simulator and the
//! test suites drive the engine through it.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use trailglow_core::{DrawContext, RecordingContext, Size};

use crate::error::{PlatformError, Result};
use crate::event::{Event, EventKind};
use crate::host::{EventCallback, FrameCallback, FrameHandle, Host, ListenerId, Surface};
use crate::surface::{OverlayConfig, SurfaceMetrics};

new_key_type! {
    /// Identifies an overlay node in the headless document
    pub struct SurfaceId;
}

/// Frame interval used for synthetic timestamps (60 Hz)
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

type SharedCallback = Rc<RefCell<EventCallback>>;

struct Listener {
    kind: EventKind,
    callback: SharedCallback,
}

struct HeadlessState {
    viewport: Size,
    device_pixel_ratio: f64,
    seed: u64,
    listeners: SlotMap<ListenerId, Listener>,
    frames: SlotMap<FrameHandle, FrameCallback>,
    surfaces: SlotMap<SurfaceId, OverlayConfig>,
    surface_available: bool,
    context_available: bool,
    timestamp: f64,
    frames_run: u64,
}

/// In-memory [`Host`] implementation
#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    /// Create a host with a viewport in logical pixels and a pixel ratio of 1
    pub fn new(viewport: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                viewport,
                device_pixel_ratio: 1.0,
                seed: 0x7261_696c_676c_6f77,
                listeners: SlotMap::with_key(),
                frames: SlotMap::with_key(),
                surfaces: SlotMap::with_key(),
                surface_available: true,
                context_available: true,
                timestamp: 0.0,
                frames_run: 0,
            })),
        }
    }

    /// Set the device pixel ratio
    pub fn with_pixel_ratio(self, ratio: f64) -> Self {
        self.state.borrow_mut().device_pixel_ratio = ratio;
        self
    }

    /// Set the seed handed out by [`Host::random_seed`]
    pub fn with_seed(self, seed: u64) -> Self {
        self.state.borrow_mut().seed = seed;
        self
    }

    /// Make `create_surface` fail (or succeed again)
    pub fn set_surface_available(&self, available: bool) {
        self.state.borrow_mut().surface_available = available;
    }

    /// Create surfaces without a drawing context (or with one again)
    pub fn set_context_available(&self, available: bool) {
        self.state.borrow_mut().context_available = available;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Synthetic input
    // ═══════════════════════════════════════════════════════════════════════

    /// Change the viewport and deliver a resize event
    pub fn resize(&self, width: f32, height: f32) {
        self.state.borrow_mut().viewport = Size::new(width, height);
        self.dispatch(&Event::resized(width, height));
    }

    /// Deliver a pointer move event
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.dispatch(&Event::pointer_moved(x, y));
    }

    /// Deliver an event to every listener registered for its kind
    ///
    /// Returns the number of listeners that received it.
    pub fn dispatch(&self, event: &Event) -> usize {
        let kind = event.kind();
        let targets: SmallVec<[(ListenerId, SharedCallback); 4]> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(_, listener)| listener.kind == kind)
            .map(|(id, listener)| (id, Rc::clone(&listener.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in &targets {
            // Listeners removed by an earlier callback in this dispatch are skipped
            if !self.state.borrow().listeners.contains_key(*id) {
                continue;
            }
            (callback.borrow_mut())(event);
            delivered += 1;
        }
        delivered
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Frame pumping
    // ═══════════════════════════════════════════════════════════════════════

    /// Run every frame callback that is currently pending
    ///
    /// Callbacks requested while this frame runs wait for the next call.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let (callbacks, timestamp) = {
            let mut state = self.state.borrow_mut();
            state.timestamp += FRAME_INTERVAL_MS;
            state.frames_run += 1;
            let handles: Vec<FrameHandle> = state.frames.keys().collect();
            let callbacks: Vec<FrameCallback> = handles
                .into_iter()
                .filter_map(|handle| state.frames.remove(handle))
                .collect();
            (callbacks, state.timestamp)
        };

        let count = callbacks.len();
        for callback in callbacks {
            callback(timestamp);
        }
        count
    }

    /// Run `n` frames, returning the total number of callbacks run
    pub fn run_frames(&self, n: usize) -> usize {
        (0..n).map(|_| self.run_frame()).sum()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════════

    /// Number of frame callbacks waiting to run
    pub fn pending_frame_count(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Number of registered listeners of any kind
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Number of registered listeners of one kind
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    /// Number of overlay surfaces attached to the headless document
    pub fn attached_surface_count(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    /// Remove every overlay from the document behind the engine's back
    pub fn remove_all_surfaces(&self) {
        self.state.borrow_mut().surfaces.clear();
    }

    /// Frames run so far
    pub fn frames_run(&self) -> u64 {
        self.state.borrow().frames_run
    }
}

impl Host for HeadlessHost {
    type Surface = HeadlessSurface;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn viewport_size(&self) -> Size {
        self.state.borrow().viewport
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.state.borrow().device_pixel_ratio
    }

    fn random_seed(&self) -> u64 {
        self.state.borrow().seed
    }

    fn create_surface(&self, config: &OverlayConfig) -> Result<HeadlessSurface> {
        let mut state = self.state.borrow_mut();
        if !state.surface_available {
            return Err(PlatformError::SurfaceUnavailable(
                "headless surface creation disabled".to_string(),
            ));
        }

        let id = state.surfaces.insert(config.clone());
        let context = state
            .context_available
            .then(|| RecordingContext::new(state.viewport));

        Ok(HeadlessSurface {
            id,
            state: Rc::clone(&self.state),
            context,
            metrics: None,
        })
    }

    fn add_listener(&self, kind: EventKind, callback: EventCallback) -> Result<ListenerId> {
        Ok(self.state.borrow_mut().listeners.insert(Listener {
            kind,
            callback: Rc::new(RefCell::new(callback)),
        }))
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.borrow_mut().listeners.remove(id).is_some()
    }

    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        Ok(self.state.borrow_mut().frames.insert(callback))
    }

    fn cancel_frame(&self, handle: FrameHandle) -> bool {
        self.state.borrow_mut().frames.remove(handle).is_some()
    }
}

/// Overlay surface of a [`HeadlessHost`], drawing into a [`RecordingContext`]
pub struct HeadlessSurface {
    id: SurfaceId,
    state: Rc<RefCell<HeadlessState>>,
    context: Option<RecordingContext>,
    metrics: Option<SurfaceMetrics>,
}

impl HeadlessSurface {
    /// Metrics applied by the last `configure`
    pub fn metrics(&self) -> Option<SurfaceMetrics> {
        self.metrics
    }

    /// Overlay settings the surface was created with
    pub fn overlay_config(&self) -> Option<OverlayConfig> {
        self.state.borrow().surfaces.get(self.id).cloned()
    }
}

impl Surface for HeadlessSurface {
    type Context = RecordingContext;

    fn configure(&mut self, metrics: &SurfaceMetrics) {
        self.metrics = Some(*metrics);
        if let Some(context) = self.context.as_mut() {
            context.set_viewport(metrics.logical_size);
            context.set_transform(metrics.transform());
        }
    }

    fn context_mut(&mut self) -> Option<&mut RecordingContext> {
        self.context.as_mut()
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().surfaces.contains_key(self.id)
    }

    fn detach(&mut self) -> Result<()> {
        self.state.borrow_mut().surfaces.remove(self.id);
        Ok(())
    }
}
