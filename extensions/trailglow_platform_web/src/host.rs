//! Browser host: window, document, DOM listeners, and animation frames

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;
use trailglow_core::Size;
use trailglow_platform::{
    Event, EventCallback, EventKind, FrameCallback, FrameHandle, Host, ListenerId,
    OverlayConfig, PlatformError, Result,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas::CanvasSurface;
use crate::js_error;

struct DomListener {
    event_type: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct PendingFrame {
    request_id: i32,
    closure: Option<Closure<dyn FnMut(f64)>>,
}

struct WebHostInner {
    window: Window,
    document: Document,
    listeners: RefCell<SlotMap<ListenerId, DomListener>>,
    frames: RefCell<SlotMap<FrameHandle, PendingFrame>>,
    /// Frame closures that have fired; dropped once they can no longer be running
    spent: RefCell<Vec<Closure<dyn FnMut(f64)>>>,
}

impl WebHostInner {
    /// Called from inside a firing frame closure
    fn retire_frame(&self, handle: FrameHandle) {
        let fired = self.frames.borrow_mut().remove(handle);
        let mut spent = self.spent.borrow_mut();
        // Animation frame callbacks never nest, so earlier ones have returned
        spent.clear();
        if let Some(closure) = fired.and_then(|frame| frame.closure) {
            spent.push(closure);
        }
    }
}

impl Drop for WebHostInner {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            let _ = self.window.remove_event_listener_with_callback(
                listener.event_type,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        for (_, frame) in self.frames.get_mut().drain() {
            let _ = self.window.cancel_animation_frame(frame.request_id);
        }
    }
}

/// [`Host`] backed by the page's `window`
///
/// Cheap to clone; clones share listener and frame bookkeeping.
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<WebHostInner>,
}

impl WebHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| PlatformError::SurfaceUnavailable("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| PlatformError::SurfaceUnavailable("window has no document".to_string()))?;

        Ok(Self {
            inner: Rc::new(WebHostInner {
                window,
                document,
                listeners: RefCell::new(SlotMap::with_key()),
                frames: RefCell::new(SlotMap::with_key()),
                spent: RefCell::new(Vec::new()),
            }),
        })
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }
}

fn window_viewport(window: &Window) -> Size {
    let dimension = |value: std::result::Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Size::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

/// Translate a DOM event into an engine event of the registered kind
fn translate(kind: EventKind, event: &web_sys::Event, window: &Window) -> Option<Event> {
    match kind {
        EventKind::PointerMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(Event::pointer_moved(mouse.client_x() as f32, mouse.client_y() as f32))
        }
        EventKind::Resize => {
            let viewport = window_viewport(window);
            Some(Event::resized(viewport.width, viewport.height))
        }
    }
}

impl Host for WebHost {
    type Surface = CanvasSurface;

    fn name(&self) -> &'static str {
        "web"
    }

    fn viewport_size(&self) -> Size {
        window_viewport(&self.inner.window)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.inner.window.device_pixel_ratio()
    }

    fn random_seed(&self) -> u64 {
        let high = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        let low = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        (high << 32) | low
    }

    fn create_surface(&self, config: &OverlayConfig) -> Result<CanvasSurface> {
        let document = &self.inner.document;
        let body = document
            .body()
            .ok_or_else(|| PlatformError::SurfaceUnavailable("document has no body".to_string()))?;

        let canvas = document
            .create_element("canvas")
            .map_err(|err| PlatformError::SurfaceUnavailable(js_error(&err)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| PlatformError::SurfaceUnavailable("not a canvas element".to_string()))?;

        canvas.style().set_css_text(&config.css_text());
        if let Some(class_name) = &config.class_name {
            canvas.set_class_name(class_name);
        }
        let _ = canvas.set_attribute("aria-hidden", "true");

        body.append_child(&canvas)
            .map_err(|err| PlatformError::SurfaceUnavailable(js_error(&err)))?;

        Ok(CanvasSurface::new(canvas))
    }

    fn add_listener(&self, kind: EventKind, mut callback: EventCallback) -> Result<ListenerId> {
        let window = self.inner.window.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(event) = translate(kind, &event, &window) {
                callback(&event);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        let event_type = kind.dom_event_type();
        self.inner
            .window
            .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
            .map_err(|err| PlatformError::Listener(js_error(&err)))?;

        Ok(self
            .inner
            .listeners
            .borrow_mut()
            .insert(DomListener { event_type, closure }))
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let Some(listener) = self.inner.listeners.borrow_mut().remove(id) else {
            return false;
        };
        if let Err(err) = self.inner.window.remove_event_listener_with_callback(
            listener.event_type,
            listener.closure.as_ref().unchecked_ref(),
        ) {
            tracing::debug!("Failed to remove {} listener: {}", listener.event_type, js_error(&err));
        }
        true
    }

    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle> {
        // Reserve the handle first so the closure knows which entry it is
        let handle = self.inner.frames.borrow_mut().insert(PendingFrame {
            request_id: 0,
            closure: None,
        });

        let inner: Weak<WebHostInner> = Rc::downgrade(&self.inner);
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move |timestamp: f64| {
            if let Some(inner) = inner.upgrade() {
                inner.retire_frame(handle);
            }
            if let Some(callback) = callback.take() {
                callback(timestamp);
            }
        }) as Box<dyn FnMut(f64)>);

        let request_id = match self
            .inner
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => id,
            Err(err) => {
                self.inner.frames.borrow_mut().remove(handle);
                return Err(PlatformError::FrameScheduling(js_error(&err)));
            }
        };

        if let Some(frame) = self.inner.frames.borrow_mut().get_mut(handle) {
            frame.request_id = request_id;
            frame.closure = Some(closure);
        }
        Ok(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) -> bool {
        let Some(frame) = self.inner.frames.borrow_mut().remove(handle) else {
            return false;
        };
        if let Err(err) = self.inner.window.cancel_animation_frame(frame.request_id) {
            tracing::debug!("cancelAnimationFrame failed: {}", js_error(&err));
        }
        true
    }
}
