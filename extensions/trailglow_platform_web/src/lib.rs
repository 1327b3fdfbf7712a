//! Trailglow Web Platform
//!
//! Browser backend for the particle trail, built on `web-sys`.
//!
//! This crate implements the `trailglow_platform` traits for a browser page:
//! [`WebHost`] wraps `window`/`document`, [`CanvasSurface`] is a fixed
//! full-viewport `<canvas>` appended to `<body>`, and [`ParticleTrail`] is the
//! class a page script uses to mount and unmount the effect.
//!
//! # Example
//!
//! ```js
//! import init, { ParticleTrail } from "./trailglow_platform_web.js";
//!
//! await init();
//! const trail = new ParticleTrail();
//! trail.start();
//! // ...when the page section goes away
//! trail.stop();
//! ```
#![cfg(target_arch = "wasm32")]

mod bindings;
mod canvas;
mod host;
mod logging;

pub use bindings::ParticleTrail;
pub use canvas::{CanvasContext, CanvasSurface};
pub use host::WebHost;
pub use logging::init_logging;

use wasm_bindgen::JsValue;

/// Best-effort text for a thrown JS value
pub(crate) fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
