//! Trailglow Platform Abstraction Layer
//!
//! This crate provides the host-facing side of the overlay: platform-agnostic
//! traits for the embedding environment, and the manager for the single
//! overlay surface the particle trail draws on.
//!
//! # Architecture
//!
//! - [`Host`] - Viewport, pixel ratio, event listeners, frame scheduling
//! - [`Surface`] - A full-viewport overlay with a drawing context
//! - [`SurfaceManager`] - Creates, sizes, resizes, and removes the overlay
//!
//! # Host Implementations
//!
//! - [`HeadlessHost`] - In-memory host for simulation and tests
//! - `trailglow_platform_web` - Browser window and canvas via `web-sys`
//!
//! # Example
//!
//! ```rust
//! use trailglow_platform::prelude::*;
//! use trailglow_core::Size;
//!
//! let host = HeadlessHost::new(Size::new(800.0, 600.0)).with_pixel_ratio(2.0);
//! let mut overlay = SurfaceManager::new(host.clone());
//! overlay.start().unwrap();
//!
//! host.resize(400.0, 300.0);
//! assert_eq!(overlay.metrics().map(|m| m.physical_width), Some(800));
//!
//! overlay.stop();
//! assert_eq!(host.attached_surface_count(), 0);
//! ```

mod error;
mod event;
mod headless;
mod host;
mod surface;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use event::{Event, EventKind, InputEvent, WindowEvent};
pub use headless::{HeadlessHost, HeadlessSurface, SurfaceId};
pub use host::{EventCallback, FrameCallback, FrameHandle, Host, ListenerId, Surface};
pub use surface::{OverlayConfig, SurfaceHandle, SurfaceManager, SurfaceMetrics};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{Event, EventKind, InputEvent, WindowEvent};
    pub use crate::headless::HeadlessHost;
    pub use crate::host::{Host, Surface};
    pub use crate::surface::{OverlayConfig, SurfaceManager, SurfaceMetrics};
}
