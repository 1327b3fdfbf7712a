//! Trailglow Application Layer
//!
//! Mounts the particle trail on a host: one overlay surface, one pointer
//! listener, one frame loop, all owned by a [`TrailEngine`].
//!
//! # Example
//!
//! ```rust
//! use trailglow_app::prelude::*;
//! use trailglow_core::Size;
//! use trailglow_platform::HeadlessHost;
//!
//! let host = HeadlessHost::new(Size::new(800.0, 600.0));
//! let mut engine = TrailEngine::new(host.clone());
//! assert_eq!(engine.start(), EngineState::Running);
//!
//! host.pointer_move(120.0, 80.0);
//! host.run_frame();
//! assert!(engine.particle_count() >= 6);
//!
//! engine.stop();
//! assert_eq!(host.listener_count(), 0);
//! ```

mod config;
mod engine;
mod error;
mod frame_loop;


pub use config::EngineConfig;
pub use engine::{EngineState, TrailEngine};
pub use error::{Result, TrailError};
pub use frame_loop::FrameLoop;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{EngineState, TrailEngine};
    pub use crate::error::{Result, TrailError};

    pub use trailglow_animation::{FieldStats, TrailConfig};
    pub use trailglow_platform::{Host, OverlayConfig};
}
