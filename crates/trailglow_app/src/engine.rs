//! Trail engine lifecycle
//!
//! [`TrailEngine`] is the one object a host page deals with. `start` mounts
//! the overlay, subscribes to pointer moves and begins the frame loop;
//! `stop` undoes all of it.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use trailglow_animation::{FieldStats, ParticleField};
use trailglow_platform::{EventKind, Host, ListenerId, PlatformError, SurfaceManager};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::frame_loop::FrameLoop;

/// Lifecycle state of a [`TrailEngine`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// Not started, or stopped
    #[default]
    Idle,
    /// Overlay attached, listening and animating
    Running,
    /// Started, but the host had no usable surface; nothing is attached
    Inert,
}

/// Pointer-driven particle trail over a host viewport
pub struct TrailEngine<H: Host> {
    host: H,
    config: EngineConfig,
    surface: SurfaceManager<H>,
    field: Rc<RefCell<ParticleField>>,
    frame_loop: FrameLoop<H>,
    pointer_listener: Option<ListenerId>,
    state: EngineState,
}

impl<H: Host> TrailEngine<H> {
    /// Engine with default settings, seeded by the host
    pub fn new(host: H) -> Self {
        let field = ParticleField::new(host.random_seed());
        Self::assemble(host, EngineConfig::default(), field)
    }

    /// Engine with custom settings, seeded by the host
    pub fn with_config(host: H, config: EngineConfig) -> Result<Self> {
        let seed = host.random_seed();
        Self::with_seed(host, config, seed)
    }

    /// Engine with custom settings and a fixed random seed
    pub fn with_seed(host: H, config: EngineConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let field = ParticleField::with_config(config.trail.clone(), seed)?;
        Ok(Self::assemble(host, config, field))
    }

    fn assemble(host: H, config: EngineConfig, field: ParticleField) -> Self {
        Self {
            surface: SurfaceManager::with_config(host.clone(), config.overlay.clone()),
            frame_loop: FrameLoop::new(host.clone()),
            field: Rc::new(RefCell::new(field)),
            pointer_listener: None,
            state: EngineState::Idle,
            host,
            config,
        }
    }

    /// Mount the effect
    ///
    /// Never fails from the caller's point of view: if the host cannot
    /// provide a drawing surface the engine goes [`EngineState::Inert`] and
    /// does no work until stopped. Returns the resulting state.
    pub fn start(&mut self) -> EngineState {
        if let Err(err) = self.try_start() {
            tracing::debug!("Trail engine not running: {}", err);
        }
        self.state
    }

    /// Mount the effect, reporting why it could not start
    pub fn try_start(&mut self) -> Result<()> {
        if self.state == EngineState::Running {
            tracing::warn!("TrailEngine::start() called while already running");
            return Err(PlatformError::AlreadyStarted.into());
        }

        if let Err(err) = self.attach() {
            self.detach();
            self.state = EngineState::Inert;
            return Err(err);
        }

        self.state = EngineState::Running;
        tracing::debug!(
            "Trail engine running on {} host ({} x {})",
            self.host.name(),
            self.surface.viewport_size().width,
            self.surface.viewport_size().height
        );
        Ok(())
    }

    fn attach(&mut self) -> Result<()> {
        self.surface.start()?;

        let field = Rc::clone(&self.field);
        let listener = self.host.add_listener(
            EventKind::PointerMove,
            Box::new(move |event| {
                if let Some(position) = event.pointer_position() {
                    field.borrow_mut().spawn(position.x, position.y);
                }
            }),
        )?;
        self.pointer_listener = Some(listener);

        let field = Rc::clone(&self.field);
        let surface = self.surface.handle();
        self.frame_loop.start(move |_timestamp| {
            surface.with_context(|ctx| field.borrow_mut().tick(ctx));
        })?;
        Ok(())
    }

    fn detach(&mut self) {
        self.frame_loop.stop();
        if let Some(id) = self.pointer_listener.take() {
            self.host.remove_listener(id);
        }
        self.surface.stop();
    }

    /// Unmount the effect and drop every live particle
    ///
    /// Idempotent. After it returns no spawn or tick runs until the next
    /// start.
    pub fn stop(&mut self) {
        self.detach();
        match self.field.try_borrow_mut() {
            Ok(mut field) => field.clear(),
            Err(_) => tracing::warn!("Particle field busy during stop, particles not cleared"),
        }

        if self.state != EngineState::Idle {
            tracing::debug!("Trail engine stopped after {} frames", self.frame_loop.frame_count());
        }
        self.state = EngineState::Idle;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Number of live particles
    pub fn particle_count(&self) -> usize {
        self.field.borrow().len()
    }

    pub fn stats(&self) -> FieldStats {
        self.field.borrow().stats()
    }

    /// Frames animated since the last start
    pub fn frame_count(&self) -> u64 {
        self.frame_loop.frame_count()
    }

    /// Read access to the particle field
    pub fn with_field<R>(&self, f: impl FnOnce(&ParticleField) -> R) -> R {
        f(&self.field.borrow())
    }

    pub fn surface(&self) -> &SurfaceManager<H> {
        &self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: Host> Drop for TrailEngine<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
