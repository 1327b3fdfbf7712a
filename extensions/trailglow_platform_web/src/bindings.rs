//! JavaScript-facing API

use trailglow_app::{EngineState, TrailEngine};
use wasm_bindgen::prelude::*;

use crate::host::WebHost;
use crate::logging::init_logging;

/// Pointer trail overlay for the current page
///
/// Call `start()` when the host section mounts and `stop()` when it
/// unmounts. Both are safe to call repeatedly.
#[wasm_bindgen]
pub struct ParticleTrail {
    engine: TrailEngine<WebHost>,
}

#[wasm_bindgen]
impl ParticleTrail {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ParticleTrail, JsValue> {
        init_logging(tracing::Level::INFO);

        let host = WebHost::new().map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self {
            engine: TrailEngine::new(host),
        })
    }

    /// Attach the overlay and begin animating
    ///
    /// Returns false when the page could not provide a 2D canvas; the trail
    /// then stays inactive without raising an error.
    pub fn start(&mut self) -> bool {
        self.engine.start() == EngineState::Running
    }

    /// Remove the overlay and every listener, and drop all particles
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.engine.particle_count()
    }
}
