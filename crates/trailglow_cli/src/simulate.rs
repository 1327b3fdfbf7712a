//! Headless simulation
//!
//! Runs a real [`TrailEngine`] on a [`HeadlessHost`], sweeping a synthetic
//! pointer across the viewport, and reports what the engine did and whether
//! stopping it left anything behind.

use std::f32::consts::{PI, TAU};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use trailglow_animation::FieldStats;
use trailglow_app::{EngineConfig, EngineState, TrailEngine};
use trailglow_core::{Point, Size};
use trailglow_platform::HeadlessHost;

/// Parameters of one simulation run
#[derive(Clone, Debug)]
pub struct SimulateOptions {
    pub frames: usize,
    pub moves: usize,
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f64,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            frames: 180,
            moves: 60,
            width: 1280.0,
            height: 720.0,
            pixel_ratio: 1.0,
            seed: None,
            config: None,
        }
    }
}

/// What was left on the host after the engine stopped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub listeners: usize,
    pub pending_frames: usize,
    pub surfaces: usize,
    pub particles: usize,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub state: EngineState,
    pub frames: u64,
    pub pointer_moves: usize,
    pub viewport: [f32; 2],
    pub physical_size: [u32; 2],
    pub peak_particles: usize,
    pub final_particles: usize,
    pub stats: FieldStats,
    pub teardown: TeardownReport,
}

/// Pointer position for step `index` of `steps` along a 3:2 Lissajous curve
pub fn pointer_path(index: usize, steps: usize, viewport: Size) -> Point {
    let t = index as f32 / steps.max(1) as f32;
    Point::new(
        viewport.width * (0.5 + 0.4 * (3.0 * TAU * t).sin()),
        viewport.height * (0.5 + 0.4 * (2.0 * TAU * t + PI / 2.0).sin()),
    )
}

pub fn run(options: &SimulateOptions) -> Result<SimulationReport> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let seed = options.seed.unwrap_or_else(clock_seed);
    let viewport = Size::new(options.width, options.height);

    let host = HeadlessHost::new(viewport)
        .with_pixel_ratio(options.pixel_ratio)
        .with_seed(seed);
    let mut engine = TrailEngine::with_config(host.clone(), config)
        .context("Invalid engine configuration")?;

    let state = engine.start();
    info!("Simulating {} frames on {}x{} (seed {})", options.frames, options.width, options.height, seed);

    let physical_size = engine
        .surface()
        .metrics()
        .map(|m| [m.physical_width, m.physical_height])
        .unwrap_or_default();

    let mut peak_particles = 0;
    for frame in 0..options.frames {
        if frame < options.moves {
            let pointer = pointer_path(frame, options.moves, viewport);
            host.pointer_move(pointer.x, pointer.y);
        }
        host.run_frame();

        let live = engine.particle_count();
        peak_particles = peak_particles.max(live);
        if frame % 60 == 0 {
            debug!("Frame {}: {} live particles", frame, live);
        }
    }

    let frames = engine.frame_count();
    let final_particles = engine.particle_count();
    let stats = engine.stats();
    engine.stop();

    let teardown = TeardownReport {
        listeners: host.listener_count(),
        pending_frames: host.pending_frame_count(),
        surfaces: host.attached_surface_count(),
        particles: engine.particle_count(),
    };

    Ok(SimulationReport {
        seed,
        state,
        frames,
        pointer_moves: options.moves.min(options.frames),
        viewport: [options.width, options.height],
        physical_size,
        peak_particles,
        final_particles,
        stats,
        teardown,
    })
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

pub fn print_report(report: &SimulationReport) {
    println!("Trailglow simulation");
    println!("====================");
    println!("Seed:            {}", report.seed);
    println!("Engine state:    {:?}", report.state);
    println!(
        "Viewport:        {}x{} ({}x{} physical)",
        report.viewport[0], report.viewport[1], report.physical_size[0], report.physical_size[1]
    );
    println!("Frames:          {}", report.frames);
    println!("Pointer moves:   {}", report.pointer_moves);
    println!("Peak particles:  {}", report.peak_particles);
    println!("Final particles: {}", report.final_particles);
    println!("Spawned:         {}", report.stats.spawned_total);
    println!("Evicted:         {}", report.stats.evicted_total);
    println!("Expired:         {}", report.stats.expired_total);
    println!();
    if report.teardown.is_clean() {
        println!("Teardown:        clean");
    } else {
        println!(
            "Teardown:        {} listeners, {} pending frames, {} surfaces, {} particles left",
            report.teardown.listeners,
            report.teardown.pending_frames,
            report.teardown.surfaces,
            report.teardown.particles
        );
    }
}
