//! Trailglow CLI
//!
//! Simulate the pointer trail headlessly and manage engine config files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trailglow_app::EngineConfig;

mod simulate;

use simulate::SimulateOptions;

#[derive(Parser)]
#[command(name = "trailglow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pointer-driven particle trail overlay", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine on an in-memory host with a synthetic pointer
    Simulate {
        /// Frames to animate
        #[arg(short, long, default_value = "180")]
        frames: usize,

        /// Pointer moves, one per frame from the first frame
        #[arg(short, long, default_value = "60")]
        moves: usize,

        /// Viewport width in logical pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height in logical pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Device pixel ratio
        #[arg(long, default_value = "1.0")]
        dpr: f64,

        /// Random seed (defaults to the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Engine config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine config as TOML
    Config,

    /// Validate an engine config file
    Check {
        /// Config file (TOML)
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            frames,
            moves,
            width,
            height,
            dpr,
            seed,
            config,
            json,
        } => cmd_simulate(
            SimulateOptions {
                frames,
                moves,
                width,
                height,
                pixel_ratio: dpr,
                seed,
                config,
            },
            json,
        ),

        Commands::Config => cmd_config(),

        Commands::Check { path } => cmd_check(&path),
    }
}

fn cmd_simulate(options: SimulateOptions, json: bool) -> Result<()> {
    let report = simulate::run(&options)?;

    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{text}");
    } else {
        simulate::print_report(&report);
    }

    if !report.teardown.is_clean() {
        anyhow::bail!("Engine left resources behind after stop: {:?}", report.teardown);
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let text = EngineConfig::default().to_toml()?;
    print!("{text}");
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let config =
        EngineConfig::load(path).with_context(|| format!("{} is not a valid config", path.display()))?;

    info!("Config {} is valid", path.display());
    println!(
        "{}: ok (z-index {}, up to {} particles)",
        path.display(),
        config.overlay.z_index,
        config.trail.max_particles
    );
    Ok(())
}
