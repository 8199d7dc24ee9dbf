//! Verlet Grid headless driver
//!
//! Runs the solver with the spawner for a fixed number of frames and logs
//! progress.

use std::path::PathBuf;

use clap::Parser;
use verlet_grid::render::{extract_instances, instance_bytes};
use verlet_grid::{ConfigError, Solver, SolverConfig, Spawner, SpawnerConfig};

#[derive(Parser, Debug)]
#[command(name = "verlet-grid", version, about = "Headless 2D Verlet particle solver")]
struct Args {
    /// Solver config JSON (defaults when omitted)
    config: Option<PathBuf>,
    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// Spawner config JSON (defaults when omitted)
    #[arg(long)]
    spawner: Option<PathBuf>,
    /// Log frame stats every N frames (0 disables)
    #[arg(long, default_value_t = 60)]
    stats_every: u64,
}

fn load_configs(args: &Args) -> Result<(SolverConfig, SpawnerConfig), ConfigError> {
    let solver = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => {
            log::info!("Using default solver config");
            SolverConfig::default()
        }
    };
    let spawner = match &args.spawner {
        Some(path) => SpawnerConfig::load(path)?,
        None => SpawnerConfig::default(),
    };
    Ok((solver, spawner))
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    log::info!("Verlet Grid (headless) starting...");

    let (config, spawner_config) = match load_configs(&args) {
        Ok(configs) => configs,
        Err(err) => {
            log::error!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };
    let mut solver = match Solver::new(config) {
        Ok(solver) => solver,
        Err(err) => {
            log::error!("Invalid config: {err}");
            std::process::exit(1);
        }
    };
    let mut spawner = Spawner::new(spawner_config);

    for frame in 1..=args.frames {
        spawner.step(&mut solver);
        let stats = solver.update();

        if args.stats_every > 0 && frame % args.stats_every == 0 {
            match serde_json::to_string(&stats) {
                Ok(json) => log::info!("frame {frame}: {} particles {json}", solver.len()),
                Err(err) => log::warn!("frame {frame}: stats not serializable: {err}"),
            }
        }
    }

    if let Err(err) = solver.verify_grid() {
        log::error!("Grid out of sync: {err}");
    }
    let instances = extract_instances(&solver);
    println!(
        "{} frames, {} particles, {} instance bytes",
        solver.frame(),
        solver.len(),
        instance_bytes(&instances).len()
    );
}
