//! Strike Simulation Runner
//!
//! Loads a simulation config, runs it headless and prints a JSON summary.
//!
//! Run with: cargo run -p strike_runtime -- [config.toml]

use std::path::PathBuf;
use std::process::ExitCode;

use strike_runtime::{SimConfig, World};

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let path = std::env::args().nth(1).map(PathBuf::from);

    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>) -> strike_runtime::Result<()> {
    let config = SimConfig::load(path.as_deref())?;
    config.print_summary();

    let mut world = World::from_config(&config)?;
    let summary = world.run(config.sim.frames);

    log::info!(
        "Finished {} frames: {} switches, {} shots, {} dry fires",
        summary.stats.frames,
        summary.stats.switches,
        summary.stats.shots_fired,
        summary.stats.dry_fires
    );
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize summary: {}", e),
    }
    Ok(())
}
