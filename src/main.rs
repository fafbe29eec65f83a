//! # kanban-sim
//!
//! Runs the supply-chain simulation end to end and prints the final report.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --days 5 --day-length-ms 200 --seed 7
//! ```

use clap::Parser;
use kanban_supply_chain::config::SimConfig;
use kanban_supply_chain::lifecycle::{setup_tracing, SupplyChainSystem};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kanban-sim")]
#[command(about = "Kanban supply-chain simulator")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "KANBAN_CONFIG")]
    config: Option<PathBuf>,

    /// Number of simulated days
    #[arg(short, long, env = "KANBAN_DAYS")]
    days: Option<u32>,

    /// Length of one simulated day in milliseconds
    #[arg(long, env = "KANBAN_DAY_LENGTH_MS")]
    day_length_ms: Option<u64>,

    /// Seed for customer demand
    #[arg(short, long, env = "KANBAN_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path).map_err(|e| e.to_string())?,
        None => SimConfig::new(),
    };
    if let Some(days) = args.days {
        config.simulation.days = days;
    }
    if let Some(day_length_ms) = args.day_length_ms {
        config.simulation.day_length_ms = day_length_ms;
    }
    if args.seed.is_some() {
        config.demand.seed = args.seed;
    }

    info!(
        days = config.simulation.days,
        factories = config.factories.len(),
        lines = config.line_count(),
        "Starting supply chain simulation"
    );

    let system = SupplyChainSystem::start(config)
        .await
        .map_err(|e| e.to_string())?;
    let report = system
        .run_to_completion()
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", report);
    info!("Simulation completed successfully");
    Ok(())
}
