//! Vault quote simulator - Entry Point
//!
//! Replays a TOML scenario block by block and prints every quote event as
//! one JSON line on stdout.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Vault quote simulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file path (can also be set via VAULT_SIM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the scenario's block count
    #[arg(short, long)]
    blocks: Option<u32>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    dump_metrics: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    vault_telemetry::init_logging()?;

    info!("Starting vault-sim v{}", env!("CARGO_PKG_VERSION"));

    let mut config = vault_sim::SimConfig::load(args.config)?;
    if let Some(blocks) = args.blocks {
        config.block.count = blocks;
    }
    info!(
        start_height = config.block.start_height,
        blocks = config.block.count,
        vaults = config.vaults.len(),
        "Configuration loaded"
    );

    let mut sim = vault_sim::Simulation::new(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut total_events = 0usize;
    let mut total_failures = 0usize;
    while !sim.is_finished() {
        let outcome = sim.step()?;
        for event in &outcome.events {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        }
        total_events += outcome.events.len();
        total_failures += outcome.report.failed.len();
    }
    out.flush()?;

    info!(
        events = total_events,
        vault_failures = total_failures,
        resting_orders = sim.book().len(),
        "Simulation finished"
    );

    if args.dump_metrics {
        eprint!("{}", vault_telemetry::encode_metrics()?);
    }

    Ok(())
}
