mod basin;
mod cli;
mod concat_cmd;
mod config;
mod convert;
mod flood_cmd;
mod global_cmd;
mod logging;
mod naming;
mod rp_maps_cmd;
mod tc_cmd;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::DriskConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(workers) = cli.workers {
        config.parallel.workers = workers;
    }
    match &cli.command {
        Command::ConcatChunks(args) => concat_cmd::run(args, &config),
        Command::Flood(args) => flood_cmd::run(args, &config),
        Command::Tc(args) => tc_cmd::run(args, &config),
        Command::RpMaps(args) => rp_maps_cmd::run(args, &config),
        Command::GlobalTc(args) => global_cmd::run(args, &config),
    }
}

/// Reads the TOML config; a missing file means all defaults.
fn load_config(path: &Path) -> Result<DriskConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(DriskConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}
