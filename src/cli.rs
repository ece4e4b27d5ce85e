use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// drisk displacement-risk pipeline.
#[derive(Parser)]
#[command(
    name = "drisk",
    version,
    about = "Climate-hazard displacement risk aggregation"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true, default_value = "drisk.toml")]
    pub config: PathBuf,

    /// Override the worker count from config (0 = all cores).
    #[arg(short = 'j', long, global = true)]
    pub workers: Option<usize>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Concatenate hazard chunks of one basin and correct their frequencies.
    ConcatChunks(ConcatArgs),
    /// Coastal flood displacement per admin1 unit.
    Flood(FloodArgs),
    /// Tropical cyclone displacement with ensemble differencing.
    Tc(TcArgs),
    /// Per-centroid return-period intensity maps of one TC hazard set.
    RpMaps(RpMapsArgs),
    /// Global TC sums and relative changes over every country's results.
    GlobalTc(GlobalTcArgs),
}

/// Arguments for the `concat-chunks` subcommand.
#[derive(clap::Args)]
pub struct ConcatArgs {
    /// Basin or region label embedded in the chunk names, e.g. `WP`.
    pub region: String,

    /// Climate model; omit for the present-climate set.
    #[arg(long, requires = "scenario")]
    pub model: Option<String>,

    /// Model scenario tag, e.g. `ssp370cal`.
    #[arg(long, requires = "model")]
    pub scenario: Option<String>,
}

/// Arguments for the `flood` subcommand.
#[derive(clap::Args)]
pub struct FloodArgs {
    /// ISO3 country code.
    pub iso3: String,

    /// Restrict to these RCPs instead of the configured list.
    #[arg(long = "rcp")]
    pub rcps: Vec<String>,

    /// Restrict to these reference years instead of the configured list.
    #[arg(long = "year")]
    pub years: Vec<u32>,
}

/// Arguments for the `tc` subcommand.
#[derive(clap::Args)]
pub struct TcArgs {
    /// ISO3 country code.
    pub iso3: String,

    /// Future scenario, e.g. `ssp370`.
    pub scenario: String,

    /// Mean damage ratio at which a building counts as destroyed.
    pub building_thresh: f64,
}

/// Arguments for the `rp-maps` subcommand.
#[derive(clap::Args)]
pub struct RpMapsArgs {
    /// Basin or region label of the hazard set, e.g. `WP`.
    pub region: String,

    /// Climate model; omit for the present-climate set.
    #[arg(long, requires = "scenario")]
    pub model: Option<String>,

    /// Model scenario tag, e.g. `ssp370cal`.
    #[arg(long, requires = "model")]
    pub scenario: Option<String>,
}

/// Arguments for the `global-tc` subcommand.
#[derive(clap::Args)]
pub struct GlobalTcArgs {
    /// Restrict to these scenarios instead of every one found.
    #[arg(long = "scenario")]
    pub scenarios: Vec<String>,

    /// Restrict to these building thresholds, as written in file names.
    #[arg(long = "threshold")]
    pub thresholds: Vec<String>,
}
