use anyhow::{Context, Result};
use tracing::info;

use drisk_assemble::concat_chunks;
use drisk_frequency::correct_with_positional;
use drisk_io::{NetcdfHazards, read_calibration, write_hazard};
use drisk_tiles::list_chunks;

use crate::cli::ConcatArgs;
use crate::config::DriskConfig;
use crate::convert;
use crate::naming::{HAZARD_EXT, calibration_path, hazard_path, tc_hazard_stem};

/// Concatenate one region's hazard chunks, correct frequencies and store
/// the result.
pub fn run(args: &ConcatArgs, config: &DriskConfig) -> Result<()> {
    let run = args.model.as_deref().zip(args.scenario.as_deref());
    let stem = tc_hazard_stem(&args.region, &config.tc.resolution, run);
    let span = convert::parse_year_span(&config.frequency.year_span)?;

    // Step 1: chunks, ordered by numeric suffix
    let chunks = list_chunks(&config.paths.chunk_dir, &stem, HAZARD_EXT)
        .with_context(|| format!("failed to list chunks for {stem}"))?;
    if chunks.is_empty() {
        anyhow::bail!(
            "no chunks named {stem}_<n>.{HAZARD_EXT} in {}",
            config.paths.chunk_dir.display()
        );
    }
    let paths: Vec<_> = chunks.into_iter().map(|c| c.path).collect();
    info!(stem = %stem, chunks = paths.len(), "concatenating chunks");
    let mut hazard = concat_chunks(&paths, &NetcdfHazards)
        .with_context(|| format!("failed to concatenate chunks of {stem}"))?;

    // Step 2: frequency correction
    let calib = calibration_path(&config.paths.calibration_dir, &args.region, run);
    let values = read_calibration(&calib, &config.frequency.variable)
        .with_context(|| format!("failed to read calibration {}", calib.display()))?;
    let report = correct_with_positional(&mut hazard, &values, span)
        .with_context(|| format!("frequency correction failed for {stem}"))?;
    info!(
        years = report.events_per_year.len(),
        total_years = report.total_years,
        "frequencies corrected"
    );

    // Step 3: store
    let out_dir = if run.is_some() {
        &config.paths.hazard_future_dir
    } else {
        &config.paths.hazard_present_dir
    };
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out = hazard_path(out_dir, &stem);
    write_hazard(&out, &hazard).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), events = hazard.n_events(), "hazard set written");
    Ok(())
}
