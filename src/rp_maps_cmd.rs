use anyhow::{Context, Result};
use tracing::info;

use drisk_io::{read_hazard, write_exceedance_maps};

use crate::cli::RpMapsArgs;
use crate::config::DriskConfig;
use crate::convert;
use crate::naming::{hazard_path, rp_map_path, tc_hazard_stem};

/// Write the local exceedance intensity maps of one stored TC hazard set.
pub fn run(args: &RpMapsArgs, config: &DriskConfig) -> Result<()> {
    let tc = &config.tc;
    let run = args.model.as_deref().zip(args.scenario.as_deref());
    convert::check_return_periods(&tc.rp_map_periods, "tc.rp_map_periods")?;

    // Step 1: hazard set written by concat-chunks
    let in_dir = if run.is_some() {
        &config.paths.hazard_future_dir
    } else {
        &config.paths.hazard_present_dir
    };
    let input = hazard_path(in_dir, &tc_hazard_stem(&args.region, &tc.resolution, run));
    let hazard =
        read_hazard(&input).with_context(|| format!("failed to read hazard {}", input.display()))?;
    info!(path = %input.display(), events = hazard.n_events(), "hazard loaded");

    // Step 2: maps
    let maps = hazard.local_exceedance_intensity(&tc.rp_map_periods);

    // Step 3: store
    let out_dir = &config.paths.rp_maps_dir;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out = rp_map_path(out_dir, &args.region, &tc.resolution, run);
    write_exceedance_maps(&out, &maps)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(
        path = %out.display(),
        return_periods = ?tc.rp_map_periods,
        "return-period maps written"
    );
    Ok(())
}
