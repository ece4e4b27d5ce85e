use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use drisk_ensemble::{OutputRow, RunKey, RunMetrics, difference, metric_names};
use drisk_hazard::{CsrMatrix, HazardSet};
use drisk_impact::{
    ADMIN0_LABEL, CentroidAssignment, EventImpact, Exposures, ImpactFuncSet, damage_matrix,
    run_per_unit,
};
use drisk_io::{read_building_mapping, read_exposures, read_hazard, read_impact_functions, write_output_rows};

use crate::basin::{Basin, resolve_basin};
use crate::cli::TcArgs;
use crate::config::DriskConfig;
use crate::convert;
use crate::naming::{exposure_path, hazard_path, tc_hazard_stem, threshold_label};

/// Written instead of result tables when no cyclone reaches the country.
const NOTE_FILE: &str = "note.txt";

/// Displaced-population matrix of one run over the whole country.
struct RunDamage {
    key: RunKey,
    damage: CsrMatrix,
    frequency: Vec<f64>,
}

/// Run the tropical cyclone pipeline for one country and scenario.
pub fn run(args: &TcArgs, config: &DriskConfig) -> Result<()> {
    let tc = &config.tc;
    let iso3 = args.iso3.to_uppercase();

    // Step 1: Build configs from TOML
    convert::check_return_periods(&tc.return_periods, "tc.return_periods")?;
    let differ_cfg = convert::build_differencer_config(tc)?;
    let vuln = tc
        .vulnerability
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no vulnerability source: set [tc.vulnerability] in config"))?;
    if !(0.0..=1.0).contains(&args.building_thresh) {
        anyhow::bail!("building threshold must lie in [0, 1], got {}", args.building_thresh);
    }

    // Step 2: Exposure and vulnerability
    let exp_path = exposure_path(&config.paths.exposure_dir, &iso3);
    let exposures = read_exposures(&exp_path)
        .with_context(|| format!("failed to read exposure {}", exp_path.display()))?
        .filter_min_value(tc.min_value);
    let extent = exposures
        .extent()
        .ok_or_else(|| anyhow::anyhow!("no exposure points above {} for {iso3}", tc.min_value))?;
    let impfs = read_impact_functions(&vuln.impact_functions)
        .with_context(|| format!("failed to read impact functions {}", vuln.impact_functions.display()))?
        .step_thresholds(args.building_thresh)
        .context("failed to derive step functions")?;
    let mapping = read_building_mapping(&vuln.building_mapping)
        .with_context(|| format!("failed to read building mapping {}", vuln.building_mapping.display()))?;
    let exposures = exposures
        .assign_impact_functions(&mapping, &vuln.name)
        .with_context(|| format!("cannot map buildings of {iso3}"))?;

    let out_dir = config.paths.results_dir.join("tc").join(&iso3);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    // Step 3: Reference hazard, restricted to the country
    let basin = resolve_basin(&iso3, &tc.regions, &extent)?;
    let present = load_basin(&config.paths.hazard_present_dir, basin, &tc.resolution, None)?
        .ok_or_else(|| anyhow::anyhow!("present-climate hazard for basin {basin} is missing"))?;
    let Some(present) = present.select_extent(&extent) else {
        let note = write_absence_note(&out_dir, &iso3)?;
        info!(iso3 = %iso3, basin = %basin, note = %note.display(), "no cyclone centroids inside the country");
        return Ok(());
    };

    // Step 4: Damage per run
    let mut runs = vec![run_damage(
        RunKey::new(&tc.reference, &differ_cfg.hist_scenario, ""),
        &present,
        &exposures,
        &impfs,
        tc.max_distance_km,
    )?];
    for (tag, key) in model_runs(config, &args.scenario, &differ_cfg.hist_scenario) {
        let run = Some((key.model.as_str(), tag.as_str()));
        let Some(hazard) =
            load_basin(&config.paths.hazard_future_dir, basin, &tc.resolution, run)?
        else {
            warn!(run = %key, "model hazard unavailable, skipping run");
            continue;
        };
        let Some(hazard) = hazard.select_extent(&extent) else {
            warn!(run = %key, "model hazard has no centroids inside the country, skipping run");
            continue;
        };
        runs.push(run_damage(key, &hazard, &exposures, &impfs, tc.max_distance_km)?);
    }
    info!(iso3 = %iso3, runs = runs.len(), "damage computed for all runs");

    // Step 5: Metrics and differencing per subdivision
    let mut subdivisions = vec![(ADMIN0_LABEL.to_string(), (0..exposures.len()).collect::<Vec<_>>())];
    for unit in exposures.admin1_units() {
        let cols = exposures.admin1_indices(&unit);
        subdivisions.push((format!("admin1_{unit}"), cols));
    }
    let metrics = metric_names(&tc.return_periods);
    let rows_per_sub = run_per_unit(
        &subdivisions,
        config.parallel.workers,
        |(name, cols): &(String, Vec<usize>)| -> Result<Vec<OutputRow>> {
            let per_run = runs
                .iter()
                .map(|r| run_metrics(r, cols, &tc.return_periods))
                .collect::<Result<Vec<_>>>()?;
            difference(name, &per_run, metrics.len(), &differ_cfg)
                .with_context(|| format!("differencing failed for {name}"))
        },
    )?;
    let rows: Vec<OutputRow> = rows_per_sub.into_iter().flatten().collect();

    // Step 6: Write
    let path = out_dir.join(format!(
        "{iso3}_{}_{}_TC.csv",
        args.scenario,
        threshold_label(args.building_thresh)
    ));
    write_output_rows(&path, &rows, &metrics)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "TC results written");
    Ok(())
}

/// Writes the sentinel that replaces result tables for a country no
/// cyclone reaches.
fn write_absence_note(out_dir: &Path, iso3: &str) -> Result<PathBuf> {
    let note = out_dir.join(NOTE_FILE);
    std::fs::write(&note, format!("No tropical cyclones were present for {iso3}.\n"))
        .with_context(|| format!("failed to write {}", note.display()))?;
    Ok(note)
}

/// Loads the hazard of a basin, joining the four basins for `Row`.
/// `None` if any member file is missing.
fn load_basin(
    dir: &Path,
    basin: Basin,
    resolution: &str,
    run: Option<(&str, &str)>,
) -> Result<Option<HazardSet>> {
    let mut parts = Vec::new();
    for member in basin.members() {
        let path = hazard_path(dir, &tc_hazard_stem(&member.to_string(), resolution, run));
        if !path.is_file() {
            warn!(path = %path.display(), "hazard file missing");
            return Ok(None);
        }
        let hazard =
            read_hazard(&path).with_context(|| format!("failed to read hazard {}", path.display()))?;
        parts.push(hazard);
    }
    match parts.len() {
        1 => Ok(parts.pop()),
        _ => Ok(Some(HazardSet::concat_disjoint(&parts)?)),
    }
}

/// Scenario tag of each model run: the historical tag plus one per future
/// period (`{scenario}{period_tag}`).
fn model_runs(config: &DriskConfig, scenario: &str, hist_scenario: &str) -> Vec<(String, RunKey)> {
    let tc = &config.tc;
    let mut out = Vec::new();
    for model in &tc.models {
        out.push((tc.hist_tag.clone(), RunKey::new(model, hist_scenario, "")));
        for (period, tag) in &tc.period_tags {
            out.push((format!("{scenario}{tag}"), RunKey::new(model, scenario, period)));
        }
    }
    out
}

fn run_damage(
    key: RunKey,
    hazard: &HazardSet,
    exposures: &Exposures,
    impfs: &ImpactFuncSet,
    max_distance_km: f64,
) -> Result<RunDamage> {
    let assignment = CentroidAssignment::nearest(exposures, hazard.centroids(), max_distance_km);
    let damage = damage_matrix(hazard, exposures, impfs, &assignment)
        .with_context(|| format!("damage computation failed for run {key}"))?;
    Ok(RunDamage {
        key,
        damage,
        frequency: hazard.frequency().to_vec(),
    })
}

/// Annual average and return-period impacts of one run over a column subset.
fn run_metrics(run: &RunDamage, cols: &[usize], rps: &[u32]) -> Result<RunMetrics> {
    let sub = run.damage.select_columns(cols);
    let impact = EventImpact::from_matrix(&sub, &run.frequency)?;
    Ok(RunMetrics::from_impact(
        run.key.clone(),
        impact.aai_agg(),
        &impact.freq_curve(rps),
    ))
}
