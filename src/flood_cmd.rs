use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use drisk_assemble::{HazardSpec, concat_tiles, merge_rasters};
use drisk_hazard::{CsrMatrix, HazardSet};
use drisk_impact::{
    CentroidAssignment, Exposures, Grouping, ImpactTable, aggregate_return_periods, compute_aed,
    damage_matrix, roll_up_admin0, run_per_unit, scenario_spread,
};
use drisk_io::{
    GeoTiffRasters, WriterConfig, read_building_mapping, read_exposures, read_impact_functions,
    read_snapshot, write_impact_table, write_snapshot,
};
use drisk_tiles::{TileFilter, TileIndex, tile_names_for_extent};

use crate::cli::FloodArgs;
use crate::config::{DriskConfig, VulnerabilityToml};
use crate::convert::{self, MergeStrategy};
use crate::naming::exposure_path;

/// Label header of flood result tables.
const LABEL_HEADER: &str = "admin1";

/// Run the coastal flood pipeline for one country.
pub fn run(args: &FloodArgs, config: &DriskConfig) -> Result<()> {
    let flood = &config.flood;
    let iso3 = args.iso3.to_uppercase();

    // Step 1: Build configs from TOML
    convert::check_return_periods(&flood.return_periods, "flood.return_periods")?;
    let merge = convert::parse_merge(&flood.merge)?;
    let writer_cfg = convert::build_writer_config(&config.snapshot)?;
    if flood.sources.is_empty() {
        anyhow::bail!("no vulnerability sources: add [[flood.sources]] to the config");
    }
    if flood.thresholds.is_empty() {
        anyhow::bail!("[flood].thresholds is empty");
    }
    let rcps = if args.rcps.is_empty() { flood.rcps.clone() } else { args.rcps.clone() };
    let years = if args.years.is_empty() { flood.years.clone() } else { args.years.clone() };

    // Step 2: Exposure
    let exp_path = exposure_path(&config.paths.exposure_dir, &iso3);
    let exposures = read_exposures(&exp_path)
        .with_context(|| format!("failed to read exposure {}", exp_path.display()))?
        .filter_min_value(flood.min_value);
    let extent = exposures
        .extent()
        .ok_or_else(|| anyhow::anyhow!("no exposure points above {} for {iso3}", flood.min_value))?;
    let tiles = tile_names_for_extent(&extent);
    info!(iso3 = %iso3, points = exposures.len(), tiles = tiles.len(), "exposure loaded");

    let out_dir = config.paths.results_dir.join("flood").join(&iso3);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    // Step 3: For each (rcp, year)
    for rcp in &rcps {
        for &year in &years {
            let filter = TileFilter::new()
                .with_scenarios([rcp.as_str()])
                .with_years([year])
                .with_return_periods(flood.return_periods.iter().copied())
                .with_tiles(tiles.iter().map(String::as_str));
            let index = TileIndex::build(&config.paths.tiles_root, &filter)
                .with_context(|| format!("failed to index tiles under {}", config.paths.tiles_root.display()))?;
            let Some((hazard, rps)) = assemble(&index, rcp, year, merge)? else {
                warn!(rcp = %rcp, year = year, "no flood tiles for this combination, skipping");
                continue;
            };
            info!(rcp = %rcp, year = year, events = hazard.n_events(), "flood hazard assembled");

            let run = FloodRun {
                iso3: &iso3,
                rcp,
                year,
                rps: &rps,
                out_dir: &out_dir,
            };
            for source in &flood.sources {
                run_source(&run, &hazard, &exposures, source, config, &writer_cfg)?;
            }
        }
    }
    Ok(())
}

/// Identifies one (country, rcp, year) flood run and its output directory.
struct FloodRun<'a> {
    iso3: &'a str,
    rcp: &'a str,
    year: u32,
    rps: &'a [u32],
    out_dir: &'a Path,
}

impl FloodRun<'_> {
    fn snapshot_path(&self, source: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}_{}_{source}.parquet", self.iso3, self.rcp, self.year))
    }

    fn table_path(&self, label: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}_{}_{label}.csv", self.iso3, self.rcp, self.year))
    }
}

/// Assembles the hazard of one (rcp, year) and the return periods of its
/// event blocks. `None` when no tile file matched.
fn assemble(
    index: &TileIndex,
    rcp: &str,
    year: u32,
    merge: MergeStrategy,
) -> Result<Option<(HazardSet, Vec<u32>)>> {
    let spec = HazardSpec::coastal_flood();
    match merge {
        MergeStrategy::Concat => {
            let by_tile = index.by_tile(rcp, year);
            let rps = common_return_periods(&by_tile)?;
            let hazard = concat_tiles(&by_tile, &GeoTiffRasters, &spec)
                .context("tile concatenation failed")?;
            Ok(hazard.map(|h| (h, rps)))
        }
        MergeStrategy::Max => {
            let by_rp = index.by_return_period(rcp, year);
            let rps: Vec<u32> = by_rp
                .iter()
                .filter(|(_, paths)| !paths.is_empty())
                .map(|(rp, _)| *rp)
                .collect();
            let hazard = merge_rasters(&by_rp, &GeoTiffRasters, &spec)
                .context("tile merge failed")?;
            Ok(hazard.map(|h| (h, rps)))
        }
    }
}

/// Return periods shared by every tile. Tiles with different sets would
/// break the event-block layout of the stacked hazard.
fn common_return_periods(
    by_tile: &std::collections::BTreeMap<String, Vec<(u32, PathBuf)>>,
) -> Result<Vec<u32>> {
    let mut common: Option<Vec<u32>> = None;
    for (tile, files) in by_tile {
        if files.is_empty() {
            continue;
        }
        let mut rps: Vec<u32> = files.iter().map(|(rp, _)| *rp).collect();
        rps.sort_unstable();
        match &common {
            None => common = Some(rps),
            Some(c) if *c != rps => {
                anyhow::bail!("tile {tile} has return periods {rps:?}, other tiles have {c:?}")
            }
            Some(_) => {}
        }
    }
    Ok(common.unwrap_or_default())
}

/// Damage, thresholds and per-admin1 tables for one vulnerability source.
///
/// Writes one table per threshold, the thresholds side by side, and their
/// min/median/max spread.
fn run_source(
    run: &FloodRun<'_>,
    hazard: &HazardSet,
    exposures: &Exposures,
    source: &VulnerabilityToml,
    config: &DriskConfig,
    writer_cfg: &WriterConfig,
) -> Result<()> {
    let impfs = read_impact_functions(&source.impact_functions).with_context(|| {
        format!("failed to read impact functions {}", source.impact_functions.display())
    })?;
    let mapping = read_building_mapping(&source.building_mapping).with_context(|| {
        format!("failed to read building mapping {}", source.building_mapping.display())
    })?;
    let Some(assigned) = assign_or_skip(exposures, &mapping, &source.name) else {
        return Ok(());
    };

    // Damage ratios per building: unit value, population weights come later
    let units = assigned.with_uniform_value(1.0);
    let snapshot = run.snapshot_path(&source.name);
    let reused = if config.snapshot.reuse {
        reuse_snapshot(&snapshot, hazard.n_events(), units.len())?
    } else {
        None
    };
    let damage = match reused {
        Some(damage) => damage,
        None => {
            let assignment =
                CentroidAssignment::nearest(&units, hazard.centroids(), config.flood.max_distance_km);
            if assignment.unassigned() > 0 {
                warn!(
                    source = %source.name,
                    unassigned = assignment.unassigned(),
                    "exposure points without a centroid within range"
                );
            }
            let damage = damage_matrix(hazard, &units, &impfs, &assignment)
                .with_context(|| format!("damage computation failed for source {}", source.name))?;
            if config.snapshot.enabled {
                write_snapshot(&snapshot, &damage, writer_cfg)
                    .with_context(|| format!("failed to write snapshot {}", snapshot.display()))?;
            }
            damage
        }
    };

    let mut tables = Vec::with_capacity(config.flood.thresholds.len());
    let mut labels = Vec::with_capacity(config.flood.thresholds.len());
    for (thresh_name, &thresh) in &config.flood.thresholds {
        let label = format!("{}_{thresh_name}", source.name);
        let displaced = damage.threshold(thresh);
        let table = admin1_table(&displaced, &assigned, run.rps, &label, config.parallel.workers)?;
        let path = run.table_path(&label);
        write_impact_table(&path, &table, LABEL_HEADER)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(label = %label, rows = table.n_rows(), path = %path.display(), "flood table written");
        tables.push(table);
        labels.push(label);
    }

    let combined = ImpactTable::join_columns(&tables)?;
    let path = run.table_path(&source.name);
    write_impact_table(&path, &combined, LABEL_HEADER)
        .with_context(|| format!("failed to write {}", path.display()))?;

    let per_threshold: Vec<(&ImpactTable, &str)> =
        tables.iter().zip(labels.iter().map(String::as_str)).collect();
    let spread = scenario_spread(&per_threshold, run.rps)?;
    let path = run.table_path(&format!("{}_spread", source.name));
    write_impact_table(&path, &spread, LABEL_HEADER)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(source = %source.name, thresholds = tables.len(), "combined and spread tables written");
    Ok(())
}

/// Exposures with impact functions from `mapping`, or `None` when the
/// mapping misses building types present in the country. The source is
/// then skipped, not the run.
fn assign_or_skip(
    exposures: &Exposures,
    mapping: &BTreeMap<String, u32>,
    source_name: &str,
) -> Option<Exposures> {
    match exposures.assign_impact_functions(mapping, source_name) {
        Ok(assigned) => Some(assigned),
        Err(e) => {
            warn!(source = %source_name, error = %e, "vulnerability mapping incomplete, skipping source");
            None
        }
    }
}

/// Damage matrix from an earlier snapshot, if one exists with the expected
/// `events x points` shape. A stale shape is ignored with a warning.
fn reuse_snapshot(path: &Path, n_events: usize, n_points: usize) -> Result<Option<CsrMatrix>> {
    if !path.is_file() {
        return Ok(None);
    }
    let damage =
        read_snapshot(path).with_context(|| format!("failed to read snapshot {}", path.display()))?;
    if damage.nrows() != n_events || damage.ncols() != n_points {
        warn!(
            path = %path.display(),
            rows = damage.nrows(),
            cols = damage.ncols(),
            n_events,
            n_points,
            "snapshot shape does not match this run, recomputing"
        );
        return Ok(None);
    }
    info!(path = %path.display(), nnz = damage.nnz(), "damage matrix reused from snapshot");
    Ok(Some(damage))
}

/// Per-admin1 return-period impacts with AED and an `admin0` total row.
fn admin1_table(
    displaced: &CsrMatrix,
    exposures: &Exposures,
    rps: &[u32],
    label: &str,
    workers: usize,
) -> Result<ImpactTable> {
    let units = exposures.admin1_units();
    let parts = run_per_unit(&units, workers, |unit: &String| -> Result<ImpactTable> {
        let cols = exposures.admin1_indices(unit);
        let sub_matrix = displaced.select_columns(&cols);
        let sub_exp = exposures.subset_admin1(unit);
        aggregate_return_periods(&sub_matrix, &sub_exp, rps, label, Grouping::Admin1)
            .with_context(|| format!("aggregation failed for admin1 {unit}"))
    })?;
    let mut table = ImpactTable::concat(&parts)?;
    compute_aed(&mut table, rps, label)?;
    roll_up_admin0(&mut table)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use drisk_hazard::CsrBuilder;
    use drisk_impact::{ExposurePoint, ImpactError};
    use drisk_io::Compression;

    use super::*;

    fn exposures(types: &[&str]) -> Exposures {
        let points = types
            .iter()
            .enumerate()
            .map(|(i, t)| ExposurePoint {
                lon: 90.0 + i as f64 * 0.01,
                lat: 22.0,
                value: 10.0,
                admin1: "Khulna".to_string(),
                building_type: t.to_string(),
                impf_id: None,
            })
            .collect();
        Exposures::new(points).unwrap()
    }

    #[test]
    fn output_names() {
        let dir = PathBuf::from("results/flood/BGD");
        let run = FloodRun {
            iso3: "BGD",
            rcp: "RCP45",
            year: 2050,
            rps: &[1, 10],
            out_dir: &dir,
        };
        assert_eq!(
            run.table_path("cima_low"),
            PathBuf::from("results/flood/BGD/BGD_RCP45_2050_cima_low.csv")
        );
        assert_eq!(
            run.snapshot_path("ivm"),
            PathBuf::from("results/flood/BGD/BGD_RCP45_2050_ivm.parquet")
        );
        assert_eq!(
            run.table_path("cima"),
            PathBuf::from("results/flood/BGD/BGD_RCP45_2050_cima.csv")
        );
        assert_eq!(
            run.table_path("cima_spread"),
            PathBuf::from("results/flood/BGD/BGD_RCP45_2050_cima_spread.csv")
        );
    }

    #[test]
    fn incomplete_mapping_skips_source() {
        let exp = exposures(&["W1", "C2"]);
        let partial = BTreeMap::from([("W1".to_string(), 1)]);
        assert!(assign_or_skip(&exp, &partial, "cima").is_none());

        let full = BTreeMap::from([("W1".to_string(), 1), ("C2".to_string(), 4)]);
        let assigned = assign_or_skip(&exp, &full, "cima").unwrap();
        let ids: Vec<_> = assigned.points().iter().map(|p| p.impf_id).collect();
        assert_eq!(ids, vec![Some(1), Some(4)]);
        // the skip mirrors the library error
        assert!(matches!(
            exp.assign_impact_functions(&partial, "cima"),
            Err(ImpactError::UnmappedBuildingTypes { .. })
        ));
    }

    #[test]
    fn snapshot_reused_only_with_matching_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BGD_RCP45_2050_cima.parquet");
        assert!(reuse_snapshot(&path, 2, 3).unwrap().is_none());

        let mut b = CsrBuilder::new(3);
        b.push_dense_row([0.0, 0.5, 1.0]);
        b.push_dense_row([0.2, 0.0, 0.0]);
        let damage = b.finish();
        let cfg = WriterConfig::default().with_compression(Compression::None);
        write_snapshot(&path, &damage, &cfg).unwrap();

        assert_eq!(reuse_snapshot(&path, 2, 3).unwrap(), Some(damage));
        assert!(reuse_snapshot(&path, 7, 3).unwrap().is_none());
    }

    #[test]
    fn common_rps_across_tiles() {
        let tiles = BTreeMap::from([
            ("N10E090".to_string(), vec![(10, PathBuf::from("a")), (1, PathBuf::from("b"))]),
            ("N10E091".to_string(), vec![(1, PathBuf::from("c")), (10, PathBuf::from("d"))]),
            ("N11E090".to_string(), Vec::new()),
        ]);
        assert_eq!(common_return_periods(&tiles).unwrap(), vec![1, 10]);
    }

    #[test]
    fn uneven_tiles_rejected() {
        let tiles = BTreeMap::from([
            ("N10E090".to_string(), vec![(1, PathBuf::from("a")), (10, PathBuf::from("b"))]),
            ("N10E091".to_string(), vec![(1, PathBuf::from("c"))]),
        ]);
        assert!(common_return_periods(&tiles).is_err());
    }
}
