//! Concatenation merge: one hazard per tile, stacked along the event axis.

use std::collections::BTreeMap;
use std::path::PathBuf;

use drisk_hazard::{Centroids, CsrBuilder, HazardSet, Raster, RasterSource};
use tracing::{debug, info, warn};

use crate::error::AssembleError;
use crate::spec::{HazardSpec, return_period_events};

/// Builds one hazard per tile from its return-period rasters and
/// concatenates them.
///
/// Each tile contributes one event per raster (frequency `1/rp`, ascending
/// RP) over its own pixel-centre centroids. Centroids are not deduplicated
/// across tiles, so tiles are assumed spatially disjoint. Tiles with no
/// files are skipped.
///
/// Returns `Ok(None)` if no tile has any file.
///
/// # Errors
///
/// Returns [`AssembleError::Source`] if a raster cannot be read,
/// [`AssembleError::GridMismatch`] if the rasters of one tile differ in
/// grid, or a hazard error from the final check.
#[tracing::instrument(skip_all, fields(tiles = tiles.len()))]
pub fn concat_tiles<S: RasterSource>(
    tiles: &BTreeMap<String, Vec<(u32, PathBuf)>>,
    source: &S,
    spec: &HazardSpec,
) -> Result<Option<HazardSet>, AssembleError> {
    let mut hazards = Vec::new();
    for (tile, files) in tiles {
        if files.is_empty() {
            debug!(tile = %tile, "tile has no rasters, skipping");
            continue;
        }
        let mut files = files.clone();
        files.sort_by_key(|(rp, _)| *rp);
        hazards.push(tile_hazard(&files, source, spec)?);
    }

    if hazards.is_empty() {
        warn!("no hazard files found for the requested tiles");
        return Ok(None);
    }
    let combined = HazardSet::concat_disjoint(&hazards)?;
    info!(
        events = combined.n_events(),
        centroids = combined.n_centroids(),
        "assembled hazard by tile concatenation"
    );
    Ok(Some(combined))
}

fn tile_hazard<S: RasterSource>(
    files: &[(u32, PathBuf)],
    source: &S,
    spec: &HazardSpec,
) -> Result<HazardSet, AssembleError> {
    let mut rasters = Vec::with_capacity(files.len());
    for (_, path) in files {
        let raster = source
            .read_raster(path)
            .map_err(|e| AssembleError::load_failed(path, e))?;
        rasters.push(raster);
    }
    let rps: Vec<u32> = files.iter().map(|(rp, _)| *rp).collect();
    rasters_to_hazard(&rasters, &rps, spec)
}

/// Turns co-registered rasters (one per return period) into a hazard set.
///
/// All rasters must share shape and transform with the first.
pub(crate) fn rasters_to_hazard(
    rasters: &[Raster],
    rps: &[u32],
    spec: &HazardSpec,
) -> Result<HazardSet, AssembleError> {
    let first = rasters
        .first()
        .ok_or(AssembleError::NoInputs { operation: "rasters_to_hazard" })?;
    for (raster, &rp) in rasters.iter().zip(rps).skip(1) {
        if raster.data().dim() != first.data().dim() {
            return Err(AssembleError::GridMismatch {
                rp,
                reason: format!(
                    "shape {:?} differs from {:?}",
                    raster.data().dim(),
                    first.data().dim()
                ),
            });
        }
        if raster.transform() != first.transform() {
            return Err(AssembleError::GridMismatch {
                rp,
                reason: "transform differs from the first raster".to_string(),
            });
        }
    }

    let (lons, lats) = first.axis_centers()?;
    let centroids = Centroids::from_grid(&lons, &lats);
    let mut intensity = CsrBuilder::new(centroids.len());
    for raster in rasters {
        intensity.push_dense_row(
            raster
                .data()
                .iter()
                .map(|&v| if raster.is_valid(v) { v } else { 0.0 }),
        );
    }

    Ok(HazardSet::new(
        spec.haz_type.clone(),
        spec.units.clone(),
        centroids,
        return_period_events(rps),
        intensity.finish(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRasters;
    use approx::assert_relative_eq;
    use drisk_hazard::GeoTransform;
    use ndarray::Array2;

    #[test]
    fn tiles_concatenate_without_dedup() {
        let mut src = MemoryRasters::default();
        let mut tiles = BTreeMap::new();
        for (name, x0) in [("A", 0.0), ("B", 2.0)] {
            let mut files = Vec::new();
            for rp in [100, 10] {
                let path = PathBuf::from(format!("{name}/RP{rp}.tif"));
                src.insert(
                    &path,
                    Raster::new(
                        Array2::from_elem((2, 2), f64::from(rp)),
                        GeoTransform::north_up(x0, 2.0, 1.0, 1.0),
                        None,
                    ),
                );
                files.push((rp, path));
            }
            tiles.insert(name.to_string(), files);
        }
        tiles.insert("C".to_string(), Vec::new());

        let haz = concat_tiles(&tiles, &src, &HazardSpec::coastal_flood())
            .unwrap()
            .unwrap();
        assert_eq!(haz.n_events(), 4);
        assert_eq!(haz.n_centroids(), 8);
        assert_relative_eq!(haz.frequency()[0], 0.1);
        assert_relative_eq!(haz.frequency()[1], 0.01);
        assert_eq!(haz.event_name()[1], "RP100");
        // Tile A's RP10 event has no intensity over tile B's centroids.
        assert_eq!(haz.intensity().get(0, 5), 0.0);
        assert_eq!(haz.intensity().get(0, 0), 10.0);
        assert_eq!(haz.intensity().get(3, 7), 100.0);
    }

    #[test]
    fn no_files_gives_none() {
        let src = MemoryRasters::default();
        let mut tiles = BTreeMap::new();
        tiles.insert("A".to_string(), Vec::new());
        assert!(
            concat_tiles(&tiles, &src, &HazardSpec::coastal_flood())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn missing_file_is_fatal() {
        let src = MemoryRasters::default();
        let mut tiles = BTreeMap::new();
        tiles.insert("A".to_string(), vec![(10, PathBuf::from("A/RP10.tif"))]);
        assert!(matches!(
            concat_tiles(&tiles, &src, &HazardSpec::coastal_flood()),
            Err(AssembleError::Source { .. })
        ));
    }

    #[test]
    fn nodata_becomes_zero() {
        let raster = Raster::new(
            Array2::from_shape_vec((1, 3), vec![1.0, -9999.0, f64::NAN]).unwrap(),
            GeoTransform::north_up(0.0, 1.0, 1.0, 1.0),
            Some(-9999.0),
        );
        let haz = rasters_to_hazard(&[raster], &[5], &HazardSpec::coastal_flood()).unwrap();
        assert_eq!(haz.intensity().nnz(), 1);
        assert_relative_eq!(haz.frequency()[0], 0.2);
    }
}
