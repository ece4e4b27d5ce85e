//! Raster merge: pixel-wise maximum over overlapping tiles, one event per
//! return period.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use drisk_hazard::{GeoTransform, HazardError, HazardSet, Raster, RasterSource};
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::concat::rasters_to_hazard;
use crate::error::AssembleError;
use crate::spec::HazardSpec;

/// Relative tolerance for comparing pixel sizes and grid offsets.
const GRID_TOL: f64 = 1e-6;

/// Merges north-up rasters on a common grid with a pixel-wise maximum.
///
/// The output covers the union of all inputs. Nodata and NaN pixels never
/// win the maximum; cells covered by no valid pixel are 0. Inputs must
/// share pixel size and be aligned to the same pixel lattice.
///
/// `paths` labels each raster in error messages and must have the same
/// length as `rasters`.
///
/// # Errors
///
/// Returns [`AssembleError::NoInputs`] for an empty slice,
/// [`AssembleError::ResolutionMismatch`] on differing pixel sizes, or
/// [`HazardError::IrregularGrid`] for rotated, south-up or misaligned inputs.
pub fn max_merge(rasters: &[Raster], paths: &[PathBuf]) -> Result<Raster, AssembleError> {
    let first = rasters
        .first()
        .ok_or(AssembleError::NoInputs { operation: "max_merge" })?;
    let label = |i: usize| paths.get(i).cloned().unwrap_or_default();

    let (px_w, px_h) = north_up_pixel_size(first.transform())?;
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (i, r) in rasters.iter().enumerate() {
        let (w, h) = north_up_pixel_size(r.transform())?;
        if !close(w, px_w) || !close(h, px_h) {
            return Err(AssembleError::ResolutionMismatch {
                path: label(i),
                expected: (px_w, px_h),
                got: (w, h),
            });
        }
        let b = r.bounds()?;
        x_min = x_min.min(b.lon_min());
        x_max = x_max.max(b.lon_max());
        y_min = y_min.min(b.lat_min());
        y_max = y_max.max(b.lat_max());
    }

    let cols = ((x_max - x_min) / px_w).round() as usize;
    let rows = ((y_max - y_min) / px_h).round() as usize;
    let mut merged = Array2::from_elem((rows, cols), f64::NAN);

    for (i, r) in rasters.iter().enumerate() {
        let t = r.transform();
        let col0 = lattice_offset((t.c - x_min) / px_w, &label(i))?;
        let row0 = lattice_offset((y_max - t.f) / px_h, &label(i))?;
        for ((row, col), &v) in r.data().indexed_iter() {
            if !r.is_valid(v) {
                continue;
            }
            let cell = &mut merged[[row0 + row, col0 + col]];
            if cell.is_nan() || v > *cell {
                *cell = v;
            }
        }
    }
    merged.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });

    debug!(rows, cols, inputs = rasters.len(), "max-merged rasters");
    Ok(Raster::new(
        merged,
        GeoTransform::north_up(x_min, y_max, px_w, px_h),
        None,
    ))
}

/// Merges every return period's tiles and stacks one event per RP.
///
/// For each RP, all tile rasters are read through `source` and combined
/// with [`max_merge`]. The merged grids of all RPs must agree. Centroids are
/// the pixel centres of the merged grid and each event has frequency `1/rp`.
///
/// Returns `Ok(None)` if `by_rp` holds no files.
///
/// # Errors
///
/// Returns [`AssembleError::Source`] if a raster cannot be read, merge
/// errors from [`max_merge`], or [`AssembleError::GridMismatch`] if the
/// merged grids of two RPs differ.
#[tracing::instrument(skip_all, fields(return_periods = by_rp.len()))]
pub fn merge_rasters<S: RasterSource>(
    by_rp: &BTreeMap<u32, Vec<PathBuf>>,
    source: &S,
    spec: &HazardSpec,
) -> Result<Option<HazardSet>, AssembleError> {
    let mut merged = Vec::new();
    let mut rps = Vec::new();
    for (&rp, paths) in by_rp {
        if paths.is_empty() {
            continue;
        }
        let rasters = paths
            .iter()
            .map(|p| read(source, p))
            .collect::<Result<Vec<_>, _>>()?;
        merged.push(max_merge(&rasters, paths)?);
        rps.push(rp);
    }

    if merged.is_empty() {
        warn!("no raster tiles found for the requested combination");
        return Ok(None);
    }
    let hazard = rasters_to_hazard(&merged, &rps, spec)?;
    info!(
        events = hazard.n_events(),
        centroids = hazard.n_centroids(),
        "assembled hazard by raster merge"
    );
    Ok(Some(hazard))
}

fn read<S: RasterSource>(source: &S, path: &Path) -> Result<Raster, AssembleError> {
    source
        .read_raster(path)
        .map_err(|e| AssembleError::load_failed(path, e))
}

fn north_up_pixel_size(t: &GeoTransform) -> Result<(f64, f64), HazardError> {
    t.require_axis_aligned()?;
    if t.a <= 0.0 || t.e >= 0.0 {
        return Err(HazardError::IrregularGrid {
            reason: format!("expected north-up pixels, got width {} height {}", t.a, t.e),
        });
    }
    Ok((t.a, -t.e))
}

fn lattice_offset(pixels: f64, path: &Path) -> Result<usize, HazardError> {
    let rounded = pixels.round();
    if (pixels - rounded).abs() > GRID_TOL || rounded < 0.0 {
        return Err(HazardError::IrregularGrid {
            reason: format!(
                "{} is offset by {pixels} pixels from the merged grid",
                path.display()
            ),
        });
    }
    Ok(rounded as usize)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= GRID_TOL * a.abs().max(b.abs())
}
