//! NetCDF hazard-set, return-period map and calibration reading.

use std::path::Path;

use drisk_hazard::{Centroids, CsrMatrix, EventTable, ExceedanceMaps, HazardSet, HazardSource};
use ndarray::Array2;
use netcdf::AttributeValue;
use tracing::{debug, info};

use crate::error::IoError;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Read a whole 1-D variable.
fn read_1d<T: netcdf::NcTypeDescriptor + Copy>(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<T>, IoError> {
    let var = file
        .variable(name)
        .ok_or_else(|| IoError::MissingVariable {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    if var.len() == 0 {
        return Ok(Vec::new());
    }
    Ok(var.get_values::<T, _>(..)?)
}

fn read_indices(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<usize>, IoError> {
    read_1d::<u64>(file, name, path)?
        .into_iter()
        .map(|v| {
            usize::try_from(v).map_err(|_| IoError::Validation {
                count: 1,
                details: format!("{name} value {v} does not fit in memory"),
            })
        })
        .collect()
}

fn read_strings(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<String>, IoError> {
    let var = file
        .variable(name)
        .ok_or_else(|| IoError::MissingVariable {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    (0..var.len())
        .map(|i| var.get_string([i]).map_err(IoError::from))
        .collect()
}

/// Read a global string attribute.
fn read_string_attr(file: &netcdf::File, name: &str, path: &Path) -> Result<String, IoError> {
    let missing = || IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    };
    match file.attribute(name).ok_or_else(missing)?.value()? {
        AttributeValue::Str(s) => Ok(s),
        other => Err(IoError::Validation {
            count: 1,
            details: format!("attribute '{name}' is not a string: {other:?}"),
        }),
    }
}

fn expect_len(name: &str, expected: usize, got: usize) -> Result<(), IoError> {
    if expected != got {
        return Err(IoError::DimensionMismatch {
            name: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Reads a hazard set written by [`write_hazard`](crate::write_hazard).
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::MissingVariable`] for an
/// absent variable or attribute, [`IoError::DimensionMismatch`] when event
/// or centroid arrays disagree in length, or [`IoError::Hazard`] if the
/// assembled set fails its structural check.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_hazard(path: &Path) -> Result<HazardSet, IoError> {
    let file = open_file(path)?;

    let haz_type = read_string_attr(&file, "haz_type", path)?;
    let units = read_string_attr(&file, "units", path)?;

    let lat = read_1d::<f64>(&file, "lat", path)?;
    let lon = read_1d::<f64>(&file, "lon", path)?;
    let centroids = Centroids::new(lat, lon)?;

    let id = read_1d::<i64>(&file, "event_id", path)?;
    let n_events = id.len();
    let name = read_strings(&file, "event_name", path)?;
    let date = read_1d::<i64>(&file, "date", path)?;
    let frequency = read_1d::<f64>(&file, "frequency", path)?;
    expect_len("event_name", n_events, name.len())?;
    expect_len("date", n_events, date.len())?;
    expect_len("frequency", n_events, frequency.len())?;

    let data = read_1d::<f64>(&file, "intensity_data", path)?;
    let indices = read_indices(&file, "intensity_indices", path)?;
    let indptr = read_indices(&file, "intensity_indptr", path)?;
    expect_len("intensity_indptr", n_events + 1, indptr.len())?;
    let intensity = CsrMatrix::new(n_events, centroids.len(), indptr, indices, data)?;

    let events = EventTable {
        id,
        name,
        date,
        frequency,
    };
    let hazard = HazardSet::new(haz_type, units, centroids, events, intensity)?;
    info!(
        events = hazard.n_events(),
        centroids = hazard.n_centroids(),
        nnz = hazard.intensity().nnz(),
        "read hazard set"
    );
    Ok(hazard)
}

/// Reads maps written by [`write_exceedance_maps`](crate::write_exceedance_maps).
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::MissingVariable`] or
/// [`IoError::DimensionMismatch`] when `intensity` does not cover every
/// (return period, centroid) pair.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_exceedance_maps(path: &Path) -> Result<ExceedanceMaps, IoError> {
    let file = open_file(path)?;

    let haz_type = read_string_attr(&file, "haz_type", path)?;
    let units = read_string_attr(&file, "units", path)?;
    let rps = read_1d::<u32>(&file, "return_period", path)?;
    let lat = read_1d::<f64>(&file, "lat", path)?;
    let lon = read_1d::<f64>(&file, "lon", path)?;
    let centroids = Centroids::new(lat, lon)?;

    let flat = read_1d::<f64>(&file, "intensity", path)?;
    expect_len("intensity", rps.len() * centroids.len(), flat.len())?;
    let shape = (rps.len(), centroids.len());
    let intensity = Array2::from_shape_vec(shape, flat).map_err(|e| IoError::Validation {
        count: 1,
        details: format!("intensity: {e}"),
    })?;
    debug!(return_periods = rps.len(), centroids = centroids.len(), "read return-period maps");
    Ok(ExceedanceMaps::new(haz_type, units, rps, centroids, intensity)?)
}

/// Reads the 1-D calibration array `var` (yearly event rates).
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] or [`IoError::MissingVariable`].
pub fn read_calibration(path: &Path, var: &str) -> Result<Vec<f64>, IoError> {
    let file = open_file(path)?;
    let values = read_1d::<f64>(&file, var, path)?;
    debug!(path = %path.display(), entries = values.len(), "read calibration");
    Ok(values)
}

/// [`HazardSource`] backed by NetCDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfHazards;

impl HazardSource for NetcdfHazards {
    type Error = IoError;

    fn read_hazard(&self, path: &Path) -> Result<HazardSet, IoError> {
        read_hazard(path)
    }
}
