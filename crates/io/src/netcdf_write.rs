//! NetCDF hazard-set and return-period map writing.

use std::path::Path;

use drisk_hazard::{ExceedanceMaps, HazardSet};
use netcdf::types::NcVariableType;
use tracing::info;

use crate::error::IoError;

/// Adds a dimension; zero lengths become unlimited dimensions so that
/// empty hazard sets remain representable.
fn add_dim(file: &mut netcdf::FileMut, name: &str, len: usize) -> Result<(), IoError> {
    if len == 0 {
        file.add_unlimited_dimension(name)?;
    } else {
        file.add_dimension(name, len)?;
    }
    Ok(())
}

fn put_1d<T: netcdf::NcTypeDescriptor>(
    file: &mut netcdf::FileMut,
    name: &str,
    dim: &str,
    values: &[T],
) -> Result<(), IoError> {
    let mut var = file.add_variable::<T>(name, &[dim])?;
    if !values.is_empty() {
        var.put_values(values, ..)?;
    }
    Ok(())
}

fn to_u64(values: &[usize]) -> Vec<u64> {
    values.iter().map(|&v| v as u64).collect()
}

/// Writes a hazard set as NetCDF-4.
///
/// Layout: dimensions `event`, `centroid`, `nnz` and `indptr`; event
/// variables `event_id`, `event_name`, `date`, `frequency`; centroid
/// variables `lat`, `lon`; the CSR intensity matrix as `intensity_data`,
/// `intensity_indices` and `intensity_indptr`; global attributes
/// `haz_type` and `units`.
///
/// # Errors
///
/// Returns [`IoError::Netcdf`] if the file cannot be created or written.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn write_hazard(path: &Path, hazard: &HazardSet) -> Result<(), IoError> {
    let mut file = netcdf::create(path)?;
    let m = hazard.intensity();

    add_dim(&mut file, "event", hazard.n_events())?;
    add_dim(&mut file, "centroid", hazard.n_centroids())?;
    add_dim(&mut file, "nnz", m.nnz())?;
    add_dim(&mut file, "indptr", m.indptr().len())?;

    file.add_attribute("haz_type", hazard.haz_type())?;
    file.add_attribute("units", hazard.units())?;

    put_1d(&mut file, "event_id", "event", hazard.event_id())?;
    put_1d(&mut file, "date", "event", hazard.date())?;
    put_1d(&mut file, "frequency", "event", hazard.frequency())?;
    {
        let mut var =
            file.add_variable_with_type("event_name", &["event"], &NcVariableType::String)?;
        for (i, name) in hazard.event_name().iter().enumerate() {
            var.put_string(name, [i])?;
        }
    }

    put_1d(&mut file, "lat", "centroid", hazard.centroids().lat())?;
    put_1d(&mut file, "lon", "centroid", hazard.centroids().lon())?;

    put_1d(&mut file, "intensity_data", "nnz", m.data())?;
    put_1d(&mut file, "intensity_indices", "nnz", &to_u64(m.indices()))?;
    put_1d(&mut file, "intensity_indptr", "indptr", &to_u64(m.indptr()))?;

    info!(
        events = hazard.n_events(),
        centroids = hazard.n_centroids(),
        "wrote hazard set"
    );
    Ok(())
}

/// Writes return-period intensity maps as NetCDF-4.
///
/// Layout: dimensions `return_period` and `centroid`; variables
/// `return_period`, `lat`, `lon` and the 2-D `intensity`
/// (`return_period x centroid`); global attributes `haz_type` and `units`.
///
/// # Errors
///
/// Returns [`IoError::Netcdf`] if the file cannot be created or written.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn write_exceedance_maps(path: &Path, maps: &ExceedanceMaps) -> Result<(), IoError> {
    let mut file = netcdf::create(path)?;

    add_dim(&mut file, "return_period", maps.return_periods().len())?;
    add_dim(&mut file, "centroid", maps.centroids().len())?;

    file.add_attribute("haz_type", maps.haz_type())?;
    file.add_attribute("units", maps.units())?;

    put_1d(&mut file, "return_period", "return_period", maps.return_periods())?;
    put_1d(&mut file, "lat", "centroid", maps.centroids().lat())?;
    put_1d(&mut file, "lon", "centroid", maps.centroids().lon())?;

    let flat: Vec<f64> = maps.intensity().iter().copied().collect();
    let mut var = file.add_variable::<f64>("intensity", &["return_period", "centroid"])?;
    if !flat.is_empty() {
        var.put_values(&flat, ..)?;
    }

    info!(
        return_periods = maps.return_periods().len(),
        centroids = maps.centroids().len(),
        "wrote return-period maps"
    );
    Ok(())
}
