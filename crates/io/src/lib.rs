//! # drisk-io
//!
//! Read and write hazard sets and return-period maps (NetCDF), raster tiles (GeoTIFF), exposure and
//! vulnerability tables (CSV) and sparse impact-matrix snapshots (Parquet).
//! Bridges external file formats into the typed models of `drisk_hazard`,
//! `drisk_impact` and `drisk_ensemble`.

mod error;
mod geotiff;
mod netcdf_read;
mod netcdf_write;
mod snapshot;
mod tables;

pub use error::IoError;
pub use geotiff::{GeoTiffRasters, read_geotiff, write_geotiff};
pub use netcdf_read::{NetcdfHazards, read_calibration, read_exceedance_maps, read_hazard};
pub use netcdf_write::{write_exceedance_maps, write_hazard};
pub use snapshot::{Compression, WriterConfig, read_snapshot, write_snapshot};
pub use tables::{
    read_building_mapping, read_exposures, read_impact_functions, read_impact_table,
    read_output_rows, write_impact_table, write_output_rows,
};
