//! Injected loaders for rasters and serialized hazard sets.
//!
//! Assembly code is written against these traits so that file formats stay
//! in the I/O layer and tests can supply in-memory fixtures.

use std::path::Path;

use crate::hazard::HazardSet;
use crate::raster::Raster;

/// Loads a single-band raster from a path.
pub trait RasterSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn read_raster(&self, path: &Path) -> Result<Raster, Self::Error>;
}

/// Loads a serialized hazard set from a path.
pub trait HazardSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn read_hazard(&self, path: &Path) -> Result<HazardSet, Self::Error>;
}
