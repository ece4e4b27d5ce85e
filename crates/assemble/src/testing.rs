//! In-memory loaders for unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use drisk_hazard::{HazardSet, HazardSource, Raster, RasterSource};

#[derive(Debug, thiserror::Error)]
#[error("nothing registered for {}", .0.display())]
pub(crate) struct Missing(PathBuf);

#[derive(Debug, Default)]
pub(crate) struct MemoryRasters {
    rasters: HashMap<PathBuf, Raster>,
}

impl MemoryRasters {
    pub(crate) fn insert(&mut self, path: &Path, raster: Raster) {
        self.rasters.insert(path.to_path_buf(), raster);
    }
}

impl RasterSource for MemoryRasters {
    type Error = Missing;

    fn read_raster(&self, path: &Path) -> Result<Raster, Missing> {
        self.rasters
            .get(path)
            .cloned()
            .ok_or_else(|| Missing(path.to_path_buf()))
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryHazards {
    hazards: HashMap<PathBuf, HazardSet>,
}

impl MemoryHazards {
    pub(crate) fn insert(&mut self, path: &Path, hazard: HazardSet) {
        self.hazards.insert(path.to_path_buf(), hazard);
    }
}

impl HazardSource for MemoryHazards {
    type Error = Missing;

    fn read_hazard(&self, path: &Path) -> Result<HazardSet, Missing> {
        self.hazards
            .get(path)
            .cloned()
            .ok_or_else(|| Missing(path.to_path_buf()))
    }
}
