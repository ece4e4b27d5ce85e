//! # drisk-hazard
//!
//! Core data model for hazard event sets: centroids, sparse intensity
//! matrices, per-event attributes and georeferenced rasters.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     R["Raster + GeoTransform"] -->|"pixel centres"| C["Centroids"]
//!     C --> H["HazardSet"]
//!     M["CsrMatrix (events x centroids)"] --> H
//!     E["EventTable (id, name, date, frequency)"] --> H
//!     H -->|"select_extent()"| H
//!     H -->|"concat_disjoint() / append_events()"| H
//!     H -->|"local_exceedance_intensity()"| X["ExceedanceMaps"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_hazard::{Centroids, CsrBuilder, EventTable, Extent, HazardSet};
//!
//! let centroids = Centroids::from_grid(&[120.0, 120.5], &[10.0]);
//! let mut rows = CsrBuilder::new(centroids.len());
//! rows.push_dense_row([0.0, 42.0]);
//! let haz = HazardSet::new("TC", "m/s", centroids, EventTable::numbered(vec![0.01]), rows.finish())?;
//!
//! let country = Extent::new(119.0, 121.0, 9.0, 11.0)?;
//! let local = haz.select_extent(&country);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `centroids` | Centroids and bounding extents |
//! | `sparse` | CSR matrix and row builder |
//! | `hazard` | `HazardSet` and its structural check |
//! | `exceedance` | Per-centroid return-period intensity maps |
//! | `raster` | Single-band raster with affine transform |
//! | `source` | Loader traits implemented by the I/O layer |
//! | `error` | Error types |

mod centroids;
mod error;
mod exceedance;
mod hazard;
mod raster;
mod source;
mod sparse;
mod validate;

pub use centroids::{Centroids, Extent};
pub use error::HazardError;
pub use exceedance::ExceedanceMaps;
pub use hazard::{EventTable, HazardSet};
pub use raster::{GeoTransform, Raster};
pub use source::{HazardSource, RasterSource};
pub use sparse::{CsrBuilder, CsrMatrix};
