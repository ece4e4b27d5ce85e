//! # drisk-tiles
//!
//! Locating hazard inputs on disk: one-degree tile names for a bounding
//! box, an index of per-tile return-period rasters, and numerically ordered
//! lists of simulation chunk files.
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_tiles::{TileFilter, TileIndex, list_chunks, tile_names_for_extent};
//!
//! let tiles = tile_names_for_extent(&country_extent);
//! let index = TileIndex::build(root, &TileFilter::new().with_tiles(tiles))?;
//! let per_rp = index.by_return_period("RCP45", 2050);
//!
//! let chunks = list_chunks(dir, "TC_AP_0150as_MIT_cesm2_ssp585cal_H08", "nc")?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `names` | Tile names from coordinates and extents |
//! | `index` | `{tile}/{scenario}_{year}/RP{n}.tif` directory index |
//! | `chunks` | Chunk file listing by numeric suffix |
//! | `error` | Error types |

mod chunks;
mod error;
mod index;
mod names;

pub use chunks::{ChunkFile, list_chunks};
pub use error::TileError;
pub use index::{TileEntry, TileFilter, TileIndex};
pub use names::{tile_name, tile_names_for_extent};
