//! # drisk-assemble
//!
//! Builds unified hazard sets from per-tile rasters and per-batch chunks.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     T["tile -> [(rp, tif)]"] -->|"concat_tiles()"| H["HazardSet"]
//!     R["rp -> [tif per tile]"] -->|"max_merge() per rp"| M["merged rasters"]
//!     M -->|"merge_rasters()"| H
//!     C["sorted chunk files"] -->|"concat_chunks()"| H
//! ```
//!
//! Rasters and chunks are loaded through the [`drisk_hazard::RasterSource`]
//! and [`drisk_hazard::HazardSource`] traits.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `concat` | Per-tile hazards concatenated without centroid deduplication |
//! | `merge` | Pixel-wise maximum merge of overlapping tiles |
//! | `chunks` | Ordered concatenation of simulation chunks |
//! | `spec` | Hazard type and unit of assembled sets |
//! | `error` | Error types |

mod chunks;
mod concat;
mod error;
mod merge;
mod spec;
#[cfg(test)]
mod testing;

pub use chunks::concat_chunks;
pub use concat::concat_tiles;
pub use error::AssembleError;
pub use merge::{max_merge, merge_rasters};
pub use spec::HazardSpec;
