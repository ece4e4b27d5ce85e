//! # drisk-impact
//!
//! Exposure points, impact functions and the aggregation of impact
//! matrices into per-admin-unit return-period and annual expected values.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph TD
//!     H["HazardSet"] --> D["damage_matrix()"]
//!     X["Exposures"] -->|"CentroidAssignment::nearest()"| D
//!     F["ImpactFuncSet"] --> D
//!     D -->|"threshold()"| M["exceedance matrix"]
//!     D --> E["EventImpact (aai_agg, freq_curve)"]
//!     M --> A["aggregate_return_periods()"]
//!     A --> T["ImpactTable"]
//!     T -->|"compute_aed() / roll_up_admin0()"| T
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_impact::{
//!     CentroidAssignment, DEFAULT_MAX_DISTANCE_KM, Grouping, aggregate_return_periods,
//!     compute_aed, damage_matrix, roll_up_admin0,
//! };
//!
//! let assign = CentroidAssignment::nearest(&exposures, hazard.centroids(), DEFAULT_MAX_DISTANCE_KM);
//! let damage = damage_matrix(&hazard, &exposures.with_uniform_value(1.0), &impfs, &assign)?;
//! let mut table = aggregate_return_periods(
//!     &damage.threshold(0.3), &exposures, &[10, 25, 50, 100], "low", Grouping::Admin1,
//! )?;
//! compute_aed(&mut table, &[10, 25, 50, 100], "low")?;
//! roll_up_admin0(&mut table)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `exposure` | Exposure points and admin1 subsets |
//! | `impf` | Piecewise-linear impact functions and step thresholds |
//! | `assign` | Nearest-centroid assignment via an R-tree |
//! | `calc` | Damage matrices and per-event impact curves |
//! | `aggregate` | Stride-based return-period aggregation |
//! | `reduce` | AED, admin0 roll-up, scenario spread |
//! | `table` | Labelled impact table |
//! | `pool` | Bounded fork-join runner |
//! | `error` | Error types |

mod aggregate;
mod assign;
mod calc;
mod error;
mod exposure;
mod impf;
mod pool;
mod reduce;
mod table;

pub use aggregate::{Grouping, aggregate_return_periods, rp_column};
pub use assign::{CentroidAssignment, DEFAULT_MAX_DISTANCE_KM, haversine_km};
pub use calc::{EventImpact, damage_matrix, exceedance_matrix};
pub use error::ImpactError;
pub use exposure::{ExposurePoint, Exposures};
pub use impf::{ImpactFunc, ImpactFuncSet};
pub use pool::run_per_unit;
pub use reduce::{ADMIN0_LABEL, aed_column, compute_aed, roll_up_admin0, scenario_spread};
pub use table::ImpactTable;
