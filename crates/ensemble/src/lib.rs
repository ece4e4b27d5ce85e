//! # drisk-ensemble
//!
//! Multi-model scenario differencing. Model runs are reduced to deltas
//! against their own historical run, the deltas are combined by median and
//! added to an observational reference.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     R["RunMetrics (model, scenario, period)"] --> H{"has hist run?"}
//!     H -->|"yes"| D["future - hist"]
//!     H -->|"no"| W["warn + skip"]
//!     D --> M["median per (period, scenario)"]
//!     M --> C["reference hist + median delta"]
//!     C --> O["OutputRow"]
//!     O -->|"admin0 rows of every country"| G["GlobalTotals"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_ensemble::{DifferencerConfig, RunKey, RunMetrics, difference, metric_names};
//!
//! let metrics = metric_names(&[10, 25, 50, 100, 250]);
//! let runs = vec![
//!     RunMetrics::from_impact(RunKey::parse("ERA-5_hist"), aai, &curve),
//!     // ...
//! ];
//! let rows = difference("admin0", &runs, metrics.len(), &DifferencerConfig::default())?;
//! ```

mod differ;
mod error;
mod global;
mod run;

pub use differ::{DifferencerConfig, OutputRow, difference, ensemble_median};
pub use error::EnsembleError;
pub use global::GlobalTotals;
pub use run::{ANNUAL_METRIC, RunKey, RunMetrics, metric_names};
