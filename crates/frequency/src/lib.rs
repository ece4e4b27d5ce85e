//! # drisk-frequency
//!
//! Rescales per-event frequencies of an assembled event set so that, within
//! each simulation year, they sum to that year's calibrated annual rate
//! divided by the number of simulated years.
//!
//! ## Quick Start
//!
//! ```ignore
//! use drisk_frequency::{CalibrationTable, YearSpan, correct_frequencies};
//!
//! let table = CalibrationTable::from_pairs([(1980, 11.2), (1981, 9.7)])?;
//! let report = correct_frequencies(&mut hazard, &table, YearSpan::Fixed(20))?;
//! ```
//!
//! `YearSpan::Derived` uses `max(year) - min(year) + 1` from the event dates
//! instead of a fixed count.

mod correct;
mod error;
mod table;

pub use correct::{CorrectionReport, YearSpan, correct_frequencies, correct_with_positional};
pub use error::FrequencyError;
pub use table::CalibrationTable;
