//! Per-simulation-year frequency correction.

use std::collections::BTreeMap;

use drisk_calendar::{YearRange, events_per_year, years_of};
use drisk_hazard::HazardSet;
use tracing::{debug, info, warn};

use crate::error::FrequencyError;
use crate::table::CalibrationTable;

/// How `total_simulation_years` is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSpan {
    /// A caller-supplied number of simulated years.
    Fixed(u32),
    /// `max(year) - min(year) + 1` over the event dates.
    Derived,
}

/// Summary of a frequency correction.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReport {
    /// Total simulation years used as the denominator.
    pub total_years: u32,
    /// Number of events per simulation year.
    pub events_per_year: BTreeMap<i32, usize>,
    /// Years present in the events but absent from the table.
    pub uncalibrated_years: Vec<i32>,
}

/// Rescales event frequencies so that each simulation year's events share
/// that year's calibrated rate equally.
///
/// ```text
/// frequency[e] = rate[year(e)] / (events_in(year(e)) * total_years)
/// ```
///
/// Years with a zero rate, or without a table entry, give zero frequency to
/// their events. Table entries for years without events are unused. The
/// structural check runs on the corrected set.
///
/// # Errors
///
/// Returns [`FrequencyError::NoEvents`] for an empty set,
/// [`FrequencyError::ZeroYearSpan`] for `YearSpan::Fixed(0)`,
/// [`FrequencyError::Calendar`] for an unconvertible date, or
/// [`FrequencyError::Hazard`] if the corrected set fails its check.
#[tracing::instrument(skip_all, fields(events = hazard.n_events(), ?span))]
pub fn correct_frequencies(
    hazard: &mut HazardSet,
    table: &CalibrationTable,
    span: YearSpan,
) -> Result<CorrectionReport, FrequencyError> {
    let years = years_of(hazard.date())?;
    let range = YearRange::from_years(&years).ok_or(FrequencyError::NoEvents)?;
    let total_years = match span {
        YearSpan::Fixed(0) => return Err(FrequencyError::ZeroYearSpan),
        YearSpan::Fixed(n) => n,
        YearSpan::Derived => range.span(),
    };

    let counts = events_per_year(&years);
    let uncalibrated_years: Vec<i32> = counts
        .keys()
        .copied()
        .filter(|&y| table.rate(y).is_none())
        .collect();
    if !uncalibrated_years.is_empty() {
        warn!(
            years = ?uncalibrated_years,
            "simulation years without calibration rate get zero frequency"
        );
    }

    let frequency: Vec<f64> = years
        .iter()
        .map(|y| {
            let rate = table.rate(*y).unwrap_or(0.0);
            rate / (counts[y] as f64 * f64::from(total_years))
        })
        .collect();

    hazard.set_frequencies(frequency)?;
    hazard.check()?;

    debug!(years = counts.len(), first = range.first(), last = range.last(), "frequency per-year counts");
    info!(total_years, "corrected event frequencies");
    Ok(CorrectionReport {
        total_years,
        events_per_year: counts,
        uncalibrated_years,
    })
}

/// Corrects frequencies using a per-year array aligned positionally with
/// the event set's sorted distinct years.
///
/// # Errors
///
/// As [`CalibrationTable::from_positional`] and [`correct_frequencies`].
pub fn correct_with_positional(
    hazard: &mut HazardSet,
    values: &[f64],
    span: YearSpan,
) -> Result<CorrectionReport, FrequencyError> {
    let years = years_of(hazard.date())?;
    let table = CalibrationTable::from_positional(values, &years)?;
    correct_frequencies(hazard, &table, span)
}
