//! Damage matrices and per-event impact summaries.

use std::cmp::Ordering;

use drisk_hazard::{CsrBuilder, CsrMatrix, HazardSet};
use drisk_stats::interp;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::assign::CentroidAssignment;
use crate::error::ImpactError;
use crate::exposure::Exposures;
use crate::impf::{ImpactFunc, ImpactFuncSet};

// ---------------------------------------------------------------------------
// Damage matrix
// ---------------------------------------------------------------------------

/// Computes the events x exposures damage matrix `value * mdd(I) * paa(I)`.
///
/// Only intensities stored in the hazard matrix are evaluated, so a
/// function with non-zero damage at zero intensity contributes nothing
/// where the hazard is absent. Points without a centroid in range get an
/// empty column.
///
/// # Errors
///
/// Returns [`ImpactError::ShapeMismatch`] if the assignment does not cover
/// every exposure point, [`ImpactError::Unassigned`] if a point has no
/// impact function id and [`ImpactError::UnknownImpactFunction`] if an id is
/// missing from `impf_set`.
#[tracing::instrument(skip_all, fields(events = hazard.n_events(), points = exposures.len()))]
pub fn damage_matrix(
    hazard: &HazardSet,
    exposures: &Exposures,
    impf_set: &ImpactFuncSet,
    assignment: &CentroidAssignment,
) -> Result<CsrMatrix, ImpactError> {
    if assignment.len() != exposures.len() {
        return Err(ImpactError::ShapeMismatch {
            what: "centroid assignment length".to_string(),
            expected: exposures.len(),
            got: assignment.len(),
        });
    }

    let funcs: Vec<&ImpactFunc> = exposures
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let id = p.impf_id.ok_or(ImpactError::Unassigned { index: i })?;
            impf_set
                .get(id)
                .ok_or(ImpactError::UnknownImpactFunction { id })
        })
        .collect::<Result<_, _>>()?;

    let unassigned = assignment.unassigned();
    if unassigned > 0 {
        warn!(unassigned, "exposure points without a centroid in range");
    }

    let by_centroid = assignment.points_per_centroid(hazard.n_centroids());
    let points = exposures.points();
    let intensity = hazard.intensity();

    let rows: Vec<Vec<(usize, f64)>> = (0..intensity.nrows())
        .into_par_iter()
        .map(|r| {
            let (cols, vals) = intensity.row(r);
            let mut row: Vec<(usize, f64)> = cols
                .iter()
                .zip(vals)
                .flat_map(|(&c, &i)| {
                    by_centroid[c]
                        .iter()
                        .map(move |&p| (p, i))
                })
                .map(|(p, i)| (p, points[p].value * funcs[p].damage_ratio(i)))
                .collect();
            row.sort_unstable_by_key(|(p, _)| *p);
            row
        })
        .collect();

    let mut builder = CsrBuilder::new(exposures.len());
    for row in rows {
        builder.push_sparse_row(row);
    }
    let matrix = builder.finish();
    debug!(nnz = matrix.nnz(), "damage matrix computed");
    Ok(matrix)
}

/// Boolean matrix of damages strictly above `thresh`.
pub fn exceedance_matrix(damage: &CsrMatrix, thresh: f64) -> CsrMatrix {
    damage.threshold(thresh)
}

// ---------------------------------------------------------------------------
// Event impact
// ---------------------------------------------------------------------------

/// Total impact per event together with event frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct EventImpact {
    at_event: Vec<f64>,
    frequency: Vec<f64>,
}

impl EventImpact {
    /// Builds per-event totals from precomputed values.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::ShapeMismatch`] when the slices differ in length.
    pub fn new(at_event: Vec<f64>, frequency: Vec<f64>) -> Result<Self, ImpactError> {
        if at_event.len() != frequency.len() {
            return Err(ImpactError::ShapeMismatch {
                what: "event frequencies".to_string(),
                expected: at_event.len(),
                got: frequency.len(),
            });
        }
        Ok(Self {
            at_event,
            frequency,
        })
    }

    /// Sums each row of an impact matrix.
    pub fn from_matrix(matrix: &CsrMatrix, frequency: &[f64]) -> Result<Self, ImpactError> {
        Self::new(matrix.row_sums(), frequency.to_vec())
    }

    pub fn at_event(&self) -> &[f64] {
        &self.at_event
    }

    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Average annual impact: `sum(frequency * at_event)`.
    pub fn aai_agg(&self) -> f64 {
        self.at_event
            .iter()
            .zip(&self.frequency)
            .map(|(i, f)| i * f)
            .sum()
    }

    /// Impact at each return period from the exceedance frequency curve.
    ///
    /// Events are ranked by decreasing impact and their frequencies
    /// accumulated; the curve is interpolated linearly in return period and
    /// clamped at both ends. Returns zeros when there are no events.
    pub fn freq_curve(&self, return_periods: &[u32]) -> Vec<f64> {
        let mut order: Vec<usize> = (0..self.at_event.len()).collect();
        order.sort_by(|&a, &b| {
            self.at_event[b]
                .partial_cmp(&self.at_event[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut cum = 0.0;
        let cum_freq: Vec<f64> = order
            .iter()
            .map(|&e| {
                cum += self.frequency[e];
                cum
            })
            .collect();

        let curve_rp: Vec<f64> = cum_freq.iter().rev().map(|f| 1.0 / f).collect();
        let curve_imp: Vec<f64> = order.iter().rev().map(|&e| self.at_event[e]).collect();

        return_periods
            .iter()
            .map(|&rp| interp(f64::from(rp), &curve_rp, &curve_imp).unwrap_or(0.0))
            .collect()
    }
}
