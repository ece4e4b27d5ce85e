//! Global totals over per-country national rows.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::differ::OutputRow;
use crate::error::EnsembleError;

/// Running global sums and summed relative changes for one
/// (scenario, threshold) across countries.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalTotals {
    metrics: Vec<String>,
    hist_period: String,
    sums: BTreeMap<String, Vec<f64>>,
    relative: BTreeMap<String, Vec<f64>>,
    countries: usize,
}

impl GlobalTotals {
    pub fn new(metrics: Vec<String>, hist_period: impl Into<String>) -> Self {
        Self {
            metrics,
            hist_period: hist_period.into(),
            sums: BTreeMap::new(),
            relative: BTreeMap::new(),
            countries: 0,
        }
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Number of countries added so far.
    pub fn countries(&self) -> usize {
        self.countries
    }

    /// Adds one country's national rows, one per period.
    ///
    /// Every value is added to its period's sum; NaN values are skipped.
    /// For each future row, `(future - hist) / hist` is added to that
    /// period's relative change per metric, skipping metrics whose hist
    /// value is zero or non-finite. A country without a hist row adds to
    /// the sums only.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::MetricMismatch`] if a row's width differs
    /// from the metric count, or [`EnsembleError::DuplicateRun`] if a period
    /// repeats. Nothing is added on error.
    pub fn add_country(&mut self, country: &str, rows: &[OutputRow]) -> Result<(), EnsembleError> {
        let mut seen = BTreeSet::new();
        for r in rows {
            let run = format!("{country}_{}_{}", r.scenario, r.period);
            if r.values.len() != self.metrics.len() {
                return Err(EnsembleError::MetricMismatch {
                    run,
                    expected: self.metrics.len(),
                    got: r.values.len(),
                });
            }
            if !seen.insert(r.period.as_str()) {
                return Err(EnsembleError::DuplicateRun { run });
            }
        }

        let width = self.metrics.len();
        for r in rows {
            let sums = self
                .sums
                .entry(r.period.clone())
                .or_insert_with(|| vec![0.0; width]);
            for (s, v) in sums.iter_mut().zip(&r.values) {
                if !v.is_nan() {
                    *s += v;
                }
            }
        }

        match rows.iter().find(|r| r.period == self.hist_period) {
            Some(hist) => {
                for r in rows.iter().filter(|r| r.period != self.hist_period) {
                    let rel = self
                        .relative
                        .entry(r.period.clone())
                        .or_insert_with(|| vec![0.0; width]);
                    for ((acc, f), h) in rel.iter_mut().zip(&r.values).zip(&hist.values) {
                        if h.is_finite() && *h != 0.0 && f.is_finite() {
                            *acc += (f - h) / h;
                        }
                    }
                }
            }
            None => warn!(country, "no historical row, relative changes skipped"),
        }

        self.countries += 1;
        debug!(country, periods = rows.len(), "country added to global totals");
        Ok(())
    }

    /// Per-period sums, historical period first.
    pub fn sums(&self) -> Vec<(&str, &[f64])> {
        self.ordered(&self.sums)
    }

    /// Per-future-period sums of relative changes.
    pub fn relative_changes(&self) -> Vec<(&str, &[f64])> {
        self.ordered(&self.relative)
    }

    fn ordered<'a>(&'a self, map: &'a BTreeMap<String, Vec<f64>>) -> Vec<(&'a str, &'a [f64])> {
        let hist = map
            .get_key_value(&self.hist_period)
            .map(|(k, v)| (k.as_str(), v.as_slice()));
        hist.into_iter()
            .chain(
                map.iter()
                    .filter(|(k, _)| **k != self.hist_period)
                    .map(|(k, v)| (k.as_str(), v.as_slice())),
            )
            .collect()
    }
}
