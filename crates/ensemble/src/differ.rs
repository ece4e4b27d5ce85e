//! Ensemble medians and delta-corrected future projections.

use std::collections::{BTreeMap, BTreeSet};

use drisk_stats::nan_median;
use tracing::{debug, info, warn};

use crate::error::EnsembleError;
use crate::run::{RunKey, RunMetrics};

/// Labels that identify the reference run and historical runs.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencerConfig {
    /// Observational reference model, e.g. `ERA-5`.
    pub reference_model: String,
    /// Scenario label of historical runs.
    pub hist_scenario: String,
    /// Period written on the reference output row.
    pub hist_period: String,
    /// Future periods for which deltas are computed.
    pub future_periods: Vec<String>,
}

impl Default for DifferencerConfig {
    fn default() -> Self {
        Self {
            reference_model: "ERA-5".to_string(),
            hist_scenario: "hist".to_string(),
            hist_period: "hist".to_string(),
            future_periods: vec!["2050".to_string(), "2100".to_string()],
        }
    }
}

impl DifferencerConfig {
    pub fn with_reference_model(mut self, model: impl Into<String>) -> Self {
        self.reference_model = model.into();
        self
    }

    pub fn with_future_periods(mut self, periods: Vec<String>) -> Self {
        self.future_periods = periods;
        self
    }
}

/// One row of the corrected output table.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    /// Exposure subdivision, e.g. `admin0` or `admin1_4`.
    pub exposure: String,
    pub period: String,
    pub scenario: String,
    /// Values in metric order.
    pub values: Vec<f64>,
}

/// Median across models of every (scenario, period) group, with the
/// reference model excluded.
pub fn ensemble_median(
    runs: &[RunMetrics],
    config: &DifferencerConfig,
) -> BTreeMap<(String, String), Vec<f64>> {
    let mut groups: BTreeMap<(String, String), Vec<&[f64]>> = BTreeMap::new();
    for r in runs.iter().filter(|r| r.key.model != config.reference_model) {
        groups
            .entry((r.key.scenario.clone(), r.key.period.clone()))
            .or_default()
            .push(r.values.as_slice());
    }
    groups
        .into_iter()
        .map(|(k, members)| (k, column_medians(&members)))
        .collect()
}

fn column_medians(rows: &[&[f64]]) -> Vec<f64> {
    let width = rows.first().map_or(0, |r| r.len());
    (0..width)
        .map(|m| {
            let col: Vec<f64> = rows.iter().map(|r| r[m]).collect();
            nan_median(&col).unwrap_or(f64::NAN)
        })
        .collect()
}

fn check_runs(runs: &[RunMetrics], n_metrics: usize) -> Result<(), EnsembleError> {
    let mut seen = BTreeSet::new();
    for r in runs {
        if r.values.len() != n_metrics {
            return Err(EnsembleError::MetricMismatch {
                run: r.key.to_string(),
                expected: n_metrics,
                got: r.values.len(),
            });
        }
        if !seen.insert(&r.key) {
            return Err(EnsembleError::DuplicateRun {
                run: r.key.to_string(),
            });
        }
    }
    Ok(())
}

/// Corrects model projections with the reference historical run.
///
/// For each model with a historical run, the delta `future - hist` is taken
/// per metric for every future period; models without one are skipped with
/// a warning. The median delta per (scenario, period) is added to the
/// reference values. The output starts with the reference row, followed by
/// one row per (period, scenario) in sorted order.
///
/// # Errors
///
/// Returns [`EnsembleError::MissingReference`] if the reference model has no
/// historical run, [`EnsembleError::MetricMismatch`] if a run has the wrong
/// number of values, or [`EnsembleError::DuplicateRun`].
#[tracing::instrument(skip_all, fields(subdivision = subdivision, runs = runs.len()))]
pub fn difference(
    subdivision: &str,
    runs: &[RunMetrics],
    n_metrics: usize,
    config: &DifferencerConfig,
) -> Result<Vec<OutputRow>, EnsembleError> {
    check_runs(runs, n_metrics)?;

    let is_hist = |k: &RunKey| k.scenario == config.hist_scenario;
    let reference = runs
        .iter()
        .find(|r| r.key.model == config.reference_model && is_hist(&r.key))
        .ok_or_else(|| EnsembleError::MissingReference {
            model: config.reference_model.clone(),
            subdivision: subdivision.to_string(),
        })?;

    let hist_of: BTreeMap<&str, &[f64]> = runs
        .iter()
        .filter(|r| is_hist(&r.key))
        .map(|r| (r.key.model.as_str(), r.values.as_slice()))
        .collect();

    let mut deltas: BTreeMap<(String, String), Vec<Vec<f64>>> = BTreeMap::new();
    let mut skipped = BTreeSet::new();
    for r in runs.iter().filter(|r| {
        !is_hist(&r.key) && config.future_periods.iter().any(|p| *p == r.key.period)
    }) {
        let Some(hist) = hist_of.get(r.key.model.as_str()) else {
            skipped.insert(r.key.model.as_str());
            continue;
        };
        let delta = r.values.iter().zip(*hist).map(|(f, h)| f - h).collect();
        deltas
            .entry((r.key.period.clone(), r.key.scenario.clone()))
            .or_default()
            .push(delta);
    }
    for model in &skipped {
        warn!(model, subdivision, "model has no historical run, excluded from deltas");
    }

    let mut rows = vec![OutputRow {
        exposure: subdivision.to_string(),
        period: config.hist_period.clone(),
        scenario: config.reference_model.clone(),
        values: reference.values.clone(),
    }];
    for ((period, scenario), members) in deltas {
        let refs: Vec<&[f64]> = members.iter().map(Vec::as_slice).collect();
        let median = column_medians(&refs);
        debug!(%period, %scenario, models = members.len(), "median delta");
        rows.push(OutputRow {
            exposure: subdivision.to_string(),
            period,
            scenario,
            values: reference
                .values
                .iter()
                .zip(&median)
                .map(|(r, d)| r + d)
                .collect(),
        });
    }
    info!(subdivision, rows = rows.len(), "scenario differencing done");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(key: &str, values: &[f64]) -> RunMetrics {
        RunMetrics::new(RunKey::parse(key), values.to_vec())
    }

    #[test]
    fn ensemble_median_excludes_reference() {
        let runs = vec![
            run("ERA-5_hist", &[100.0]),
            run("a_hist", &[1.0]),
            run("b_hist", &[3.0]),
            run("c_hist", &[2.0]),
            run("a_rcp45_2050", &[10.0]),
        ];
        let med = ensemble_median(&runs, &DifferencerConfig::default());
        assert_eq!(med[&("hist".to_string(), String::new())], vec![2.0]);
        assert_eq!(med[&("rcp45".to_string(), "2050".to_string())], vec![10.0]);
        assert_eq!(med.len(), 2);
    }

    #[test]
    fn delta_median_added_to_reference() {
        let runs = vec![
            run("ERA-5_hist", &[10.0, 100.0]),
            run("a_hist", &[1.0, 10.0]),
            run("a_rcp45_2050", &[2.0, 30.0]),
            run("b_hist", &[5.0, 50.0]),
            run("b_rcp45_2050", &[9.0, 40.0]),
            run("a_rcp45_2100", &[4.0, 10.0]),
        ];
        let rows = difference("admin0", &runs, 2, &DifferencerConfig::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].scenario, "ERA-5");
        assert_eq!(rows[0].period, "hist");
        assert_eq!(rows[0].values, vec![10.0, 100.0]);

        assert_eq!((rows[1].period.as_str(), rows[1].scenario.as_str()), ("2050", "rcp45"));
        // deltas (1, 20) and (4, -10)
        assert_relative_eq!(rows[1].values[0], 12.5);
        assert_relative_eq!(rows[1].values[1], 105.0);

        assert_eq!(rows[2].period, "2100");
        assert_relative_eq!(rows[2].values[0], 13.0);
        assert_relative_eq!(rows[2].values[1], 100.0);
    }

    #[test]
    fn models_without_hist_are_excluded() {
        let runs = vec![
            run("ERA-5_hist", &[10.0]),
            run("a_hist", &[1.0]),
            run("a_rcp26_2050", &[2.0]),
            run("orphan_rcp26_2050", &[500.0]),
        ];
        let rows = difference("admin1_1", &runs, 1, &DifferencerConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_relative_eq!(rows[1].values[0], 11.0);
    }

    #[test]
    fn unknown_periods_are_ignored() {
        let runs = vec![run("ERA-5_hist", &[1.0]), run("a_hist", &[1.0]), run("a_rcp45_2030", &[9.0])];
        let rows = difference("admin0", &runs, 1, &DifferencerConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_reference_is_fatal() {
        let runs = vec![run("a_hist", &[1.0])];
        let err = difference("admin0", &runs, 1, &DifferencerConfig::default()).unwrap_err();
        assert!(matches!(err, EnsembleError::MissingReference { .. }));
    }

    #[test]
    fn metric_count_checked() {
        let runs = vec![run("ERA-5_hist", &[1.0, 2.0])];
        let err = difference("admin0", &runs, 3, &DifferencerConfig::default()).unwrap_err();
        assert!(matches!(err, EnsembleError::MetricMismatch { expected: 3, got: 2, .. }));
    }

    #[test]
    fn duplicate_runs_rejected() {
        let runs = vec![run("ERA-5_hist", &[1.0]), run("ERA-5_hist", &[2.0])];
        let err = difference("admin0", &runs, 1, &DifferencerConfig::default()).unwrap_err();
        assert!(matches!(err, EnsembleError::DuplicateRun { .. }));
    }

    #[test]
    fn custom_reference_label() {
        let config = DifferencerConfig::default().with_reference_model("OBS");
        let runs = vec![run("OBS_hist", &[4.0])];
        let rows = difference("admin0", &runs, 1, &config).unwrap();
        assert_eq!(rows[0].scenario, "OBS");
    }
}
