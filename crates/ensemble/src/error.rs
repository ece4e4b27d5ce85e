//! Error types for drisk-ensemble.

/// Error type for all fallible operations in the drisk-ensemble crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnsembleError {
    /// Returned when the observational reference has no historical run.
    #[error("reference model '{model}' has no historical run for '{subdivision}'")]
    MissingReference {
        /// Reference model label.
        model: String,
        /// Exposure subdivision being processed.
        subdivision: String,
    },

    /// Returned when a run carries a different number of values than there
    /// are metrics.
    #[error("run {run} has {got} values, expected {expected}")]
    MetricMismatch {
        /// `model_scenario_period` key of the offending run.
        run: String,
        /// Number of metrics.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when the same (model, scenario, period) appears twice.
    #[error("duplicate run {run}")]
    DuplicateRun {
        /// `model_scenario_period` key of the repeated run.
        run: String,
    },
}
