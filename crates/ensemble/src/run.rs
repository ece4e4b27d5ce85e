//! Per-run impact metrics.

use std::fmt;

/// Name of the annual-average metric.
pub const ANNUAL_METRIC: &str = "AAD";

/// Metric names for the annual average followed by one `RP_{rp}` per
/// return period.
pub fn metric_names(return_periods: &[u32]) -> Vec<String> {
    std::iter::once(ANNUAL_METRIC.to_string())
        .chain(return_periods.iter().map(|rp| format!("RP_{rp}")))
        .collect()
}

/// Identity of one model run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunKey {
    pub model: String,
    pub scenario: String,
    /// Future period such as `2050`, empty for historical runs.
    pub period: String,
}

impl RunKey {
    pub fn new(model: impl Into<String>, scenario: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            scenario: scenario.into(),
            period: period.into(),
        }
    }

    /// Parses `model_scenario[_period]`. Missing parts are left empty.
    pub fn parse(key: &str) -> Self {
        let mut parts = key.splitn(3, '_');
        let mut next = || parts.next().unwrap_or_default().to_string();
        let model = next();
        let scenario = next();
        let period = next();
        Self {
            model,
            scenario,
            period,
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.period.is_empty() {
            write!(f, "{}_{}", self.model, self.scenario)
        } else {
            write!(f, "{}_{}_{}", self.model, self.scenario, self.period)
        }
    }
}

/// Metric values of one run, ordered like the shared metric list.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub key: RunKey,
    pub values: Vec<f64>,
}

impl RunMetrics {
    pub fn new(key: RunKey, values: Vec<f64>) -> Self {
        Self { key, values }
    }

    /// Annual average followed by per-return-period values.
    pub fn from_impact(key: RunKey, annual: f64, per_rp: &[f64]) -> Self {
        let mut values = Vec::with_capacity(per_rp.len() + 1);
        values.push(annual);
        values.extend_from_slice(per_rp);
        Self { key, values }
    }
}
