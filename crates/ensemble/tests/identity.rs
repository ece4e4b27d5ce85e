use approx::assert_relative_eq;
use drisk_ensemble::{DifferencerConfig, RunKey, RunMetrics, difference, metric_names};

const MODELS: [&str; 4] = ["cesm2", "miroc6", "mpi6", "ukmo6"];

fn runs_with_delta(delta: f64) -> Vec<RunMetrics> {
    let n = metric_names(&[10, 25, 50, 100, 250]).len();
    let mut runs = vec![RunMetrics::new(
        RunKey::parse("ERA-5_hist"),
        (0..n).map(|i| 100.0 + i as f64).collect(),
    )];
    for (m, model) in MODELS.iter().enumerate() {
        let hist: Vec<f64> = (0..n).map(|i| (m * 10 + i) as f64).collect();
        for period in ["2050", "2100"] {
            runs.push(RunMetrics::new(
                RunKey::new(*model, "rcp45", period),
                hist.iter().map(|h| h + delta).collect(),
            ));
        }
        runs.push(RunMetrics::new(RunKey::new(*model, "hist", ""), hist));
    }
    runs
}

#[test]
fn zero_deltas_reproduce_reference() {
    let rows = difference("admin0", &runs_with_delta(0.0), 6, &DifferencerConfig::default()).unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows[1..] {
        assert_eq!(row.scenario, "rcp45");
        assert_eq!(row.values, rows[0].values);
    }
}

#[test]
fn uniform_delta_shifts_every_metric() {
    let rows = difference("admin1_2", &runs_with_delta(7.5), 6, &DifferencerConfig::default()).unwrap();
    assert_eq!(rows[0].exposure, "admin1_2");
    assert_eq!(
        rows.iter().map(|r| r.period.as_str()).collect::<Vec<_>>(),
        ["hist", "2050", "2100"]
    );
    for row in &rows[1..] {
        for (v, r) in row.values.iter().zip(&rows[0].values) {
            assert_relative_eq!(*v, r + 7.5, epsilon = 1e-12);
        }
    }
}
