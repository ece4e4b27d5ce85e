//! Annual expected values, admin0 roll-up and cross-scenario spread.

use std::cmp::Ordering;

use drisk_stats::median_sorted;

use crate::aggregate::rp_column;
use crate::error::ImpactError;
use crate::table::ImpactTable;

/// Label of the national roll-up row.
pub const ADMIN0_LABEL: &str = "admin0";

/// Column name for the annual expected value.
pub fn aed_column(label: &str) -> String {
    format!("aed_{label}")
}

/// Adds `aed_{label} = sum(imp_rp_{rp}_{label} / rp)` to the table.
///
/// # Errors
///
/// Returns [`ImpactError::MissingColumn`] if a return-period column is absent.
pub fn compute_aed(table: &mut ImpactTable, rps: &[u32], label: &str) -> Result<(), ImpactError> {
    let mut aed = vec![0.0; table.n_rows()];
    for &rp in rps {
        let col = table.column(&rp_column(rp, label))?;
        for (a, v) in aed.iter_mut().zip(col) {
            *a += v / f64::from(rp);
        }
    }
    table.add_column(aed_column(label), aed)
}

/// Appends an `admin0` row holding the sum of every column.
///
/// # Errors
///
/// Returns [`ImpactError::DuplicateRow`] if the table already has one.
pub fn roll_up_admin0(table: &mut ImpactTable) -> Result<(), ImpactError> {
    let names: Vec<String> = table.column_names().map(str::to_string).collect();
    let sums = names
        .iter()
        .map(|n| table.column(n).map(|c| c.iter().sum()))
        .collect::<Result<Vec<f64>, _>>()?;
    table.push_row(ADMIN0_LABEL, sums)
}

/// Minimum, median and maximum per return period and of the AED across
/// several scenario tables with identical rows.
///
/// Each entry of `scenarios` is a table with its damage label. The result
/// has columns `rp_{rp}_{min,med,max}` and `aed_{min,med,max}`.
///
/// # Errors
///
/// Returns [`ImpactError::MissingColumn`] if a table lacks an expected
/// column, or [`ImpactError::ShapeMismatch`] if row labels differ.
pub fn scenario_spread(
    scenarios: &[(&ImpactTable, &str)],
    rps: &[u32],
) -> Result<ImpactTable, ImpactError> {
    let Some((first, _)) = scenarios.first() else {
        return ImpactTable::new(Vec::new());
    };
    for (t, _) in scenarios {
        if t.labels() != first.labels() {
            return Err(ImpactError::ShapeMismatch {
                what: "scenario table rows".to_string(),
                expected: first.n_rows(),
                got: t.n_rows(),
            });
        }
    }

    let mut out = ImpactTable::new(first.labels().to_vec())?;
    let mut groups: Vec<(String, Vec<String>)> = rps
        .iter()
        .map(|&rp| {
            let names = scenarios.iter().map(|(_, l)| rp_column(rp, l)).collect();
            (format!("rp_{rp}"), names)
        })
        .collect();
    groups.push((
        "aed".to_string(),
        scenarios.iter().map(|(_, l)| aed_column(l)).collect(),
    ));

    for (prefix, names) in groups {
        let cols = scenarios
            .iter()
            .zip(&names)
            .map(|((t, _), n)| t.column(n))
            .collect::<Result<Vec<_>, _>>()?;
        let mut mins = Vec::with_capacity(out.n_rows());
        let mut meds = Vec::with_capacity(out.n_rows());
        let mut maxs = Vec::with_capacity(out.n_rows());
        for r in 0..out.n_rows() {
            let mut vals: Vec<f64> = cols.iter().map(|c| c[r]).collect();
            vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            mins.push(vals[0]);
            meds.push(median_sorted(&vals));
            maxs.push(vals[vals.len() - 1]);
        }
        out.add_column(format!("{prefix}_min"), mins)?;
        out.add_column(format!("{prefix}_med"), meds)?;
        out.add_column(format!("{prefix}_max"), maxs)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rp_table(label: &str, rp10: &[f64], rp100: &[f64]) -> ImpactTable {
        let mut t = ImpactTable::new(vec!["A".into(), "B".into()]).unwrap();
        t.add_column(rp_column(10, label), rp10.to_vec()).unwrap();
        t.add_column(rp_column(100, label), rp100.to_vec()).unwrap();
        t
    }

    #[test]
    fn aed_sums_over_return_periods() {
        let mut t = rp_table("low", &[10.0, 0.0], &[100.0, 50.0]);
        compute_aed(&mut t, &[10, 100], "low").unwrap();
        let aed = t.column("aed_low").unwrap();
        assert_relative_eq!(aed[0], 2.0);
        assert_relative_eq!(aed[1], 0.5);
    }

    #[test]
    fn aed_missing_column() {
        let mut t = rp_table("low", &[1.0, 1.0], &[1.0, 1.0]);
        let err = compute_aed(&mut t, &[10, 25], "low").unwrap_err();
        assert!(matches!(err, ImpactError::MissingColumn { name } if name == "imp_rp_25_low"));
    }

    #[test]
    fn admin0_row_appended() {
        let mut t = rp_table("x", &[1.0, 2.0], &[3.0, 4.0]);
        roll_up_admin0(&mut t).unwrap();
        assert_eq!(t.labels(), &["A", "B", "admin0"]);
        assert_eq!(t.row("admin0"), Some(vec![3.0, 7.0]));
        assert_eq!(t.row("A"), Some(vec![1.0, 3.0]));
        assert!(roll_up_admin0(&mut t).is_err());
    }

    #[test]
    fn spread_across_scenarios() {
        let mut tables = vec![
            rp_table("s1", &[1.0, 10.0], &[5.0, 0.0]),
            rp_table("s2", &[3.0, 30.0], &[6.0, 0.0]),
            rp_table("s3", &[2.0, 20.0], &[9.0, 0.0]),
        ];
        for (t, l) in tables.iter_mut().zip(["s1", "s2", "s3"]) {
            compute_aed(t, &[10, 100], l).unwrap();
        }
        let input: Vec<(&ImpactTable, &str)> =
            tables.iter().zip(["s1", "s2", "s3"]).collect();
        let s = scenario_spread(&input, &[10, 100]).unwrap();
        assert_eq!(s.get("A", "rp_10_min"), Some(1.0));
        assert_eq!(s.get("A", "rp_10_med"), Some(2.0));
        assert_eq!(s.get("A", "rp_10_max"), Some(3.0));
        assert_eq!(s.get("B", "rp_100_max"), Some(0.0));
        assert_relative_eq!(s.get("B", "aed_max").unwrap(), 3.0);
        assert_relative_eq!(s.get("B", "aed_min").unwrap(), 1.0);
    }
}
