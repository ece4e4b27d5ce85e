//! Return-period aggregation of impact matrices.

use drisk_hazard::CsrMatrix;
use tracing::debug;

use crate::error::ImpactError;
use crate::exposure::Exposures;
use crate::table::ImpactTable;

/// How aggregated values are grouped into table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One row per exposure point, labelled by its index.
    None,
    /// One row per admin1 unit, sorted by label.
    Admin1,
}

/// Column name for the impact at return period `rp`.
pub fn rp_column(rp: u32, label: &str) -> String {
    format!("imp_rp_{rp}_{label}")
}

/// Aggregates a stacked impact matrix into one column per return period.
///
/// Row `r` of `matrix` belongs to return period `rps[r % rps.len()]`; rows
/// of the same return period are summed column-wise and weighted by the
/// exposure value of each point before grouping.
///
/// # Errors
///
/// Returns [`ImpactError::ShapeMismatch`] when `rps` is empty, the row
/// count is not a multiple of `rps.len()`, or the column count differs
/// from the number of exposure points.
#[tracing::instrument(skip_all, fields(label = label, rows = matrix.nrows(), rps = rps.len()))]
pub fn aggregate_return_periods(
    matrix: &CsrMatrix,
    exposures: &Exposures,
    rps: &[u32],
    label: &str,
    grouping: Grouping,
) -> Result<ImpactTable, ImpactError> {
    let stride = rps.len();
    if stride == 0 {
        return Err(ImpactError::ShapeMismatch {
            what: "return periods".to_string(),
            expected: 1,
            got: 0,
        });
    }
    if matrix.nrows() % stride != 0 {
        return Err(ImpactError::ShapeMismatch {
            what: format!("impact matrix rows (multiple of {stride})"),
            expected: matrix.nrows().next_multiple_of(stride),
            got: matrix.nrows(),
        });
    }
    if matrix.ncols() != exposures.len() {
        return Err(ImpactError::ShapeMismatch {
            what: "impact matrix columns".to_string(),
            expected: exposures.len(),
            got: matrix.ncols(),
        });
    }

    let weights = exposures.values();
    let (labels, groups): (Vec<String>, Vec<Vec<usize>>) = match grouping {
        Grouping::None => (0..exposures.len())
            .map(|i| (i.to_string(), vec![i]))
            .unzip(),
        Grouping::Admin1 => exposures
            .admin1_units()
            .into_iter()
            .map(|u| {
                let idx = exposures.admin1_indices(&u);
                (u, idx)
            })
            .unzip(),
    };

    let mut table = ImpactTable::new(labels)?;
    for (i, &rp) in rps.iter().enumerate() {
        let sums = matrix.strided_column_sums(i, stride);
        let weighted: Vec<f64> = sums.iter().zip(&weights).map(|(s, w)| s * w).collect();
        let values = groups
            .iter()
            .map(|g| g.iter().map(|&p| weighted[p]).sum())
            .collect();
        table.add_column(rp_column(rp, label), values)?;
    }
    debug!(rows = table.n_rows(), "aggregated return periods");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::point;
    use drisk_hazard::CsrBuilder;

    fn exposures() -> Exposures {
        Exposures::new(vec![
            point(0.0, 0.0, 10.0, "B"),
            point(1.0, 0.0, 20.0, "A"),
            point(2.0, 0.0, 30.0, "B"),
        ])
        .unwrap()
    }

    fn matrix(rows: &[[f64; 3]]) -> CsrMatrix {
        let mut b = CsrBuilder::new(3);
        for r in rows {
            b.push_dense_row(*r);
        }
        b.finish()
    }

    #[test]
    fn groups_by_admin1() {
        // rps [10, 25], two stacked scenarios
        let m = matrix(&[
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ]);
        let t = aggregate_return_periods(&m, &exposures(), &[10, 25], "low", Grouping::Admin1)
            .unwrap();
        assert_eq!(t.labels(), &["A", "B"]);
        assert_eq!(t.column("imp_rp_10_low").unwrap(), &[0.0, 40.0]);
        assert_eq!(t.column("imp_rp_25_low").unwrap(), &[40.0, 50.0]);
    }

    #[test]
    fn per_point_rows() {
        let m = matrix(&[[1.0, 0.0, 1.0]]);
        let t = aggregate_return_periods(&m, &exposures(), &[100], "x", Grouping::None).unwrap();
        assert_eq!(t.labels(), &["0", "1", "2"]);
        assert_eq!(t.column("imp_rp_100_x").unwrap(), &[10.0, 0.0, 30.0]);
    }

    #[test]
    fn row_count_must_be_multiple() {
        let m = matrix(&[[0.0; 3], [0.0; 3], [0.0; 3]]);
        let err = aggregate_return_periods(&m, &exposures(), &[10, 25], "x", Grouping::Admin1)
            .unwrap_err();
        assert!(matches!(
            err,
            ImpactError::ShapeMismatch {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn column_count_checked() {
        let mut b = CsrBuilder::new(2);
        b.push_dense_row([1.0, 1.0]);
        let err = aggregate_return_periods(&b.finish(), &exposures(), &[10], "x", Grouping::None)
            .unwrap_err();
        assert!(matches!(err, ImpactError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_return_periods_rejected() {
        let m = matrix(&[]);
        assert!(aggregate_return_periods(&m, &exposures(), &[], "x", Grouping::None).is_err());
    }
}
