//! Statistical helper functions for the drisk pipeline.

use std::cmp::Ordering;

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median_sorted: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Median of unsorted data, skipping NaN values.
///
/// Returns `None` if no finite-or-infinite (non-NaN) value remains.
pub fn nan_median(data: &[f64]) -> Option<f64> {
    let mut values: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(median_sorted(&values))
}

/// One-dimensional piecewise-linear interpolation.
///
/// `xp` must be non-decreasing. Values of `x` outside `[xp[0], xp[n-1]]`
/// are clamped to the end values of `fp`. Returns `None` if `xp` is empty
/// or the slices differ in length.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    if xp.is_empty() || xp.len() != fp.len() {
        return None;
    }
    let n = xp.len();
    if x.is_nan() {
        return Some(f64::NAN);
    }
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[n - 1] {
        return Some(fp[n - 1]);
    }
    // First index with xp[hi] > x; x < xp[n-1] guarantees 1 <= hi < n.
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let dx = xp[hi] - xp[lo];
    if dx == 0.0 {
        return Some(fp[hi]);
    }
    let t = (x - xp[lo]) / dx;
    Some(fp[lo] + t * (fp[hi] - fp[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_sorted_odd() {
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_median_sorted_even() {
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "median_sorted: input must not be empty")]
    fn test_median_sorted_empty_panics() {
        median_sorted(&[]);
    }

    #[test]
    fn test_nan_median_unsorted() {
        assert_relative_eq!(nan_median(&[9.0, 1.0, 5.0]).unwrap(), 5.0);
        assert_relative_eq!(nan_median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_nan_median_skips_nan() {
        assert_relative_eq!(nan_median(&[f64::NAN, 2.0, 4.0]).unwrap(), 3.0);
        assert!(nan_median(&[f64::NAN]).is_none());
        assert!(nan_median(&[]).is_none());
    }

    #[test]
    fn test_interp_inside() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_relative_eq!(interp(0.5, &xp, &fp).unwrap(), 5.0);
        assert_relative_eq!(interp(2.0, &xp, &fp).unwrap(), 20.0);
        assert_relative_eq!(interp(1.0, &xp, &fp).unwrap(), 10.0);
    }

    #[test]
    fn test_interp_clamps() {
        let xp = [1.0, 2.0];
        let fp = [3.0, 7.0];
        assert_relative_eq!(interp(-5.0, &xp, &fp).unwrap(), 3.0);
        assert_relative_eq!(interp(50.0, &xp, &fp).unwrap(), 7.0);
    }

    #[test]
    fn test_interp_flat_segment() {
        // Repeated xp values: the right-hand value applies past the step.
        let xp = [0.0, 1.0, 1.0, 2.0];
        let fp = [0.0, 0.0, 1.0, 1.0];
        assert_relative_eq!(interp(1.5, &xp, &fp).unwrap(), 1.0);
    }

    #[test]
    fn test_interp_bad_input() {
        assert!(interp(1.0, &[], &[]).is_none());
        assert!(interp(1.0, &[1.0, 2.0], &[1.0]).is_none());
    }
}
