//! Local exceedance intensities (return-period maps).

use ndarray::Array2;
use tracing::debug;

use crate::centroids::Centroids;
use crate::error::HazardError;
use crate::hazard::HazardSet;

/// Intensity exceeded at each centroid once per return period, stored as a
/// dense `return periods x centroids` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceedanceMaps {
    haz_type: String,
    units: String,
    return_periods: Vec<u32>,
    centroids: Centroids,
    intensity: Array2<f64>,
}

impl ExceedanceMaps {
    /// # Errors
    ///
    /// Returns [`HazardError::ShapeMismatch`] if `intensity` is not
    /// `return_periods.len() x centroids.len()`.
    pub fn new(
        haz_type: impl Into<String>,
        units: impl Into<String>,
        return_periods: Vec<u32>,
        centroids: Centroids,
        intensity: Array2<f64>,
    ) -> Result<Self, HazardError> {
        let (rows, cols) = intensity.dim();
        if rows != return_periods.len() {
            return Err(HazardError::ShapeMismatch {
                what: "exceedance map rows".to_string(),
                expected: return_periods.len(),
                got: rows,
            });
        }
        if cols != centroids.len() {
            return Err(HazardError::ShapeMismatch {
                what: "exceedance map columns".to_string(),
                expected: centroids.len(),
                got: cols,
            });
        }
        Ok(Self {
            haz_type: haz_type.into(),
            units: units.into(),
            return_periods,
            centroids,
            intensity,
        })
    }

    pub fn haz_type(&self) -> &str {
        &self.haz_type
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn return_periods(&self) -> &[u32] {
        &self.return_periods
    }

    pub fn centroids(&self) -> &Centroids {
        &self.centroids
    }

    pub fn intensity(&self) -> &Array2<f64> {
        &self.intensity
    }
}

impl HazardSet {
    /// Intensity exceeded on average once every `rp` years, per centroid.
    ///
    /// At each centroid the events are ranked by intensity, highest first,
    /// and their frequencies accumulated into an exceedance frequency. The
    /// curve `1 / cumulative frequency -> intensity` is interpolated
    /// linearly at each return period and clamped at both ends. Events
    /// that miss a centroid close the curve at intensity 0; a centroid no
    /// event reaches maps to 0 everywhere. Zero-frequency events are ignored.
    pub fn local_exceedance_intensity(&self, rps: &[u32]) -> ExceedanceMaps {
        let freq = self.frequency();
        let n_active = freq.iter().filter(|&&f| f > 0.0).count();

        let mut per_centroid: Vec<Vec<(f64, f64)>> = vec![Vec::new(); self.n_centroids()];
        for (event, centroid, value) in self.intensity().triplets() {
            if value != 0.0 && freq[event] > 0.0 {
                per_centroid[centroid].push((value, freq[event]));
            }
        }

        let mut maps = Array2::zeros((rps.len(), self.n_centroids()));
        for (c, mut hits) in per_centroid.into_iter().enumerate() {
            if hits.is_empty() {
                continue;
            }
            let touched = hits.len();
            hits.sort_by(|a, b| b.0.total_cmp(&a.0));
            let mut cum = 0.0;
            let mut curve: Vec<(f64, f64)> = hits
                .into_iter()
                .map(|(value, f)| {
                    cum += f;
                    (value, cum)
                })
                .collect();
            if touched < n_active {
                let total: f64 = freq.iter().filter(|&&f| f > 0.0).sum();
                curve.push((0.0, total));
            }

            // ascending return period
            let curve_rp: Vec<f64> = curve.iter().rev().map(|&(_, cf)| 1.0 / cf).collect();
            let curve_int: Vec<f64> = curve.iter().rev().map(|&(v, _)| v).collect();
            for (r, &rp) in rps.iter().enumerate() {
                maps[[r, c]] = drisk_stats::interp(f64::from(rp), &curve_rp, &curve_int).unwrap_or(0.0);
            }
        }
        debug!(
            centroids = self.n_centroids(),
            return_periods = rps.len(),
            "local exceedance intensities computed"
        );

        ExceedanceMaps {
            haz_type: self.haz_type().to_string(),
            units: self.units().to_string(),
            return_periods: rps.to_vec(),
            centroids: self.centroids().clone(),
            intensity: maps,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::hazard::EventTable;
    use crate::sparse::CsrBuilder;

    /// Three centroids, four events. The third centroid is never hit.
    fn sample() -> HazardSet {
        let centroids = Centroids::from_grid(&[0.0, 1.0, 2.0], &[0.0]);
        let mut b = CsrBuilder::new(3);
        b.push_dense_row([40.0, 10.0, 0.0]);
        b.push_dense_row([30.0, 0.0, 0.0]);
        b.push_dense_row([20.0, 0.0, 0.0]);
        b.push_dense_row([10.0, 50.0, 0.0]);
        let freq = vec![0.01, 0.01, 0.03, 0.05];
        HazardSet::new("TC", "m/s", centroids, EventTable::numbered(freq), b.finish()).unwrap()
    }

    #[test]
    fn fully_covered_centroid() {
        // cumulative: 40 -> 0.01 (rp 100), 30 -> 0.02 (50), 20 -> 0.05 (20), 10 -> 0.1 (10)
        let maps = sample().local_exceedance_intensity(&[10, 20, 35, 50, 100, 250, 1]);
        let col = maps.intensity().column(0);
        assert_relative_eq!(col[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(col[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(col[2], 25.0, epsilon = 1e-9);
        assert_relative_eq!(col[3], 30.0, epsilon = 1e-9);
        assert_relative_eq!(col[4], 40.0, epsilon = 1e-9);
        // clamped at both ends
        assert_relative_eq!(col[5], 40.0, epsilon = 1e-9);
        assert_relative_eq!(col[6], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn partially_covered_centroid_falls_to_zero() {
        // 50 -> 0.05 (rp 20), 10 -> 0.06 (16.67), missed events -> 0 at 0.1 (rp 10)
        let maps = sample().local_exceedance_intensity(&[1, 10, 20, 100]);
        let col = maps.intensity().column(1);
        assert_relative_eq!(col[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(col[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(col[2], 50.0, epsilon = 1e-9);
        assert_relative_eq!(col[3], 50.0, epsilon = 1e-9);
    }

    #[test]
    fn untouched_centroid_is_zero() {
        let maps = sample().local_exceedance_intensity(&[10, 100]);
        assert!(maps.intensity().column(2).iter().all(|&v| v == 0.0));
        assert_eq!(maps.return_periods(), &[10, 100]);
        assert_eq!(maps.intensity().dim(), (2, 3));
    }

    #[test]
    fn zero_frequency_events_are_ignored() {
        let centroids = Centroids::from_grid(&[0.0], &[0.0]);
        let mut b = CsrBuilder::new(1);
        b.push_dense_row([99.0]);
        b.push_dense_row([5.0]);
        let h = HazardSet::new("TC", "m/s", centroids, EventTable::numbered(vec![0.0, 0.1]), b.finish())
            .unwrap();
        let maps = h.local_exceedance_intensity(&[100]);
        assert_relative_eq!(maps.intensity()[[0, 0]], 5.0);
    }

    #[test]
    fn shape_is_checked() {
        let centroids = Centroids::from_grid(&[0.0, 1.0], &[0.0]);
        let err = ExceedanceMaps::new("TC", "m/s", vec![10], centroids, Array2::zeros((1, 3)))
            .unwrap_err();
        assert!(matches!(err, HazardError::ShapeMismatch { expected: 2, got: 3, .. }));
    }
}
