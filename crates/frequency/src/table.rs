//! Calibration table: simulation year to calibrated annual event rate.

use std::collections::BTreeMap;

use crate::error::FrequencyError;

/// Calibrated annual event rate per simulation year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibrationTable {
    rates: BTreeMap<i32, f64>,
}

impl CalibrationTable {
    /// Builds a table from `(year, rate)` pairs. Later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns [`FrequencyError::InvalidRate`] for negative or non-finite rates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Result<Self, FrequencyError> {
        let mut rates = BTreeMap::new();
        for (year, value) in pairs {
            if !value.is_finite() || value < 0.0 {
                return Err(FrequencyError::InvalidRate { year, value });
            }
            rates.insert(year, value);
        }
        Ok(Self { rates })
    }

    /// Aligns a per-year array with the sorted distinct years of an event set.
    ///
    /// Entry `i` of `values` is the rate of the `i`-th smallest year in
    /// `years`. Surplus entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FrequencyError::TableTooShort`] if `values` has fewer
    /// entries than there are distinct years, or
    /// [`FrequencyError::InvalidRate`] for a bad rate.
    pub fn from_positional(values: &[f64], years: &[i32]) -> Result<Self, FrequencyError> {
        let unique = drisk_calendar::unique_years(years);
        if values.len() < unique.len() {
            return Err(FrequencyError::TableTooShort {
                needed: unique.len(),
                got: values.len(),
            });
        }
        Self::from_pairs(unique.into_iter().zip(values.iter().copied()))
    }

    /// Rate for `year`, if present.
    pub fn rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Years covered by the table, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rates.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_alignment() {
        let t = CalibrationTable::from_positional(&[0.5, 1.5, 9.0], &[2003, 2001, 2003]).unwrap();
        assert_eq!(t.rate(2001), Some(0.5));
        assert_eq!(t.rate(2003), Some(1.5));
        assert_eq!(t.rate(2002), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn positional_too_short() {
        let err = CalibrationTable::from_positional(&[0.5], &[2001, 2002]).unwrap_err();
        assert!(matches!(
            err,
            FrequencyError::TableTooShort { needed: 2, got: 1 }
        ));
    }

    #[test]
    fn rejects_negative_rate() {
        assert!(matches!(
            CalibrationTable::from_pairs([(2000, -1.0)]),
            Err(FrequencyError::InvalidRate { year: 2000, .. })
        ));
        assert!(CalibrationTable::from_pairs([(2000, f64::NAN)]).is_err());
    }
}
