//! Year ranges and per-year event counts.

use std::collections::BTreeMap;

/// Inclusive range of calendar years spanned by an event set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    first: i32,
    last: i32,
}

impl YearRange {
    /// Builds the range covering every year in `years`.
    ///
    /// Returns `None` if `years` is empty.
    pub fn from_years(years: &[i32]) -> Option<Self> {
        let first = *years.iter().min()?;
        let last = *years.iter().max()?;
        Some(Self { first, last })
    }

    /// First year of the range.
    pub fn first(self) -> i32 {
        self.first
    }

    /// Last year of the range (inclusive).
    pub fn last(self) -> i32 {
        self.last
    }

    /// Number of years in the range, `last - first + 1`.
    pub fn span(self) -> u32 {
        (i64::from(self.last) - i64::from(self.first) + 1) as u32
    }

    /// Whether `year` lies within the range.
    pub fn contains(self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }
}

/// Counts events per calendar year, keyed in ascending year order.
pub fn events_per_year(years: &[i32]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for &y in years {
        *counts.entry(y).or_insert(0) += 1;
    }
    counts
}

/// Sorted unique years present in `years`.
pub fn unique_years(years: &[i32]) -> Vec<i32> {
    events_per_year(years).into_keys().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_span() {
        let r = YearRange::from_years(&[1985, 1980, 1999]).unwrap();
        assert_eq!(r.first(), 1980);
        assert_eq!(r.last(), 1999);
        assert_eq!(r.span(), 20);
        assert!(r.contains(1990));
        assert!(!r.contains(2000));
    }

    #[test]
    fn range_single_year() {
        let r = YearRange::from_years(&[2000]).unwrap();
        assert_eq!(r.span(), 1);
    }

    #[test]
    fn range_empty() {
        assert!(YearRange::from_years(&[]).is_none());
    }

    #[test]
    fn counts_sorted() {
        let counts = events_per_year(&[2001, 2000, 2001, 2003]);
        let pairs: Vec<_> = counts.into_iter().collect();
        assert_eq!(pairs, vec![(2000, 1), (2001, 2), (2003, 1)]);
    }

    #[test]
    fn unique_sorted() {
        assert_eq!(unique_years(&[5, 3, 5, 1]), vec![1, 3, 5]);
    }
}
