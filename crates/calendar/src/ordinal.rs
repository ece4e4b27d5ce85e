//! Ordinal day number conversions.
//!
//! Event dates are stored as proleptic Gregorian ordinals where day 1 is
//! 0001-01-01. Only the calendar year is ever derived from them.

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// Returns the calendar year of an ordinal day number.
///
/// # Errors
///
/// Returns [`CalendarError::OrdinalOutOfRange`] if the ordinal is below 1
/// or beyond the range chrono can represent.
pub fn year_of(ordinal: i64) -> Result<i32, CalendarError> {
    let days = i32::try_from(ordinal)
        .ok()
        .filter(|&d| d >= 1)
        .ok_or(CalendarError::OrdinalOutOfRange { ordinal })?;
    NaiveDate::from_num_days_from_ce_opt(days)
        .map(|d| d.year())
        .ok_or(CalendarError::OrdinalOutOfRange { ordinal })
}

/// Converts every ordinal in `ordinals` to its calendar year.
///
/// # Errors
///
/// Fails on the first ordinal that cannot be converted.
pub fn years_of(ordinals: &[i64]) -> Result<Vec<i32>, CalendarError> {
    ordinals.iter().map(|&o| year_of(o)).collect()
}

/// Returns the ordinal day number of a Gregorian date.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if the triple is not a valid date.
pub fn ordinal_from_ymd(year: i32, month: u32, day: u32) -> Result<i64, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| i64::from(d.num_days_from_ce()))
        .ok_or(CalendarError::InvalidDate { year, month, day })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_one_is_year_one() {
        assert_eq!(year_of(1).unwrap(), 1);
        assert_eq!(ordinal_from_ymd(1, 1, 1).unwrap(), 1);
    }

    #[test]
    fn known_ordinal() {
        // 2000-01-01 is day 730120 of the proleptic Gregorian calendar.
        assert_eq!(ordinal_from_ymd(2000, 1, 1).unwrap(), 730_120);
        assert_eq!(year_of(730_120).unwrap(), 2000);
        assert_eq!(year_of(730_119).unwrap(), 1999);
    }

    #[test]
    fn zero_and_negative_rejected() {
        assert_eq!(
            year_of(0).unwrap_err(),
            CalendarError::OrdinalOutOfRange { ordinal: 0 }
        );
        assert!(year_of(-10).is_err());
    }

    #[test]
    fn huge_ordinal_rejected() {
        assert!(year_of(i64::MAX).is_err());
    }

    #[test]
    fn invalid_ymd() {
        assert_eq!(
            ordinal_from_ymd(2001, 2, 29).unwrap_err(),
            CalendarError::InvalidDate {
                year: 2001,
                month: 2,
                day: 29
            }
        );
    }

    #[test]
    fn years_of_propagates_error() {
        assert!(years_of(&[730_120, 0]).is_err());
        assert_eq!(years_of(&[730_120, 730_119]).unwrap(), vec![2000, 1999]);
    }
}
