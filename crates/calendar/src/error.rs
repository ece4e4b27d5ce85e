//! Error types for the drisk-calendar crate.

/// Error type for all fallible operations in the drisk-calendar crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when an ordinal day number does not map to a representable date.
    #[error("ordinal day {ordinal} is outside the supported date range")]
    OrdinalOutOfRange {
        /// The ordinal that could not be converted.
        ordinal: i64,
    },

    /// Returned when a (year, month, day) triple is not a valid Gregorian date.
    #[error("invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Calendar year.
        year: i32,
        /// Month number as given.
        month: u32,
        /// Day number as given.
        day: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_ordinal_out_of_range() {
        let err = CalendarError::OrdinalOutOfRange { ordinal: -4 };
        assert_eq!(
            err.to_string(),
            "ordinal day -4 is outside the supported date range"
        );
    }

    #[test]
    fn error_invalid_date() {
        let err = CalendarError::InvalidDate {
            year: 2001,
            month: 2,
            day: 29,
        };
        assert_eq!(err.to_string(), "invalid date: 2001-02-29");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<CalendarError>();
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<CalendarError>();
    }
}
