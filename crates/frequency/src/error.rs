//! Error types for drisk-frequency.

use drisk_calendar::CalendarError;
use drisk_hazard::HazardError;

/// Error type for all fallible operations in the drisk-frequency crate.
#[derive(Debug, thiserror::Error)]
pub enum FrequencyError {
    /// Returned when a positional calibration array has fewer entries than
    /// the event set has distinct years.
    #[error("calibration table has {got} entries but the events span {needed} distinct years")]
    TableTooShort {
        /// Number of distinct simulation years in the event set.
        needed: usize,
        /// Number of calibration entries supplied.
        got: usize,
    },

    /// Returned when a calibration rate is negative or not finite.
    #[error("invalid calibration rate {value} for year {year}")]
    InvalidRate {
        /// Year the rate belongs to.
        year: i32,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a fixed simulation-year span of zero is requested.
    #[error("total simulation years must be positive")]
    ZeroYearSpan,

    /// Returned when the event set holds no events.
    #[error("hazard set has no events to correct")]
    NoEvents,

    /// Wraps an error from ordinal date handling.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Wraps an error from the hazard data model, including a failed check.
    #[error(transparent)]
    Hazard(#[from] HazardError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_table_too_short() {
        let err = FrequencyError::TableTooShort { needed: 20, got: 18 };
        assert_eq!(
            err.to_string(),
            "calibration table has 18 entries but the events span 20 distinct years"
        );
    }

    #[test]
    fn display_invalid_rate() {
        let err = FrequencyError::InvalidRate {
            year: 1990,
            value: -0.5,
        };
        assert_eq!(err.to_string(), "invalid calibration rate -0.5 for year 1990");
    }

    #[test]
    fn from_calendar() {
        let err: FrequencyError = CalendarError::OrdinalOutOfRange { ordinal: 0 }.into();
        assert!(matches!(err, FrequencyError::Calendar(_)));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<FrequencyError>();
    }
}
