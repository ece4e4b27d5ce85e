//! Accumulated validation.

use crate::error::HazardError;

/// Accumulates validation errors and converts them into a single
/// [`HazardError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Record a length mismatch if `got != expected`.
    pub(crate) fn check_len(&mut self, name: &str, expected: usize, got: usize) {
        if expected != got {
            self.push(format!("{name} has length {got}, expected {expected}"));
        }
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), HazardError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(HazardError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_is_ok() {
        assert!(ValidationCollector::new().finish().is_ok());
    }

    #[test]
    fn joins_messages() {
        let mut c = ValidationCollector::new();
        c.check_len("date", 3, 3);
        c.check_len("frequency", 3, 2);
        c.push("boom");
        match c.finish() {
            Err(HazardError::Validation { count, details }) => {
                assert_eq!(count, 2);
                assert_eq!(details, "frequency has length 2, expected 3; boom");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
