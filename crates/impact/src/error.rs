//! Error types for drisk-impact.

use drisk_hazard::HazardError;

/// Error type for all fallible operations in the drisk-impact crate.
#[derive(Debug, thiserror::Error)]
pub enum ImpactError {
    /// Returned when sizes of matrices, tables or return-period lists disagree.
    #[error("{what} mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// What was being compared.
        what: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when building types have no entry in a vulnerability mapping.
    #[error("building types missing from '{source_name}' mapping: {}", types.join(", "))]
    UnmappedBuildingTypes {
        /// Name of the vulnerability source.
        source_name: String,
        /// Building types without an impact function.
        types: Vec<String>,
    },

    /// Returned when an exposure point references an unknown impact function.
    #[error("impact function {id} not defined")]
    UnknownImpactFunction {
        /// The missing impact function id.
        id: u32,
    },

    /// Returned when an impact function curve is malformed.
    #[error("invalid impact function {id}: {reason}")]
    InvalidImpactFunction {
        /// Id of the offending function.
        id: u32,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an exposure point has no impact function assigned.
    #[error("exposure point {index} has no impact function assigned")]
    Unassigned {
        /// Index of the point.
        index: usize,
    },

    /// Returned when an impact table lacks a required column.
    #[error("column '{name}' not found in impact table")]
    MissingColumn {
        /// The missing column.
        name: String,
    },

    /// Returned when a row label is added twice to an impact table.
    #[error("row '{label}' already present in impact table")]
    DuplicateRow {
        /// The repeated label.
        label: String,
    },

    /// Returned when joined tables share a column name.
    #[error("column '{name}' present in more than one joined table")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },

    /// Returned when an exposure point has invalid attributes.
    #[error("{count} invalid exposure point(s): {details}")]
    InvalidExposure {
        /// Number of invalid points.
        count: usize,
        /// Summary of the problems.
        details: String,
    },

    /// Returned when the worker pool cannot be created.
    #[error("failed to build worker pool: {reason}")]
    Pool {
        /// Description of the failure.
        reason: String,
    },

    /// Wraps an error from the hazard data model.
    #[error(transparent)]
    Hazard(#[from] HazardError),
}

impl From<rayon::ThreadPoolBuildError> for ImpactError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        ImpactError::Pool {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shape_mismatch() {
        let err = ImpactError::ShapeMismatch {
            what: "impact matrix rows (multiple of 7)".to_string(),
            expected: 14,
            got: 13,
        };
        assert_eq!(
            err.to_string(),
            "impact matrix rows (multiple of 7) mismatch: expected 14, got 13"
        );
    }

    #[test]
    fn display_unmapped() {
        let err = ImpactError::UnmappedBuildingTypes {
            source_name: "cima".to_string(),
            types: vec!["W1".to_string(), "UFB".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "building types missing from 'cima' mapping: W1, UFB"
        );
    }

    #[test]
    fn display_missing_column() {
        let err = ImpactError::MissingColumn {
            name: "imp_rp_10_cima_low".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column 'imp_rp_10_cima_low' not found in impact table"
        );
    }

    #[test]
    fn from_hazard_error() {
        let err: ImpactError = HazardError::Empty { operation: "vstack" }.into();
        assert!(matches!(err, ImpactError::Hazard(_)));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ImpactError>();
    }
}
