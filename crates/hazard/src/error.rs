//! Error types for drisk-hazard.

/// Error type for all fallible operations in the drisk-hazard crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HazardError {
    /// Returned when one or more structural checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures, joined with `"; "`.
        details: String,
    },

    /// Returned when two array-like inputs disagree in size.
    #[error("{what} mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// What was being compared (e.g. `"matrix columns"`).
        what: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when CSR component arrays are inconsistent.
    #[error("invalid sparse matrix: {reason}")]
    InvalidSparse {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Returned when hazard sets that must share centroids do not.
    #[error("centroid mismatch in hazard set {index}: {reason}")]
    CentroidMismatch {
        /// Position of the offending set in the input sequence.
        index: usize,
        /// Description of the difference.
        reason: String,
    },

    /// Returned when combining hazard sets of different hazard types.
    #[error("hazard type mismatch: expected '{expected}', got '{got}'")]
    HazardTypeMismatch {
        /// Hazard type of the first set.
        expected: String,
        /// Hazard type of the offending set.
        got: String,
    },

    /// Returned when a raster transform or grid is not regular and axis-aligned.
    #[error("irregular grid: {reason}")]
    IrregularGrid {
        /// Description of the irregularity.
        reason: String,
    },

    /// Returned when an extent has min greater than max.
    #[error("invalid extent: {reason}")]
    InvalidExtent {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an operation needs at least one input.
    #[error("no input given to {operation}")]
    Empty {
        /// Name of the operation.
        operation: &'static str,
    },
}
