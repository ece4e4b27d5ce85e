//! Error types for drisk-assemble.

use std::path::PathBuf;

use drisk_hazard::HazardError;

/// Error type for all fallible operations in the drisk-assemble crate.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Returned when an injected loader fails on a file.
    #[error("failed to load {}: {source}", path.display())]
    Source {
        /// File that could not be loaded.
        path: PathBuf,
        /// Underlying loader error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Returned when tiles to be merged have different pixel sizes.
    #[error(
        "pixel size mismatch in {}: expected ({}, {}), got ({}, {})",
        path.display(), expected.0, expected.1, got.0, got.1
    )]
    ResolutionMismatch {
        /// Offending raster.
        path: PathBuf,
        /// Pixel size `(width, height)` of the first raster.
        expected: (f64, f64),
        /// Pixel size of the offending raster.
        got: (f64, f64),
    },

    /// Returned when rasters that must share a grid do not.
    #[error("grid mismatch for return period {rp}: {reason}")]
    GridMismatch {
        /// Return period whose raster differs.
        rp: u32,
        /// Description of the difference.
        reason: String,
    },

    /// Returned when an operation receives no inputs at all.
    #[error("no inputs given to {operation}")]
    NoInputs {
        /// Name of the operation.
        operation: &'static str,
    },

    /// Wraps an error from the hazard data model.
    #[error(transparent)]
    Hazard(#[from] HazardError),
}

impl AssembleError {
    pub(crate) fn load_failed(path: &std::path::Path, e: impl std::error::Error + Send + Sync + 'static) -> Self {
        AssembleError::Source {
            path: path.to_path_buf(),
            source: Box::new(e),
        }
    }
}
