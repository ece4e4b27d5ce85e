//! Error types for drisk-io.

use std::path::PathBuf;

use drisk_hazard::HazardError;
use drisk_impact::ImpactError;

/// Error type for all fallible operations in the drisk-io crate.
///
/// This enum covers missing files, format-specific errors from NetCDF,
/// GeoTIFF, CSV and Parquet, and data-model violations found while
/// reading or writing hazard and impact data.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
        reason: String,
    },

    /// Wraps an error from the TIFF decoder or encoder.
    #[error("tiff error in {}: {reason}", path.display())]
    Tiff {
        /// File being read or written.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Wraps a CSV parsing or writing error.
    #[error("csv error in {}: {reason}", path.display())]
    Csv {
        /// File being read or written.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Wraps a plain filesystem error.
    #[error("i/o error on {}: {reason}", path.display())]
    File {
        /// File or directory involved.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable or attribute is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a raster lacks georeferencing.
    #[error("no georeferencing in {}: {reason}", path.display())]
    MissingGeoreference {
        /// Raster file.
        path: PathBuf,
        /// What was missing.
        reason: String,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Wraps a hazard data-model violation.
    #[error(transparent)]
    Hazard(#[from] HazardError),

    /// Wraps an exposure or impact-function violation.
    #[error(transparent)]
    Impact(#[from] ImpactError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl IoError {
    pub(crate) fn csv(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        IoError::Csv {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }

    pub(crate) fn tiff(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        IoError::Tiff {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }

    pub(crate) fn file(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        IoError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}
