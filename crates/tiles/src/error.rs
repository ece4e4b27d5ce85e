//! Error types for drisk-tiles.

use std::path::PathBuf;

/// Error type for all fallible operations in the drisk-tiles crate.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    /// Returned when the directory to index does not exist.
    #[error("directory not found: {}", path.display())]
    DirNotFound {
        /// Directory that could not be found.
        path: PathBuf,
    },

    /// Returned when a directory or file name breaks the naming convention.
    #[error("malformed name {}: {reason}", path.display())]
    MalformedName {
        /// Offending path.
        path: PathBuf,
        /// Which part of the convention was violated.
        reason: String,
    },

    /// Returned when two chunk files carry the same numeric suffix.
    #[error("chunk index {index} appears twice: {} and {}", first.display(), second.display())]
    DuplicateChunk {
        /// The repeated suffix.
        index: u64,
        /// First file seen with this suffix.
        first: PathBuf,
        /// Second file seen with this suffix.
        second: PathBuf,
    },

    /// Wraps a directory traversal failure.
    #[error("failed to walk directory: {reason}")]
    Walk {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl From<walkdir::Error> for TileError {
    fn from(e: walkdir::Error) -> Self {
        TileError::Walk {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed_name() {
        let err = TileError::MalformedName {
            path: PathBuf::from("/tiles/N05E120/RCP45/RP10.tif"),
            reason: "expected '{scenario}_{year}'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed name /tiles/N05E120/RCP45/RP10.tif: expected '{scenario}_{year}'"
        );
    }

    #[test]
    fn display_duplicate_chunk() {
        let err = TileError::DuplicateChunk {
            index: 3,
            first: PathBuf::from("a_3.nc"),
            second: PathBuf::from("a_03.nc"),
        };
        assert_eq!(err.to_string(), "chunk index 3 appears twice: a_3.nc and a_03.nc");
    }

    #[test]
    fn display_dir_not_found() {
        let err = TileError::DirNotFound {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.to_string(), "directory not found: /nope");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<TileError>();
    }
}
