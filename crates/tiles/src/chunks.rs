//! Ordering of batch-produced hazard chunk files.
//!
//! Chunks are named `{prefix}_{n}.{ext}`. Their order determines which
//! simulation year each block of events is later attributed to, so they are
//! always sorted by the numeric suffix, never lexically.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::TileError;

/// A chunk file and its numeric suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub index: u64,
    pub path: PathBuf,
}

/// Lists chunk files `{prefix}_{n}.{extension}` in `dir`, ascending by `n`.
///
/// Files that do not start with `{prefix}_` or do not end in `.{extension}`
/// are ignored.
///
/// # Errors
///
/// Returns [`TileError::MalformedName`] when a file has the prefix and
/// extension but a non-integer suffix, and [`TileError::DuplicateChunk`]
/// when two files parse to the same index.
pub fn list_chunks(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<ChunkFile>, TileError> {
    if !dir.is_dir() {
        return Err(TileError::DirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let pattern = Regex::new(&format!(
        r"^{}_(?P<n>.*)\.{}$",
        regex::escape(prefix),
        regex::escape(extension)
    ))
    .map_err(|e| TileError::Walk {
        reason: e.to_string(),
    })?;

    let mut chunks: Vec<ChunkFile> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        let index: u64 = caps["n"].parse().map_err(|_| TileError::MalformedName {
            path: entry.path().to_path_buf(),
            reason: format!("chunk suffix '{}' is not an integer", &caps["n"]),
        })?;
        chunks.push(ChunkFile {
            index,
            path: entry.into_path(),
        });
    }

    chunks.sort_by_key(|c| c.index);
    if let Some(w) = chunks.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(TileError::DuplicateChunk {
            index: w[0].index,
            first: w[0].path.clone(),
            second: w[1].path.clone(),
        });
    }
    debug!(dir = %dir.display(), prefix, count = chunks.len(), "listed chunk files");
    Ok(chunks)
}
