//! Concatenation of batch-produced hazard chunks.

use std::path::PathBuf;

use drisk_hazard::{HazardSet, HazardSource};
use tracing::{debug, info};

use crate::error::AssembleError;

/// Loads chunk hazard sets in the given order and appends their events.
///
/// `paths` must already be sorted by chunk number (see
/// `drisk_tiles::list_chunks`): event order decides which simulation year
/// a block of events is attributed to during frequency correction. All
/// chunks must share identical centroids. Event ids are renumbered `1..=n`.
///
/// # Errors
///
/// Returns [`AssembleError::NoInputs`] for an empty list,
/// [`AssembleError::Source`] if a chunk cannot be read, or
/// [`AssembleError::Hazard`] wrapping a centroid mismatch.
#[tracing::instrument(skip_all, fields(chunks = paths.len()))]
pub fn concat_chunks<S: HazardSource>(
    paths: &[PathBuf],
    source: &S,
) -> Result<HazardSet, AssembleError> {
    if paths.is_empty() {
        return Err(AssembleError::NoInputs {
            operation: "concat_chunks",
        });
    }
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let hazard = source
            .read_hazard(path)
            .map_err(|e| AssembleError::load_failed(path, e))?;
        debug!(path = %path.display(), events = hazard.n_events(), "loaded chunk");
        parts.push(hazard);
    }
    let joined = HazardSet::append_events(&parts)?;
    info!(
        events = joined.n_events(),
        centroids = joined.n_centroids(),
        "concatenated chunks"
    );
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHazards;
    use drisk_hazard::{Centroids, CsrBuilder, EventTable, HazardError};

    fn chunk(lons: &[f64], dates: Vec<i64>) -> HazardSet {
        let centroids = Centroids::from_grid(lons, &[0.0]);
        let mut b = CsrBuilder::new(centroids.len());
        for d in &dates {
            b.push_dense_row(std::iter::repeat_n(*d as f64, centroids.len()));
        }
        let mut events = EventTable::numbered(vec![1.0; dates.len()]);
        events.date = dates;
        HazardSet::new("TC", "m/s", centroids, events, b.finish()).unwrap()
    }

    #[test]
    fn order_of_paths_is_kept() {
        let mut src = MemoryHazards::default();
        src.insert("c_1.nc".as_ref(), chunk(&[0.0, 1.0], vec![10, 11]));
        src.insert("c_2.nc".as_ref(), chunk(&[0.0, 1.0], vec![20]));
        let paths = vec![PathBuf::from("c_2.nc"), PathBuf::from("c_1.nc")];
        let h = concat_chunks(&paths, &src).unwrap();
        assert_eq!(h.date(), &[20, 10, 11]);
        assert_eq!(h.event_id(), &[1, 2, 3]);
    }

    #[test]
    fn centroid_mismatch_is_fatal() {
        let mut src = MemoryHazards::default();
        src.insert("c_1.nc".as_ref(), chunk(&[0.0, 1.0], vec![1]));
        src.insert("c_2.nc".as_ref(), chunk(&[0.0], vec![1]));
        let paths = vec![PathBuf::from("c_1.nc"), PathBuf::from("c_2.nc")];
        assert!(matches!(
            concat_chunks(&paths, &src),
            Err(AssembleError::Hazard(HazardError::CentroidMismatch { index: 1, .. }))
        ));
    }

    #[test]
    fn empty_and_missing() {
        let src = MemoryHazards::default();
        assert!(matches!(
            concat_chunks(&[], &src),
            Err(AssembleError::NoInputs { .. })
        ));
        assert!(matches!(
            concat_chunks(&[PathBuf::from("nope.nc")], &src),
            Err(AssembleError::Source { .. })
        ));
    }
}
