//! Hazard event sets.

use std::collections::HashSet;

use tracing::debug;

use crate::centroids::{Centroids, Extent};
use crate::error::HazardError;
use crate::sparse::CsrMatrix;
use crate::validate::ValidationCollector;

/// Per-event attributes of a hazard set, index-aligned with intensity rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventTable {
    /// Event identifiers; unique within a set.
    pub id: Vec<i64>,
    /// Event names.
    pub name: Vec<String>,
    /// Occurrence dates as proleptic Gregorian ordinals.
    pub date: Vec<i64>,
    /// Expected occurrences per year.
    pub frequency: Vec<f64>,
}

impl EventTable {
    /// Events `1..=n` with the given frequencies, names `"1".."n"` and date 1.
    pub fn numbered(frequency: Vec<f64>) -> Self {
        let n = frequency.len();
        Self {
            id: (1..=n as i64).collect(),
            name: (1..=n).map(|i| i.to_string()).collect(),
            date: vec![1; n],
            frequency,
        }
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    fn extend(&mut self, other: &EventTable) {
        self.id.extend_from_slice(&other.id);
        self.name.extend_from_slice(&other.name);
        self.date.extend_from_slice(&other.date);
        self.frequency.extend_from_slice(&other.frequency);
    }
}

/// A set of hazard events over a shared, ordered set of centroids.
///
/// Intensity is stored as a sparse events x centroids matrix. Every
/// constructor and combinator runs [`HazardSet::check`] before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardSet {
    haz_type: String,
    units: String,
    centroids: Centroids,
    events: EventTable,
    intensity: CsrMatrix,
}

impl HazardSet {
    /// Creates a hazard set and runs the structural check.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::Validation`] if the check fails.
    pub fn new(
        haz_type: impl Into<String>,
        units: impl Into<String>,
        centroids: Centroids,
        events: EventTable,
        intensity: CsrMatrix,
    ) -> Result<Self, HazardError> {
        let set = Self {
            haz_type: haz_type.into(),
            units: units.into(),
            centroids,
            events,
            intensity,
        };
        set.check()?;
        Ok(set)
    }

    pub fn haz_type(&self) -> &str {
        &self.haz_type
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn centroids(&self) -> &Centroids {
        &self.centroids
    }

    pub fn intensity(&self) -> &CsrMatrix {
        &self.intensity
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn event_id(&self) -> &[i64] {
        &self.events.id
    }

    pub fn event_name(&self) -> &[String] {
        &self.events.name
    }

    pub fn date(&self) -> &[i64] {
        &self.events.date
    }

    pub fn frequency(&self) -> &[f64] {
        &self.events.frequency
    }

    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    pub fn n_centroids(&self) -> usize {
        self.centroids.len()
    }

    /// Structural self-check.
    ///
    /// Verifies that every per-event array has one entry per event, the
    /// intensity matrix is events x centroids, frequencies are finite and
    /// non-negative, and event ids are unique.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::Validation`] listing every violation.
    pub fn check(&self) -> Result<(), HazardError> {
        let mut c = ValidationCollector::new();
        let n = self.events.id.len();
        c.check_len("event_name", n, self.events.name.len());
        c.check_len("date", n, self.events.date.len());
        c.check_len("frequency", n, self.events.frequency.len());
        c.check_len("intensity rows", n, self.intensity.nrows());
        c.check_len(
            "intensity columns",
            self.centroids.len(),
            self.intensity.ncols(),
        );

        let bad_freq: Vec<usize> = self
            .events
            .frequency
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_finite() || **f < 0.0)
            .map(|(i, _)| i)
            .collect();
        if let Some(&first) = bad_freq.first() {
            c.push(format!(
                "{} negative or non-finite frequencies (first at event {first})",
                bad_freq.len()
            ));
        }

        let mut seen = HashSet::with_capacity(n);
        if let Some(dup) = self.events.id.iter().find(|id| !seen.insert(**id)) {
            c.push(format!("duplicate event id {dup}"));
        }
        c.finish()
    }

    /// Replaces all event frequencies.
    ///
    /// Does not run the full check; callers run [`check`](Self::check)
    /// once they are done adjusting the set.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::ShapeMismatch`] if `frequency` has the wrong length.
    pub fn set_frequencies(&mut self, frequency: Vec<f64>) -> Result<(), HazardError> {
        if frequency.len() != self.n_events() {
            return Err(HazardError::ShapeMismatch {
                what: "frequency".to_string(),
                expected: self.n_events(),
                got: frequency.len(),
            });
        }
        self.events.frequency = frequency;
        Ok(())
    }

    /// Restricts the set to centroids inside `extent`, keeping all events.
    ///
    /// Returns `None` when no centroid lies inside the extent.
    pub fn select_extent(&self, extent: &Extent) -> Option<HazardSet> {
        let idx = self.centroids.indices_within(extent);
        if idx.is_empty() {
            debug!(haz_type = %self.haz_type, "no centroids inside selection extent");
            return None;
        }
        Some(Self {
            haz_type: self.haz_type.clone(),
            units: self.units.clone(),
            centroids: self.centroids.select(&idx),
            events: self.events.clone(),
            intensity: self.intensity.select_columns(&idx),
        })
    }

    /// Concatenates spatially disjoint sets along the event axis.
    ///
    /// Centroids are appended without deduplication and intensities are
    /// composed block-diagonally. Event ids are renumbered `1..=n`.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::Empty`] for no inputs,
    /// [`HazardError::HazardTypeMismatch`] on mixed hazard types, or a
    /// validation error from the final check.
    pub fn concat_disjoint(sets: &[HazardSet]) -> Result<HazardSet, HazardError> {
        let first = sets.first().ok_or(HazardError::Empty { operation: "concat" })?;
        same_hazard_type(first, sets)?;

        let centroids = Centroids::concat(sets.iter().map(|s| &s.centroids));
        let mats: Vec<&CsrMatrix> = sets.iter().map(|s| &s.intensity).collect();
        let intensity = CsrMatrix::block_diag(&mats);
        let mut events = EventTable::default();
        for s in sets {
            events.extend(&s.events);
        }
        renumber(&mut events);

        debug!(
            parts = sets.len(),
            events = events.len(),
            centroids = centroids.len(),
            "concatenated hazard sets"
        );
        HazardSet::new(
            first.haz_type.clone(),
            first.units.clone(),
            centroids,
            events,
            intensity,
        )
    }

    /// Appends the events of sets that share identical centroids.
    ///
    /// Event ids are renumbered `1..=n`; names, dates and frequencies are
    /// kept in input order.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::CentroidMismatch`] if any set's centroids
    /// differ from the first set's by more than `1e-9` degrees.
    pub fn append_events(sets: &[HazardSet]) -> Result<HazardSet, HazardError> {
        let first = sets.first().ok_or(HazardError::Empty { operation: "append" })?;
        same_hazard_type(first, sets)?;
        for (index, s) in sets.iter().enumerate().skip(1) {
            if let Some(reason) = first.centroids.first_difference(&s.centroids, 1e-9) {
                return Err(HazardError::CentroidMismatch { index, reason });
            }
        }

        let mats: Vec<&CsrMatrix> = sets.iter().map(|s| &s.intensity).collect();
        let intensity = CsrMatrix::vstack(&mats)?;
        let mut events = EventTable::default();
        for s in sets {
            events.extend(&s.events);
        }
        renumber(&mut events);

        HazardSet::new(
            first.haz_type.clone(),
            first.units.clone(),
            first.centroids.clone(),
            events,
            intensity,
        )
    }
}

fn same_hazard_type(first: &HazardSet, sets: &[HazardSet]) -> Result<(), HazardError> {
    match sets.iter().find(|s| s.haz_type != first.haz_type) {
        Some(s) => Err(HazardError::HazardTypeMismatch {
            expected: first.haz_type.clone(),
            got: s.haz_type.clone(),
        }),
        None => Ok(()),
    }
}

fn renumber(events: &mut EventTable) {
    events.id = (1..=events.len() as i64).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrBuilder;

    fn uniform(lons: &[f64], lats: &[f64], values: &[f64]) -> HazardSet {
        let centroids = Centroids::from_grid(lons, lats);
        let mut b = CsrBuilder::new(centroids.len());
        for &v in values {
            b.push_dense_row(std::iter::repeat_n(v, centroids.len()));
        }
        let freq = values.iter().map(|_| 0.1).collect();
        HazardSet::new("FL", "m", centroids, EventTable::numbered(freq), b.finish()).unwrap()
    }

    #[test]
    fn check_reports_all_problems() {
        let centroids = Centroids::from_grid(&[0.0], &[0.0]);
        let events = EventTable {
            id: vec![1, 1],
            name: vec!["a".into()],
            date: vec![1, 1],
            frequency: vec![-1.0, 0.5],
        };
        let err = HazardSet::new("TC", "m/s", centroids, events, CsrMatrix::zeros(2, 1))
            .unwrap_err();
        match err {
            HazardError::Validation { count, details } => {
                assert_eq!(count, 3);
                assert!(details.contains("event_name"));
                assert!(details.contains("negative"));
                assert!(details.contains("duplicate event id 1"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn check_rejects_matrix_shape() {
        let centroids = Centroids::from_grid(&[0.0, 1.0], &[0.0]);
        let err = HazardSet::new(
            "TC",
            "m/s",
            centroids,
            EventTable::numbered(vec![1.0]),
            CsrMatrix::zeros(1, 3),
        )
        .unwrap_err();
        assert!(err.to_string().contains("intensity columns"));
    }

    #[test]
    fn set_frequencies_length() {
        let mut h = uniform(&[0.0], &[0.0], &[1.0, 2.0]);
        assert!(h.set_frequencies(vec![0.5]).is_err());
        h.set_frequencies(vec![0.5, 0.25]).unwrap();
        assert_eq!(h.frequency(), &[0.5, 0.25]);
    }

    #[test]
    fn select_extent_keeps_events() {
        let h = uniform(&[0.0, 1.0, 2.0], &[0.0], &[3.0, 4.0]);
        let e = Extent::new(0.5, 2.5, -1.0, 1.0).unwrap();
        let s = h.select_extent(&e).unwrap();
        assert_eq!(s.n_events(), 2);
        assert_eq!(s.n_centroids(), 2);
        assert_eq!(s.intensity().get(1, 0), 4.0);

        let far = Extent::new(50.0, 60.0, 50.0, 60.0).unwrap();
        assert!(h.select_extent(&far).is_none());
    }

    #[test]
    fn concat_is_block_diagonal() {
        let a = uniform(&[0.0, 1.0], &[0.0], &[5.0]);
        let b = uniform(&[10.0], &[0.0], &[7.0, 8.0]);
        let c = HazardSet::concat_disjoint(&[a, b]).unwrap();
        assert_eq!(c.n_events(), 3);
        assert_eq!(c.n_centroids(), 3);
        assert_eq!(c.event_id(), &[1, 2, 3]);
        assert_eq!(c.intensity().get(0, 1), 5.0);
        assert_eq!(c.intensity().get(0, 2), 0.0);
        assert_eq!(c.intensity().get(2, 2), 8.0);
    }

    #[test]
    fn concat_rejects_mixed_types() {
        let a = uniform(&[0.0], &[0.0], &[1.0]);
        let mut b = uniform(&[1.0], &[0.0], &[1.0]);
        b.haz_type = "TC".into();
        assert!(matches!(
            HazardSet::concat_disjoint(&[a, b]),
            Err(HazardError::HazardTypeMismatch { .. })
        ));
    }

    #[test]
    fn append_requires_same_centroids() {
        let a = uniform(&[0.0, 1.0], &[0.0], &[1.0]);
        let b = uniform(&[0.0, 1.0], &[0.0], &[2.0, 3.0]);
        let joined = HazardSet::append_events(&[a.clone(), b]).unwrap();
        assert_eq!(joined.n_events(), 3);
        assert_eq!(joined.n_centroids(), 2);
        assert_eq!(joined.intensity().get(2, 1), 3.0);

        let c = uniform(&[0.0, 2.0], &[0.0], &[1.0]);
        match HazardSet::append_events(&[a, c]) {
            Err(HazardError::CentroidMismatch { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected CentroidMismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_inputs_rejected() {
        assert!(HazardSet::concat_disjoint(&[]).is_err());
        assert!(HazardSet::append_events(&[]).is_err());
    }
}
