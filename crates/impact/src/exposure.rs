//! Exposure points.

use std::collections::{BTreeMap, BTreeSet};

use drisk_hazard::Extent;
use tracing::debug;

use crate::error::ImpactError;

/// One exposure record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposurePoint {
    pub lon: f64,
    pub lat: f64,
    /// Population or building count.
    pub value: f64,
    /// First-level administrative unit.
    pub admin1: String,
    /// Building class used to look up an impact function.
    pub building_type: String,
    /// Assigned impact function, if any.
    pub impf_id: Option<u32>,
}

/// Ordered collection of exposure points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Exposures {
    points: Vec<ExposurePoint>,
}

impl Exposures {
    /// Creates a collection after checking coordinates and values.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidExposure`] if any point has
    /// non-finite coordinates or a negative or non-finite value.
    pub fn new(points: Vec<ExposurePoint>) -> Result<Self, ImpactError> {
        let bad: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                !p.lon.is_finite() || !p.lat.is_finite() || !p.value.is_finite() || p.value < 0.0
            })
            .map(|(i, _)| i)
            .collect();
        if let Some(first) = bad.first() {
            return Err(ImpactError::InvalidExposure {
                count: bad.len(),
                details: format!("non-finite coordinate or invalid value (first at point {first})"),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ExposurePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exposure values in point order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn total_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Sorted distinct admin1 identifiers.
    pub fn admin1_units(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.admin1.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Indices of the points in `admin1`, ascending.
    pub fn admin1_indices(&self, admin1: &str) -> Vec<usize> {
        (0..self.points.len())
            .filter(|&i| self.points[i].admin1 == admin1)
            .collect()
    }

    /// Points belonging to `admin1`, in original order.
    pub fn subset_admin1(&self, admin1: &str) -> Exposures {
        Exposures {
            points: self
                .points
                .iter()
                .filter(|p| p.admin1 == admin1)
                .cloned()
                .collect(),
        }
    }

    /// Points with value strictly above `min_value`.
    pub fn filter_min_value(&self, min_value: f64) -> Exposures {
        Exposures {
            points: self
                .points
                .iter()
                .filter(|p| p.value > min_value)
                .cloned()
                .collect(),
        }
    }

    /// Copy with every value replaced by `value`.
    pub fn with_uniform_value(&self, value: f64) -> Exposures {
        Exposures {
            points: self
                .points
                .iter()
                .map(|p| ExposurePoint {
                    value,
                    ..p.clone()
                })
                .collect(),
        }
    }

    /// Bounding extent of all points, `None` when empty.
    pub fn extent(&self) -> Option<Extent> {
        let first = self.points.first()?;
        let init = (first.lon, first.lon, first.lat, first.lat);
        let (lon_min, lon_max, lat_min, lat_max) =
            self.points.iter().fold(init, |(a, b, c, d), p| {
                (a.min(p.lon), b.max(p.lon), c.min(p.lat), d.max(p.lat))
            });
        Extent::new(lon_min, lon_max, lat_min, lat_max).ok()
    }

    /// Copy with impact function ids looked up from building types.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::UnmappedBuildingTypes`] listing every
    /// building type that `mapping` does not cover.
    pub fn assign_impact_functions(
        &self,
        mapping: &BTreeMap<String, u32>,
        source_name: &str,
    ) -> Result<Exposures, ImpactError> {
        let missing: BTreeSet<&str> = self
            .points
            .iter()
            .map(|p| p.building_type.as_str())
            .filter(|t| !mapping.contains_key(*t))
            .collect();
        if !missing.is_empty() {
            return Err(ImpactError::UnmappedBuildingTypes {
                source_name: source_name.to_string(),
                types: missing.into_iter().map(str::to_string).collect(),
            });
        }
        debug!(source = source_name, points = self.len(), "assigned impact functions");
        Ok(Exposures {
            points: self
                .points
                .iter()
                .map(|p| ExposurePoint {
                    impf_id: mapping.get(&p.building_type).copied(),
                    ..p.clone()
                })
                .collect(),
        })
    }
}

#[cfg(test)]
pub(crate) fn point(lon: f64, lat: f64, value: f64, admin1: &str) -> ExposurePoint {
    ExposurePoint {
        lon,
        lat,
        value,
        admin1: admin1.to_string(),
        building_type: "W1".to_string(),
        impf_id: Some(1),
    }
}
