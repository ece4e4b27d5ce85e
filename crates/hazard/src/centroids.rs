//! Centroids and geographic extents.

use crate::error::HazardError;

// ---------------------------------------------------------------------------
// Extent
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box in degrees, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

impl Extent {
    /// Creates an extent from `(lon_min, lon_max, lat_min, lat_max)`.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::InvalidExtent`] if a bound is not finite or
    /// a minimum exceeds its maximum.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Result<Self, HazardError> {
        if ![lon_min, lon_max, lat_min, lat_max].iter().all(|v| v.is_finite()) {
            return Err(HazardError::InvalidExtent {
                reason: "bounds must be finite".to_string(),
            });
        }
        if lon_min > lon_max || lat_min > lat_max {
            return Err(HazardError::InvalidExtent {
                reason: format!(
                    "lon [{lon_min}, {lon_max}] lat [{lat_min}, {lat_max}] has min > max"
                ),
            });
        }
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Whether the point lies inside the extent (bounds inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Whether two extents share any area or boundary.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.lon_min <= other.lon_max
            && other.lon_min <= self.lon_max
            && self.lat_min <= other.lat_max
            && other.lat_min <= self.lat_max
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
        }
    }
}

// ---------------------------------------------------------------------------
// Centroids
// ---------------------------------------------------------------------------

/// Ordered set of `(lat, lon)` points shared by all events of a hazard set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Centroids {
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl Centroids {
    /// Creates centroids from parallel latitude and longitude arrays.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::ShapeMismatch`] if the arrays differ in length,
    /// or [`HazardError::Validation`] if any coordinate is not finite.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> Result<Self, HazardError> {
        if lat.len() != lon.len() {
            return Err(HazardError::ShapeMismatch {
                what: "centroid lon".to_string(),
                expected: lat.len(),
                got: lon.len(),
            });
        }
        let bad = lat
            .iter()
            .zip(&lon)
            .filter(|(a, o)| !a.is_finite() || !o.is_finite())
            .count();
        if bad > 0 {
            return Err(HazardError::Validation {
                count: bad,
                details: format!("{bad} centroid(s) with non-finite coordinates"),
            });
        }
        Ok(Self { lat, lon })
    }

    /// Builds a row-major grid: latitude varies slowest, longitude fastest.
    pub fn from_grid(lons: &[f64], lats: &[f64]) -> Self {
        let n = lons.len() * lats.len();
        let mut lat = Vec::with_capacity(n);
        let mut lon = Vec::with_capacity(n);
        for &y in lats {
            for &x in lons {
                lat.push(y);
                lon.push(x);
            }
        }
        Self { lat, lon }
    }

    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Returns `(lat, lon)` of centroid `i`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.lat.get(i)?, *self.lon.get(i)?))
    }

    /// Bounding extent of all centroids, `None` when empty.
    pub fn extent(&self) -> Option<Extent> {
        if self.is_empty() {
            return None;
        }
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
        };
        let (lat_min, lat_max) = fold(&self.lat);
        let (lon_min, lon_max) = fold(&self.lon);
        Some(Extent {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Indices of centroids inside `extent`, ascending.
    pub fn indices_within(&self, extent: &Extent) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| extent.contains(self.lat[i], self.lon[i]))
            .collect()
    }

    /// Subset in the order of `indices`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            lat: indices.iter().map(|&i| self.lat[i]).collect(),
            lon: indices.iter().map(|&i| self.lon[i]).collect(),
        }
    }

    /// Concatenates centroid sets in order without deduplication.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Centroids>) -> Self {
        let mut out = Self::default();
        for c in parts {
            out.lat.extend_from_slice(&c.lat);
            out.lon.extend_from_slice(&c.lon);
        }
        out
    }

    /// First point where `self` and `other` differ by more than `tol`.
    ///
    /// Returns a description of the difference, or `None` if they match.
    pub fn first_difference(&self, other: &Centroids, tol: f64) -> Option<String> {
        if self.len() != other.len() {
            return Some(format!("{} centroids vs {}", self.len(), other.len()));
        }
        (0..self.len()).find_map(|i| {
            let dlat = (self.lat[i] - other.lat[i]).abs();
            let dlon = (self.lon[i] - other.lon[i]).abs();
            (dlat > tol || dlon > tol).then(|| {
                format!(
                    "centroid {i} at ({}, {}) vs ({}, {})",
                    self.lat[i], self.lon[i], other.lat[i], other.lon[i]
                )
            })
        })
    }
}
