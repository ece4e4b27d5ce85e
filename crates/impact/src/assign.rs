//! Nearest-centroid assignment of exposure points.

use std::f64::consts::FRAC_PI_2;

use drisk_hazard::Centroids;
use rstar::{AABB, RTree, RTreeObject};

use crate::exposure::Exposures;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default maximum distance between a point and its centroid.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 100.0;

/// A centroid embedded on the unit sphere. Points within great-circle
/// distance `d` of a query lie inside a cube of half-width
/// `2 * sin(d / 2R)` around it.
#[derive(Debug, Clone, Copy)]
struct SpherePoint {
    xyz: [f64; 3],
    index: usize,
}

impl RTreeObject for SpherePoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

fn to_unit_sphere(lat: f64, lon: f64) -> [f64; 3] {
    let (lat, lon) = (lat.to_radians(), lon.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = p2 - p1;
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Centroid index for each exposure point, `None` when the nearest
/// centroid is farther than `max_distance_km`.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidAssignment {
    centroid_of: Vec<Option<usize>>,
}

impl CentroidAssignment {
    /// Assigns every exposure point to its nearest centroid within
    /// `max_distance_km`. Ties go to the lower centroid index.
    pub fn nearest(exposures: &Exposures, centroids: &Centroids, max_distance_km: f64) -> Self {
        let half_angle = (max_distance_km / (2.0 * EARTH_RADIUS_KM)).clamp(0.0, FRAC_PI_2);
        let half_width = 2.0 * half_angle.sin() * (1.0 + 1e-9);
        let tree = RTree::bulk_load(
            (0..centroids.len())
                .map(|i| SpherePoint {
                    xyz: to_unit_sphere(centroids.lat()[i], centroids.lon()[i]),
                    index: i,
                })
                .collect(),
        );
        let centroid_of = exposures
            .points()
            .iter()
            .map(|p| {
                let q = to_unit_sphere(p.lat, p.lon);
                let query = AABB::from_corners(
                    [q[0] - half_width, q[1] - half_width, q[2] - half_width],
                    [q[0] + half_width, q[1] + half_width, q[2] + half_width],
                );
                tree.locate_in_envelope_intersecting(&query)
                    .filter_map(|c| {
                        let (clat, clon) = centroids.get(c.index)?;
                        Some((haversine_km(p.lat, p.lon, clat, clon), c.index))
                    })
                    .filter(|(d, _)| *d <= max_distance_km)
                    .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(_, i)| i)
            })
            .collect();
        Self { centroid_of }
    }

    /// Builds an assignment from explicit indices.
    pub fn from_indices(centroid_of: Vec<Option<usize>>) -> Self {
        Self { centroid_of }
    }

    pub fn get(&self, point: usize) -> Option<usize> {
        self.centroid_of.get(point).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.centroid_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroid_of.is_empty()
    }

    /// Number of points without a centroid within range.
    pub fn unassigned(&self) -> usize {
        self.centroid_of.iter().filter(|c| c.is_none()).count()
    }

    /// Exposure point indices grouped by centroid index.
    pub(crate) fn points_per_centroid(&self, n_centroids: usize) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); n_centroids];
        for (p, c) in self.centroid_of.iter().enumerate() {
            if let Some(c) = c
                && *c < n_centroids
            {
                out[*c].push(p);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::point;
    use approx::assert_relative_eq;

    #[test]
    fn haversine_one_degree_at_equator() {
        assert_relative_eq!(haversine_km(0.0, 0.0, 0.0, 1.0), 111.195, epsilon = 1e-3);
        assert_eq!(haversine_km(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn nearest_with_cutoff() {
        let centroids = Centroids::from_grid(&[0.0, 1.0, 2.0], &[0.0]);
        let exposures = Exposures::new(vec![
            point(0.9, 0.1, 1.0, "A"),
            point(2.2, 0.0, 1.0, "A"),
            point(10.0, 0.0, 1.0, "A"),
        ])
        .unwrap();
        let a = CentroidAssignment::nearest(&exposures, &centroids, DEFAULT_MAX_DISTANCE_KM);
        assert_eq!(a.get(0), Some(1));
        assert_eq!(a.get(1), Some(2));
        assert_eq!(a.get(2), None);
        assert_eq!(a.unassigned(), 1);
    }

    #[test]
    fn dateline_neighbours() {
        let centroids = Centroids::from_grid(&[179.9, 0.0], &[0.0]);
        let exposures = Exposures::new(vec![point(-179.95, 0.0, 1.0, "A")]).unwrap();
        let a = CentroidAssignment::nearest(&exposures, &centroids, 50.0);
        assert_eq!(a.get(0), Some(0));
    }

    #[test]
    fn grouped_by_centroid() {
        let a = CentroidAssignment::from_indices(vec![Some(1), None, Some(1), Some(0)]);
        assert_eq!(a.points_per_centroid(2), vec![vec![3], vec![0, 2]]);
    }

    #[test]
    fn empty_centroids() {
        let exposures = Exposures::new(vec![point(0.0, 0.0, 1.0, "A")]).unwrap();
        let a = CentroidAssignment::nearest(&exposures, &Centroids::default(), 100.0);
        assert_eq!(a.get(0), None);
    }
}
