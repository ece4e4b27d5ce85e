//! One-degree tile naming.

use drisk_hazard::Extent;

/// Name of the one-degree tile whose south-west corner is `(lat, lon)`.
///
/// Formatted as `{N|S}{|lat|:02}{E|W}{|lon|:03}`, e.g. `N05E120`, `S01W070`.
pub fn tile_name(lat: i32, lon: i32) -> String {
    let lat_dir = if lat >= 0 { 'N' } else { 'S' };
    let lon_dir = if lon >= 0 { 'E' } else { 'W' };
    format!(
        "{lat_dir}{:02}{lon_dir}{:03}",
        lat.unsigned_abs(),
        lon.unsigned_abs()
    )
}

/// Names of all one-degree tiles covering `extent`, latitude-major.
///
/// Tiles span `floor(min)..ceil(max)` on each axis; a degenerate axis
/// (`min == max` on an integer) still yields one tile.
pub fn tile_names_for_extent(extent: &Extent) -> Vec<String> {
    let (lat_start, lat_end) = axis_range(extent.lat_min(), extent.lat_max());
    let (lon_start, lon_end) = axis_range(extent.lon_min(), extent.lon_max());
    let mut names = Vec::new();
    for lat in lat_start..lat_end {
        for lon in lon_start..lon_end {
            names.push(tile_name(lat, lon));
        }
    }
    names
}

/// Tile corners are the floor on both sides of zero, so `-0.5` falls in
/// `S01` and `-70.5` in `W071`.
fn axis_range(min: f64, max: f64) -> (i32, i32) {
    let start = min.floor() as i32;
    let end = (max.ceil() as i32).max(start + 1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_by_hemisphere() {
        assert_eq!(tile_name(5, 120), "N05E120");
        assert_eq!(tile_name(-1, -70), "S01W070");
        assert_eq!(tile_name(0, 0), "N00E000");
        assert_eq!(tile_name(-12, 7), "S12E007");
    }

    #[test]
    fn extent_covering_two_by_two() {
        let e = Extent::new(120.2, 121.7, 5.5, 6.1).unwrap();
        assert_eq!(
            tile_names_for_extent(&e),
            vec!["N05E120", "N05E121", "N06E120", "N06E121"]
        );
    }

    #[test]
    fn negative_fractional_extent() {
        let e = Extent::new(-70.5, -70.2, -0.5, -0.1).unwrap();
        assert_eq!(tile_names_for_extent(&e), vec!["S01W071"]);
    }

    #[test]
    fn equator_straddling_extent_includes_s01() {
        let e = Extent::new(9.2, 9.8, -0.5, 0.4).unwrap();
        assert_eq!(tile_names_for_extent(&e), vec!["S01E009", "N00E009"]);
        let e = Extent::new(9.2, 9.8, -1.0, -0.2).unwrap();
        assert_eq!(tile_names_for_extent(&e), vec!["S01E009"]);
    }

    #[test]
    fn integer_point_extent_yields_one_tile() {
        let e = Extent::new(10.0, 10.0, 3.0, 3.0).unwrap();
        assert_eq!(tile_names_for_extent(&e), vec!["N03E010"]);
    }
}
