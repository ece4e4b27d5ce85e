//! Tropical cyclone basin lookup for a country.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, bail};
use drisk_hazard::Extent;
use tracing::info;

/// Ocean basin of a TC hazard set. `Row` stands for a country spanning
/// several basins, whose hazard is the concatenation of all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basin {
    Ap,
    Io,
    Sh,
    Wp,
    Row,
}

impl Basin {
    pub const ALL: [Basin; 4] = [Basin::Ap, Basin::Io, Basin::Sh, Basin::Wp];

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "AP" => Ok(Basin::Ap),
            "IO" => Ok(Basin::Io),
            "SH" => Ok(Basin::Sh),
            "WP" => Ok(Basin::Wp),
            "ROW" => Ok(Basin::Row),
            other => bail!("unknown basin: {other:?}"),
        }
    }

    /// `(lon_min, lon_max, lat_min, lat_max)`.
    fn bounds(self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Basin::Ap => Some((-180.0, 10.0, 0.0, 85.0)),
            Basin::Io => Some((10.0, 100.0, 0.0, 85.0)),
            Basin::Sh => Some((-180.0, 180.0, -85.0, 0.0)),
            Basin::Wp => Some((100.0, 180.0, 0.0, 85.0)),
            Basin::Row => None,
        }
    }

    /// Basins whose hazard files make up this basin's hazard.
    pub fn members(self) -> Vec<Basin> {
        match self {
            Basin::Row => Basin::ALL.to_vec(),
            b => vec![b],
        }
    }
}

impl fmt::Display for Basin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Basin::Ap => "AP",
            Basin::Io => "IO",
            Basin::Sh => "SH",
            Basin::Wp => "WP",
            Basin::Row => "ROW",
        };
        f.write_str(s)
    }
}

/// Basin of an extent: the first basin that fully contains it, `Row` when
/// it overlaps several, `None` when it touches none.
pub fn assign_basin(extent: &Extent) -> Option<Basin> {
    let mut overlapping = Vec::new();
    for basin in Basin::ALL {
        let Some((lon_min, lon_max, lat_min, lat_max)) = basin.bounds() else {
            continue;
        };
        if extent.lon_min() >= lon_min
            && extent.lon_max() <= lon_max
            && extent.lat_min() >= lat_min
            && extent.lat_max() <= lat_max
        {
            return Some(basin);
        }
        if extent.lon_min() <= lon_max
            && extent.lon_max() >= lon_min
            && extent.lat_min() <= lat_max
            && extent.lat_max() >= lat_min
        {
            overlapping.push(basin);
        }
    }
    match overlapping.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => Some(Basin::Row),
    }
}

/// Basin for `iso3`: the configured region, falling back to the extent
/// test for countries listed as `ROW` or not listed at all.
pub fn resolve_basin(iso3: &str, regions: &BTreeMap<String, String>, extent: &Extent) -> Result<Basin> {
    let configured = regions.get(iso3).map(|r| Basin::parse(r)).transpose()?;
    if let Some(b) = configured.filter(|b| *b != Basin::Row) {
        return Ok(b);
    }
    match assign_basin(extent) {
        Some(b) => {
            info!(iso3, basin = %b, "basin assigned from exposure extent");
            Ok(b)
        }
        None => bail!("exposure extent of {iso3} lies in no TC basin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Extent {
        Extent::new(lon_min, lon_max, lat_min, lat_max).unwrap()
    }

    #[test]
    fn contained_extent() {
        assert_eq!(assign_basin(&extent(120.0, 126.0, 5.0, 19.0)), Some(Basin::Wp));
        assert_eq!(assign_basin(&extent(-90.0, -60.0, 10.0, 25.0)), Some(Basin::Ap));
        assert_eq!(assign_basin(&extent(113.0, 154.0, -43.0, -10.0)), Some(Basin::Sh));
    }

    #[test]
    fn straddling_extent_is_row() {
        // Indonesia crosses the equator.
        assert_eq!(assign_basin(&extent(95.0, 141.0, -11.0, 6.0)), Some(Basin::Row));
    }

    #[test]
    fn configured_region_wins() {
        let regions = BTreeMap::from([("PHL".to_string(), "WP".to_string())]);
        let b = resolve_basin("PHL", &regions, &extent(0.0, 1.0, -1.0, 1.0)).unwrap();
        assert_eq!(b, Basin::Wp);
    }

    #[test]
    fn row_falls_back_to_extent() {
        let regions = BTreeMap::from([("MDG".to_string(), "ROW".to_string())]);
        let b = resolve_basin("MDG", &regions, &extent(43.0, 50.0, -25.0, -12.0)).unwrap();
        assert_eq!(b, Basin::Sh);
        assert_eq!(Basin::Row.members().len(), 4);
    }

    #[test]
    fn display_and_parse_agree() {
        for b in [Basin::Ap, Basin::Io, Basin::Sh, Basin::Wp, Basin::Row] {
            assert_eq!(Basin::parse(&b.to_string()).unwrap(), b);
        }
    }
}
