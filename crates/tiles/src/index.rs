//! Directory index of return-period raster tiles.
//!
//! Expected layout: `{root}/{tile}/{scenario}_{year}/RP{n}.tif`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::TileError;

static SCENARIO_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<scenario>.+)_(?P<year>\d{4})$").expect("valid regex"));
static RP_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RP(?P<rp>\d+)\.tif$").expect("valid regex"));

// ---------------------------------------------------------------------------
// TileFilter
// ---------------------------------------------------------------------------

/// Optional restrictions applied while indexing.
///
/// `None` for a field means "accept everything".
#[derive(Debug, Clone, Default)]
pub struct TileFilter {
    scenarios: Option<Vec<String>>,
    years: Option<Vec<u32>>,
    return_periods: Option<Vec<u32>>,
    tiles: Option<Vec<String>>,
}

impl TileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep these scenarios (e.g. `"RCP45"`).
    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scenarios = Some(scenarios.into_iter().map(Into::into).collect());
        self
    }

    /// Only keep these reference years.
    pub fn with_years(mut self, years: impl IntoIterator<Item = u32>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    /// Only keep these return periods.
    pub fn with_return_periods(mut self, rps: impl IntoIterator<Item = u32>) -> Self {
        self.return_periods = Some(rps.into_iter().collect());
        self
    }

    /// Only descend into these tile directories.
    pub fn with_tiles(mut self, tiles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tiles = Some(tiles.into_iter().map(Into::into).collect());
        self
    }

    fn accepts_tile(&self, tile: &str) -> bool {
        self.tiles.as_ref().is_none_or(|t| t.iter().any(|x| x == tile))
    }

    fn accepts(&self, scenario: &str, year: u32, rp: u32) -> bool {
        self.scenarios
            .as_ref()
            .is_none_or(|s| s.iter().any(|x| x == scenario))
            && self.years.as_ref().is_none_or(|y| y.contains(&year))
            && self.return_periods.as_ref().is_none_or(|r| r.contains(&rp))
    }
}

// ---------------------------------------------------------------------------
// TileIndex
// ---------------------------------------------------------------------------

/// One indexed raster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntry {
    pub tile: String,
    pub scenario: String,
    pub year: u32,
    pub return_period: u32,
    pub path: PathBuf,
}

/// Lookup from `(scenario, year, return period)` to per-tile raster files.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    entries: Vec<TileEntry>,
}

impl TileIndex {
    /// Walks `root` and indexes every `RP{n}.tif` file that passes `filter`.
    ///
    /// Files without a `.tif` extension are ignored. Scenario directories
    /// not named `{scenario}_{year}` and `.tif` files not named `RP{n}.tif`
    /// are fatal. Tiles missing from the tree are simply absent.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::DirNotFound`] if `root` does not exist,
    /// [`TileError::MalformedName`] on naming violations, or
    /// [`TileError::Walk`] if traversal fails.
    #[tracing::instrument(skip(filter), fields(root = %root.display()))]
    pub fn build(root: &Path, filter: &TileFilter) -> Result<Self, TileError> {
        if !root.is_dir() {
            return Err(TileError::DirNotFound {
                path: root.to_path_buf(),
            });
        }

        let walker = WalkDir::new(root)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() != 1 || e.file_name().to_str().is_some_and(|t| filter.accepts_tile(t))
            });

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "tif") {
                continue;
            }
            let parsed = parse_entry(path)?;
            if filter.accepts(&parsed.scenario, parsed.year, parsed.return_period) {
                debug!(path = %path.display(), "indexed tile raster");
                entries.push(parsed);
            }
        }
        entries.sort_by(|a, b| {
            (&a.scenario, a.year, a.return_period, &a.tile)
                .cmp(&(&b.scenario, b.year, b.return_period, &b.tile))
        });
        info!(files = entries.len(), "built tile index");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full mapping `(scenario, year, rp) -> paths`, paths ordered by tile.
    pub fn grouped(&self) -> BTreeMap<(String, u32, u32), Vec<PathBuf>> {
        let mut out: BTreeMap<_, Vec<PathBuf>> = BTreeMap::new();
        for e in &self.entries {
            out.entry((e.scenario.clone(), e.year, e.return_period))
                .or_default()
                .push(e.path.clone());
        }
        out
    }

    /// Mapping `rp -> per-tile paths` for one scenario and year.
    pub fn by_return_period(&self, scenario: &str, year: u32) -> BTreeMap<u32, Vec<PathBuf>> {
        let mut out: BTreeMap<u32, Vec<PathBuf>> = BTreeMap::new();
        for e in self.matching(scenario, year) {
            out.entry(e.return_period).or_default().push(e.path.clone());
        }
        out
    }

    /// Mapping `tile -> [(rp, path)]` for one scenario and year, RPs ascending.
    pub fn by_tile(&self, scenario: &str, year: u32) -> BTreeMap<String, Vec<(u32, PathBuf)>> {
        let mut out: BTreeMap<String, Vec<(u32, PathBuf)>> = BTreeMap::new();
        for e in self.matching(scenario, year) {
            out.entry(e.tile.clone())
                .or_default()
                .push((e.return_period, e.path.clone()));
        }
        for files in out.values_mut() {
            files.sort_by_key(|(rp, _)| *rp);
        }
        out
    }

    fn matching(&self, scenario: &str, year: u32) -> impl Iterator<Item = &TileEntry> {
        self.entries
            .iter()
            .filter(move |e| e.scenario == scenario && e.year == year)
    }
}

fn name_of(path: Option<&Path>) -> Option<&str> {
    path.and_then(Path::file_name).and_then(|n| n.to_str())
}

fn parse_entry(path: &Path) -> Result<TileEntry, TileError> {
    let malformed = |reason: &str| TileError::MalformedName {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let file = name_of(Some(path)).ok_or_else(|| malformed("file name is not UTF-8"))?;
    let scen_dir = path.parent();
    let scen = name_of(scen_dir).ok_or_else(|| malformed("missing scenario directory"))?;
    let tile = name_of(scen_dir.and_then(Path::parent))
        .ok_or_else(|| malformed("missing tile directory"))?;

    let caps = SCENARIO_DIR
        .captures(scen)
        .ok_or_else(|| malformed("scenario directory must be named '{scenario}_{year}'"))?;
    let year: u32 = caps["year"]
        .parse()
        .map_err(|_| malformed("year is not an integer"))?;

    let rp_caps = RP_FILE
        .captures(file)
        .ok_or_else(|| malformed("raster must be named 'RP{n}.tif'"))?;
    let return_period: u32 = rp_caps["rp"]
        .parse()
        .map_err(|_| malformed("return period is not an integer"))?;
    if return_period == 0 {
        return Err(malformed("return period must be positive"));
    }

    Ok(TileEntry {
        tile: tile.to_string(),
        scenario: caps["scenario"].to_string(),
        year,
        return_period,
        path: path.to_path_buf(),
    })
}
