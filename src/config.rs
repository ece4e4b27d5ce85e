use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level drisk configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DriskConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsToml,

    /// Coastal flood settings.
    #[serde(default)]
    pub flood: FloodToml,

    /// Tropical cyclone settings.
    #[serde(default)]
    pub tc: TcToml,

    /// Frequency correction settings.
    #[serde(default)]
    pub frequency: FrequencyToml,

    /// Worker pool settings.
    #[serde(default)]
    pub parallel: ParallelToml,

    /// Damage matrix snapshot settings.
    #[serde(default)]
    pub snapshot: SnapshotToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsToml {
    /// Root of the `{tile}/{RCP}_{year}/RP{n}.tif` flood tree.
    #[serde(default = "default_tiles_root")]
    pub tiles_root: PathBuf,
    /// Directory holding hazard chunk files.
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: PathBuf,
    /// Present-climate TC hazard sets.
    #[serde(default = "default_hazard_present_dir")]
    pub hazard_present_dir: PathBuf,
    /// Model TC hazard sets (also the output of `concat-chunks`).
    #[serde(default = "default_hazard_future_dir")]
    pub hazard_future_dir: PathBuf,
    /// Per-region calibration files.
    #[serde(default = "default_calibration_dir")]
    pub calibration_dir: PathBuf,
    /// Exposure tables named `{iso3}.csv`.
    #[serde(default = "default_exposure_dir")]
    pub exposure_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Output of `rp-maps`.
    #[serde(default = "default_rp_maps_dir")]
    pub rp_maps_dir: PathBuf,
}

impl Default for PathsToml {
    fn default() -> Self {
        Self {
            tiles_root: default_tiles_root(),
            chunk_dir: default_chunk_dir(),
            hazard_present_dir: default_hazard_present_dir(),
            hazard_future_dir: default_hazard_future_dir(),
            calibration_dir: default_calibration_dir(),
            exposure_dir: default_exposure_dir(),
            results_dir: default_results_dir(),
            rp_maps_dir: default_rp_maps_dir(),
        }
    }
}

fn default_tiles_root() -> PathBuf {
    PathBuf::from("hazard/coastal_flood")
}
fn default_chunk_dir() -> PathBuf {
    PathBuf::from("hazard/future/chunks")
}
fn default_hazard_present_dir() -> PathBuf {
    PathBuf::from("hazard/present")
}
fn default_hazard_future_dir() -> PathBuf {
    PathBuf::from("hazard/future")
}
fn default_calibration_dir() -> PathBuf {
    PathBuf::from("tracks/future")
}
fn default_exposure_dir() -> PathBuf {
    PathBuf::from("exposure")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_rp_maps_dir() -> PathBuf {
    PathBuf::from("hazard/RPmaps")
}

/// One vulnerability source: impact functions plus the building-type mapping
/// into them.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct VulnerabilityToml {
    pub name: String,
    pub impact_functions: PathBuf,
    pub building_mapping: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloodToml {
    #[serde(default = "default_flood_rcps")]
    pub rcps: Vec<String>,
    #[serde(default = "default_flood_years")]
    pub years: Vec<u32>,
    #[serde(default = "default_flood_rps")]
    pub return_periods: Vec<u32>,
    /// Damage thresholds by label.
    #[serde(default = "default_flood_thresholds")]
    pub thresholds: BTreeMap<String, f64>,
    /// Tile merge strategy: `concat` or `max`.
    #[serde(default = "default_merge")]
    pub merge: String,
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default)]
    pub sources: Vec<VulnerabilityToml>,
}

impl Default for FloodToml {
    fn default() -> Self {
        Self {
            rcps: default_flood_rcps(),
            years: default_flood_years(),
            return_periods: default_flood_rps(),
            thresholds: default_flood_thresholds(),
            merge: default_merge(),
            min_value: default_min_value(),
            max_distance_km: default_max_distance_km(),
            sources: Vec::new(),
        }
    }
}

fn default_flood_rcps() -> Vec<String> {
    vec!["RCP45".to_string(), "RCP85".to_string()]
}
fn default_flood_years() -> Vec<u32> {
    vec![2050, 2100]
}
fn default_flood_rps() -> Vec<u32> {
    vec![1, 10, 25, 50, 100, 250, 500]
}
fn default_flood_thresholds() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("low".to_string(), 0.3),
        ("med".to_string(), 0.45),
        ("high".to_string(), 0.6),
    ])
}
fn default_merge() -> String {
    "concat".to_string()
}
fn default_min_value() -> f64 {
    1.0
}
fn default_max_distance_km() -> f64 {
    100.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcToml {
    #[serde(default = "default_tc_models")]
    pub models: Vec<String>,
    /// Label of the observational reference run.
    #[serde(default = "default_reference")]
    pub reference: String,
    /// Scenario tag of the models' historical hazard files.
    #[serde(default = "default_hist_tag")]
    pub hist_tag: String,
    /// Future period to the suffix appended to the scenario in file names.
    #[serde(default = "default_period_tags")]
    pub period_tags: BTreeMap<String, String>,
    #[serde(default = "default_tc_rps")]
    pub return_periods: Vec<u32>,
    /// Return periods of the intensity maps written by `rp-maps`.
    #[serde(default = "default_rp_map_periods")]
    pub rp_map_periods: Vec<u32>,
    /// Spatial resolution tag in hazard file names.
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// ISO3 code to basin (`AP`, `IO`, `SH`, `WP` or `ROW`).
    #[serde(default)]
    pub regions: BTreeMap<String, String>,
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    pub vulnerability: Option<VulnerabilityToml>,
}

impl Default for TcToml {
    fn default() -> Self {
        Self {
            models: default_tc_models(),
            reference: default_reference(),
            hist_tag: default_hist_tag(),
            period_tags: default_period_tags(),
            return_periods: default_tc_rps(),
            rp_map_periods: default_rp_map_periods(),
            resolution: default_resolution(),
            regions: BTreeMap::new(),
            min_value: default_min_value(),
            max_distance_km: default_max_distance_km(),
            vulnerability: None,
        }
    }
}

fn default_tc_models() -> Vec<String> {
    [
        "cesm2", "cnrm6", "ecearth6", "fgoals", "ipsl6", "miroc6", "mpi6", "mri6", "ukmo6",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
fn default_reference() -> String {
    "ERA-5".to_string()
}
fn default_hist_tag() -> String {
    "20thcal".to_string()
}
fn default_period_tags() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("2050".to_string(), "cal".to_string()),
        ("2100".to_string(), "_2cal".to_string()),
    ])
}
fn default_tc_rps() -> Vec<u32> {
    vec![10, 25, 50, 100, 250]
}
fn default_rp_map_periods() -> Vec<u32> {
    vec![1, 10, 25, 50, 100, 250]
}
fn default_resolution() -> String {
    "0150as".to_string()
}

/// `year_span = "derived"` or a fixed number of simulation years.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum YearSpanToml {
    Years(u32),
    Mode(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrequencyToml {
    #[serde(default = "default_year_span")]
    pub year_span: YearSpanToml,
    /// Calibration variable name.
    #[serde(default = "default_calibration_var")]
    pub variable: String,
}

impl Default for FrequencyToml {
    fn default() -> Self {
        Self {
            year_span: default_year_span(),
            variable: default_calibration_var(),
        }
    }
}

fn default_year_span() -> YearSpanToml {
    YearSpanToml::Years(20)
}
fn default_calibration_var() -> String {
    "freqyear".to_string()
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ParallelToml {
    /// Worker threads for per-unit impact work; 0 uses every core.
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotToml {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Read the damage matrix from an existing snapshot instead of
    /// recomputing it.
    #[serde(default)]
    pub reuse: bool,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for SnapshotToml {
    fn default() -> Self {
        Self {
            enabled: true,
            reuse: false,
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_compression() -> String {
    "zstd".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: DriskConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.flood.return_periods, vec![1, 10, 25, 50, 100, 250, 500]);
        assert_eq!(cfg.flood.thresholds["med"], 0.45);
        assert_eq!(cfg.tc.models.len(), 9);
        assert_eq!(cfg.tc.period_tags["2100"], "_2cal");
        assert_eq!(cfg.frequency.year_span, YearSpanToml::Years(20));
        assert_eq!(cfg.parallel.workers, 0);
        assert_eq!(cfg.tc.rp_map_periods, vec![1, 10, 25, 50, 100, 250]);
        assert_eq!(cfg.paths.rp_maps_dir, PathBuf::from("hazard/RPmaps"));
    }

    #[test]
    fn year_span_accepts_both_forms() {
        let cfg: DriskConfig = toml::from_str("[frequency]\nyear_span = \"derived\"\n").unwrap();
        assert_eq!(cfg.frequency.year_span, YearSpanToml::Mode("derived".to_string()));
        let cfg: DriskConfig = toml::from_str("[frequency]\nyear_span = 35\n").unwrap();
        assert_eq!(cfg.frequency.year_span, YearSpanToml::Years(35));
    }

    #[test]
    fn vulnerability_sources() {
        let cfg: DriskConfig = toml::from_str(
            r#"
            [[flood.sources]]
            name = "cima"
            impact_functions = "vuln/fl_cima.csv"
            building_mapping = "vuln/fl_cima_map.csv"

            [tc.vulnerability]
            name = "capra"
            impact_functions = "vuln/tc_capra.csv"
            building_mapping = "vuln/tc_capra_map.csv"

            [tc.regions]
            PHL = "WP"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.flood.sources[0].name, "cima");
        assert_eq!(cfg.tc.vulnerability.unwrap().name, "capra");
        assert_eq!(cfg.tc.regions["PHL"], "WP");
    }

    #[test]
    fn snapshot_reuse_opt_in() {
        assert!(!DriskConfig::default().snapshot.reuse);
        let cfg: DriskConfig = toml::from_str("[snapshot]\nreuse = true\n").unwrap();
        assert!(cfg.snapshot.reuse);
        assert!(cfg.snapshot.enabled);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<DriskConfig>("[flood]\nrcp = [\"RCP45\"]\n").is_err());
    }
}
