//! File naming conventions shared by the commands.

use std::path::{Path, PathBuf};

/// Extension of stored hazard sets.
pub const HAZARD_EXT: &str = "nc";

/// Stem of a TC hazard set: `TC_{region}_{res}_MIT[_{model}_{scenario}]_H08`.
pub fn tc_hazard_stem(region: &str, resolution: &str, run: Option<(&str, &str)>) -> String {
    match run {
        Some((model, scenario)) => format!("TC_{region}_{resolution}_MIT_{model}_{scenario}_H08"),
        None => format!("TC_{region}_{resolution}_MIT_H08"),
    }
}

/// Return-period map file of a TC hazard set:
/// `TC_{region}_{res}_MIT[_{model}_{scenario}]_RP-maps.nc`.
pub fn rp_map_path(dir: &Path, region: &str, resolution: &str, run: Option<(&str, &str)>) -> PathBuf {
    let stem = match run {
        Some((model, scenario)) => format!("TC_{region}_{resolution}_MIT_{model}_{scenario}"),
        None => format!("TC_{region}_{resolution}_MIT"),
    };
    dir.join(format!("{stem}_RP-maps.{HAZARD_EXT}"))
}

/// Path of a stored hazard set with the given stem.
pub fn hazard_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{HAZARD_EXT}"))
}

/// Calibration file of a region's (model, scenario) track set.
pub fn calibration_path(dir: &Path, region: &str, run: Option<(&str, &str)>) -> PathBuf {
    match run {
        Some((model, scenario)) => dir.join(format!("freq_{region}_{model}_{scenario}.{HAZARD_EXT}")),
        None => dir.join(format!("freq_{region}.{HAZARD_EXT}")),
    }
}

/// Exposure table of a country.
pub fn exposure_path(dir: &Path, iso3: &str) -> PathBuf {
    dir.join(format!("{iso3}.csv"))
}

/// Formats a threshold the way it appears in output names (`0.3`, `0.45`).
pub fn threshold_label(t: f64) -> String {
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems() {
        assert_eq!(tc_hazard_stem("WP", "0150as", None), "TC_WP_0150as_MIT_H08");
        assert_eq!(
            tc_hazard_stem("WP", "0150as", Some(("cesm2", "ssp370_2cal"))),
            "TC_WP_0150as_MIT_cesm2_ssp370_2cal_H08"
        );
    }

    #[test]
    fn paths() {
        let p = hazard_path(Path::new("/h"), "TC_IO_0150as_MIT_H08");
        assert_eq!(p, PathBuf::from("/h/TC_IO_0150as_MIT_H08.nc"));
        let c = calibration_path(Path::new("/c"), "IO", Some(("mri6", "20thcal")));
        assert_eq!(c, PathBuf::from("/c/freq_IO_mri6_20thcal.nc"));
        assert_eq!(exposure_path(Path::new("e"), "PHL"), PathBuf::from("e/PHL.csv"));
    }

    #[test]
    fn rp_map_names() {
        assert_eq!(
            rp_map_path(Path::new("RPmaps"), "AP", "0150as", None),
            PathBuf::from("RPmaps/TC_AP_0150as_MIT_RP-maps.nc")
        );
        assert_eq!(
            rp_map_path(Path::new("RPmaps"), "SH", "0150as", Some(("mri6", "ssp585_2cal"))),
            PathBuf::from("RPmaps/TC_SH_0150as_MIT_mri6_ssp585_2cal_RP-maps.nc")
        );
    }

    #[test]
    fn threshold_labels() {
        assert_eq!(threshold_label(0.3), "0.3");
        assert_eq!(threshold_label(0.45), "0.45");
        assert_eq!(threshold_label(1.0), "1");
    }
}
