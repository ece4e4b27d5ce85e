use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use drisk_ensemble::{DifferencerConfig, GlobalTotals};
use drisk_impact::{ADMIN0_LABEL, ImpactTable};
use drisk_io::{read_output_rows, write_impact_table};

use crate::cli::GlobalTcArgs;
use crate::config::DriskConfig;

/// Suffix of per-country TC result files.
const TC_SUFFIX: &str = "_TC.csv";
/// Label header of the global tables.
const PERIOD_HEADER: &str = "Period";

/// A per-country result file and the fields encoded in its name.
#[derive(Debug, Clone, PartialEq)]
struct ResultFile {
    iso3: String,
    scenario: String,
    threshold: String,
    path: PathBuf,
}

/// Sum every country's national TC rows into global tables, one pair per
/// (scenario, threshold).
pub fn run(args: &GlobalTcArgs, config: &DriskConfig) -> Result<()> {
    let tc_dir = config.paths.results_dir.join("tc");
    let hist_period = DifferencerConfig::default().hist_period;

    // Step 1: discover `{iso3}/{iso3}_{scenario}_{thresh}_TC.csv`
    let mut groups: BTreeMap<(String, String), Vec<ResultFile>> = BTreeMap::new();
    for file in list_results(&tc_dir)? {
        if !args.scenarios.is_empty() && !args.scenarios.contains(&file.scenario) {
            continue;
        }
        if !args.thresholds.is_empty() && !args.thresholds.contains(&file.threshold) {
            continue;
        }
        groups
            .entry((file.scenario.clone(), file.threshold.clone()))
            .or_default()
            .push(file);
    }
    if groups.is_empty() {
        anyhow::bail!("no TC result files under {}", tc_dir.display());
    }

    // Step 2: accumulate and write
    let out_dir = config.paths.results_dir.join("global");
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    for ((scenario, threshold), files) in &groups {
        let totals = accumulate(files, &hist_period)?;
        info!(
            scenario = %scenario,
            threshold = %threshold,
            countries = totals.countries(),
            "global totals accumulated"
        );

        let sums_path = out_dir.join(format!("global_sums_{scenario}_{threshold}.csv"));
        write_impact_table(&sums_path, &period_table(&totals, totals.sums())?, PERIOD_HEADER)
            .with_context(|| format!("failed to write {}", sums_path.display()))?;
        let rel_path = out_dir.join(format!("relative_changes_{scenario}_{threshold}.csv"));
        write_impact_table(
            &rel_path,
            &period_table(&totals, totals.relative_changes())?,
            PERIOD_HEADER,
        )
        .with_context(|| format!("failed to write {}", rel_path.display()))?;
    }
    Ok(())
}

/// Result files one level below `tc_dir`, sorted by path. Names that do not
/// split into `{iso3}_{scenario}_{thresh}` are skipped with a warning.
fn list_results(tc_dir: &Path) -> Result<Vec<ResultFile>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(tc_dir).min_depth(2).max_depth(2).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", tc_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(stem) = name.strip_suffix(TC_SUFFIX) else {
            continue;
        };
        match parse_result_stem(stem) {
            Some((iso3, scenario, threshold)) => out.push(ResultFile {
                iso3,
                scenario,
                threshold,
                path: entry.into_path(),
            }),
            None => warn!(path = %entry.path().display(), "unrecognised result file name, skipping"),
        }
    }
    Ok(out)
}

/// Splits `{iso3}_{scenario}_{thresh}`.
fn parse_result_stem(stem: &str) -> Option<(String, String, String)> {
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.as_slice() {
        [iso3, scenario, threshold] if !iso3.is_empty() && threshold.parse::<f64>().is_ok() => {
            Some((iso3.to_string(), scenario.to_string(), threshold.to_string()))
        }
        _ => None,
    }
}

/// Adds the national rows of every file in one (scenario, threshold) group.
fn accumulate(files: &[ResultFile], hist_period: &str) -> Result<GlobalTotals> {
    let mut totals: Option<GlobalTotals> = None;
    for file in files {
        let (metrics, rows) = read_output_rows(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        let totals = totals.get_or_insert_with(|| GlobalTotals::new(metrics.clone(), hist_period));
        if totals.metrics() != metrics.as_slice() {
            anyhow::bail!(
                "{} has metrics {metrics:?}, expected {:?}",
                file.path.display(),
                totals.metrics()
            );
        }
        let national: Vec<_> = rows.into_iter().filter(|r| r.exposure == ADMIN0_LABEL).collect();
        if national.is_empty() {
            warn!(path = %file.path.display(), "no {ADMIN0_LABEL} rows, skipping country");
            continue;
        }
        totals
            .add_country(&file.iso3, &national)
            .with_context(|| format!("bad rows in {}", file.path.display()))?;
    }
    totals.ok_or_else(|| anyhow::anyhow!("no result files to accumulate"))
}

/// Periods as rows, metrics as columns.
fn period_table(totals: &GlobalTotals, rows: Vec<(&str, &[f64])>) -> Result<ImpactTable> {
    let mut table = ImpactTable::new(rows.iter().map(|(p, _)| p.to_string()).collect())?;
    for (j, metric) in totals.metrics().iter().enumerate() {
        table.add_column(metric.clone(), rows.iter().map(|(_, v)| v[j]).collect())?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use drisk_io::read_impact_table;

    use super::*;

    const HEADER: &str = "Exposure,Period,Scenario,AAD,RP_10\n";

    fn write_result(root: &Path, iso3: &str, name: &str, body: &str) {
        let dir = root.join("tc").join(iso3);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
    }

    #[test]
    fn result_names() {
        assert_eq!(
            parse_result_stem("PHL_ssp370_0.55"),
            Some(("PHL".to_string(), "ssp370".to_string(), "0.55".to_string()))
        );
        assert_eq!(parse_result_stem("PHL_ssp370"), None);
        assert_eq!(parse_result_stem("PHL_ssp370_low"), None);
    }

    #[test]
    fn global_tables_from_two_countries() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DriskConfig::default();
        config.paths.results_dir = dir.path().to_path_buf();

        write_result(
            dir.path(),
            "PHL",
            "PHL_ssp370_0.5_TC.csv",
            "admin0,hist,ERA-5,10,4\n\
             admin0,2050,ssp370,15,2\n\
             admin1_Luzon,hist,ERA-5,100,100\n",
        );
        write_result(
            dir.path(),
            "VNM",
            "VNM_ssp370_0.5_TC.csv",
            "admin0,hist,ERA-5,5,0\n\
             admin0,2050,ssp370,10,1\n",
        );
        // other threshold, filtered out below
        write_result(dir.path(), "VNM", "VNM_ssp370_0.7_TC.csv", "admin0,hist,ERA-5,1,1\n");
        write_result(dir.path(), "VNM", "note.txt", "");

        let args = GlobalTcArgs {
            scenarios: Vec::new(),
            thresholds: vec!["0.5".to_string()],
        };
        run(&args, &config).unwrap();

        let global = dir.path().join("global");
        let sums = read_impact_table(&global.join("global_sums_ssp370_0.5.csv")).unwrap();
        assert_eq!(sums.labels(), &["hist", "2050"]);
        assert_eq!(sums.column("AAD").unwrap(), &[15.0, 25.0]);
        assert_eq!(sums.column("RP_10").unwrap(), &[4.0, 3.0]);

        let rel = read_impact_table(&global.join("relative_changes_ssp370_0.5.csv")).unwrap();
        assert_eq!(rel.labels(), &["2050"]);
        assert_relative_eq!(rel.column("AAD").unwrap()[0], 1.5);
        assert_relative_eq!(rel.column("RP_10").unwrap()[0], -0.5);

        assert!(!global.join("global_sums_ssp370_0.7.csv").exists());
    }

    #[test]
    fn mismatched_metrics_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_result(dir.path(), "PHL", "PHL_ssp245_0.3_TC.csv", "admin0,hist,ERA-5,1,1\n");
        let other = dir.path().join("tc/VNM");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(
            other.join("VNM_ssp245_0.3_TC.csv"),
            "Exposure,Period,Scenario,AAD\nadmin0,hist,ERA-5,1\n",
        )
        .unwrap();
        let files = list_results(&dir.path().join("tc")).unwrap();
        assert_eq!(files.len(), 2);
        assert!(accumulate(&files, "hist").is_err());
    }
}
