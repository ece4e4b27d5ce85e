//! CSV inputs (exposure, impact functions, building mappings) and CSV
//! result tables.

use std::collections::BTreeMap;
use std::path::Path;

use drisk_ensemble::OutputRow;
use drisk_impact::{ExposurePoint, Exposures, ImpactFunc, ImpactFuncSet, ImpactTable};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::IoError;

#[derive(Debug, Deserialize)]
struct ExposureRecord {
    longitude: f64,
    latitude: f64,
    value: f64,
    admin1: String,
    building_type: String,
}

#[derive(Debug, Deserialize)]
struct ImpactFuncRecord {
    impf_id: u32,
    intensity: f64,
    mdd: f64,
    paa: f64,
}

#[derive(Debug, Deserialize)]
struct MappingRecord {
    building_type: String,
    impf_id: u32,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| IoError::csv(path, e))
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, IoError> {
    let mut reader = open_reader(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| IoError::csv(path, e))
}

/// Reads exposure points from `longitude,latitude,value,admin1,building_type`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Csv`] on malformed rows, or
/// [`IoError::Impact`] if a point fails validation.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_exposures(path: &Path) -> Result<Exposures, IoError> {
    let points = read_records::<ExposureRecord>(path)?
        .into_iter()
        .map(|r| ExposurePoint {
            lon: r.longitude,
            lat: r.latitude,
            value: r.value,
            admin1: r.admin1,
            building_type: r.building_type,
            impf_id: None,
        })
        .collect();
    let exposures = Exposures::new(points)?;
    info!(points = exposures.len(), "read exposures");
    Ok(exposures)
}

/// Reads impact functions from `impf_id,intensity,mdd,paa` rows.
///
/// Rows are grouped by id in file order; each group becomes one curve.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Csv`], or
/// [`IoError::Impact`] if a curve is not monotone in intensity.
pub fn read_impact_functions(path: &Path) -> Result<ImpactFuncSet, IoError> {
    let mut curves: BTreeMap<u32, (Vec<f64>, Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in read_records::<ImpactFuncRecord>(path)? {
        let (i, m, p) = curves.entry(r.impf_id).or_default();
        i.push(r.intensity);
        m.push(r.mdd);
        p.push(r.paa);
    }
    let set = curves
        .into_iter()
        .map(|(id, (i, m, p))| ImpactFunc::new(id, i, m, p))
        .collect::<Result<ImpactFuncSet, _>>()?;
    debug!(path = %path.display(), functions = set.len(), "read impact functions");
    Ok(set)
}

/// Reads a `building_type,impf_id` mapping.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Csv`], or
/// [`IoError::Validation`] if a building type is listed twice.
pub fn read_building_mapping(path: &Path) -> Result<BTreeMap<String, u32>, IoError> {
    let mut mapping = BTreeMap::new();
    let mut duplicates = Vec::new();
    for r in read_records::<MappingRecord>(path)? {
        if mapping.insert(r.building_type.clone(), r.impf_id).is_some() {
            duplicates.push(r.building_type);
        }
    }
    if !duplicates.is_empty() {
        return Err(IoError::Validation {
            count: duplicates.len(),
            details: format!(
                "{}: duplicate building types {}",
                path.display(),
                duplicates.join(", ")
            ),
        });
    }
    Ok(mapping)
}

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
    }
    csv::Writer::from_path(path).map_err(|e| IoError::csv(path, e))
}

/// Writes a result table with `label_header` as the first column.
///
/// # Errors
///
/// Returns [`IoError::File`] or [`IoError::Csv`].
pub fn write_impact_table(path: &Path, table: &ImpactTable, label_header: &str) -> Result<(), IoError> {
    let mut w = create_writer(path)?;
    let names: Vec<&str> = table.column_names().collect();
    let columns = names
        .iter()
        .map(|n| table.column(n))
        .collect::<Result<Vec<_>, _>>()?;

    let csv_err = |e: csv::Error| IoError::csv(path, e);
    w.write_record(std::iter::once(label_header).chain(names.iter().copied()))
        .map_err(csv_err)?;
    for (i, label) in table.labels().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(label.clone());
        record.extend(columns.iter().map(|c| c[i].to_string()));
        w.write_record(&record).map_err(csv_err)?;
    }
    w.flush().map_err(|e| IoError::file(path, e))?;
    info!(path = %path.display(), rows = table.n_rows(), "wrote impact table");
    Ok(())
}

/// Reads a table written by [`write_impact_table`]; the first column holds
/// row labels, every other column must be numeric.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Csv`] on unparseable
/// cells, or [`IoError::Impact`] on duplicate labels.
pub fn read_impact_table(path: &Path) -> Result<ImpactTable, IoError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(|e| IoError::csv(path, e))?.clone();
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut labels = Vec::new();
    let mut columns = vec![Vec::new(); names.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IoError::csv(path, e))?;
        labels.push(record.get(0).unwrap_or_default().to_string());
        for (j, col) in columns.iter_mut().enumerate() {
            let cell = record.get(j + 1).unwrap_or_default();
            let v = cell.parse::<f64>().map_err(|_| {
                IoError::csv(path, format!("row {}: '{cell}' is not a number", line + 2))
            })?;
            col.push(v);
        }
    }

    let mut table = ImpactTable::new(labels)?;
    for (name, values) in names.into_iter().zip(columns) {
        table.add_column(name, values)?;
    }
    Ok(table)
}

/// Writes differenced ensemble rows as `Exposure,Period,Scenario,<metrics>`.
///
/// # Errors
///
/// Returns [`IoError::Validation`] when a row's width does not match
/// `metrics`, or [`IoError::File`] / [`IoError::Csv`].
pub fn write_output_rows(path: &Path, rows: &[OutputRow], metrics: &[String]) -> Result<(), IoError> {
    if let Some(bad) = rows.iter().find(|r| r.values.len() != metrics.len()) {
        return Err(IoError::Validation {
            count: 1,
            details: format!(
                "row {}/{}/{} has {} values for {} metrics",
                bad.exposure,
                bad.period,
                bad.scenario,
                bad.values.len(),
                metrics.len()
            ),
        });
    }
    let mut w = create_writer(path)?;
    let csv_err = |e: csv::Error| IoError::csv(path, e);
    w.write_record(
        ["Exposure", "Period", "Scenario"]
            .into_iter()
            .chain(metrics.iter().map(String::as_str)),
    )
    .map_err(csv_err)?;
    for r in rows {
        let mut record = vec![r.exposure.clone(), r.period.clone(), r.scenario.clone()];
        record.extend(r.values.iter().map(f64::to_string));
        w.write_record(&record).map_err(csv_err)?;
    }
    w.flush().map_err(|e| IoError::file(path, e))?;
    info!(path = %path.display(), rows = rows.len(), "wrote output rows");
    Ok(())
}

/// Reads rows written by [`write_output_rows`]. Returns the metric names
/// (every header after `Exposure,Period,Scenario`) and the rows. Empty
/// cells read as NaN.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], or [`IoError::Csv`] for a missing
/// leading column or an unparseable cell.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_output_rows(path: &Path) -> Result<(Vec<String>, Vec<OutputRow>), IoError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(|e| IoError::csv(path, e))?.clone();
    let lead: Vec<&str> = headers.iter().take(3).collect();
    if lead != ["Exposure", "Period", "Scenario"] {
        return Err(IoError::csv(
            path,
            format!("expected Exposure,Period,Scenario as leading columns, got {lead:?}"),
        ));
    }
    let metrics: Vec<String> = headers.iter().skip(3).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IoError::csv(path, e))?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        let values = (0..metrics.len())
            .map(|j| {
                let cell = record.get(j + 3).unwrap_or_default();
                if cell.is_empty() {
                    return Ok(f64::NAN);
                }
                cell.parse::<f64>().map_err(|_| {
                    IoError::csv(path, format!("row {}: '{cell}' is not a number", line + 2))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(OutputRow {
            exposure: field(0),
            period: field(1),
            scenario: field(2),
            values,
        });
    }
    debug!(rows = rows.len(), metrics = metrics.len(), "read output rows");
    Ok((metrics, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_mapping_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.csv");
        std::fs::write(&path, "building_type,impf_id\nW1,1\nW1,2\n").unwrap();
        let err = read_building_mapping(&path).unwrap_err();
        assert!(matches!(err, IoError::Validation { count: 1, .. }));
    }

    #[test]
    fn output_row_width_checked() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![OutputRow {
            exposure: "admin0".to_string(),
            period: "hist".to_string(),
            scenario: "ERA-5".to_string(),
            values: vec![1.0],
        }];
        let metrics = vec!["AAD".to_string(), "RP_10".to_string()];
        let err = write_output_rows(&dir.path().join("o.csv"), &rows, &metrics).unwrap_err();
        assert!(matches!(err, IoError::Validation { .. }));
    }

    #[test]
    fn output_rows_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PHL_ssp370_0.5_TC.csv");
        std::fs::write(
            &path,
            "Exposure,Period,Scenario,AAD,RP_10\n\
             admin0,hist,ERA-5,12.5,3\n\
             admin1_Luzon,2050,ssp370,,NaN\n",
        )
        .unwrap();
        let (metrics, rows) = read_output_rows(&path).unwrap();
        assert_eq!(metrics, vec!["AAD", "RP_10"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].exposure, "admin0");
        assert_eq!(rows[0].scenario, "ERA-5");
        assert_eq!(rows[0].values, vec![12.5, 3.0]);
        assert_eq!(rows[1].period, "2050");
        assert!(rows[1].values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn output_rows_need_leading_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "admin1,imp_rp_10_low\nu1,1\n").unwrap();
        assert!(matches!(read_output_rows(&path), Err(IoError::Csv { .. })));
    }

    #[test]
    fn missing_file() {
        let err = read_exposures(Path::new("/nonexistent/exposure.csv")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
