//! Parquet snapshots of sparse damage matrices.
//!
//! A snapshot stores the nonzero entries of a [`CsrMatrix`] in coordinate
//! form: columns `row` (u64), `col` (u64) and `value` (f64). The matrix
//! shape travels in the schema metadata under `nrows` and `ncols`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Float64Type, Schema, UInt64Type};
use drisk_hazard::CsrMatrix;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::error::IoError;

const ROW: &str = "row";
const COL: &str = "col";
const VALUE: &str = "value";
const NROWS_KEY: &str = "nrows";
const NCOLS_KEY: &str = "ncols";

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level = parquet::basic::ZstdLevel::try_new(3)?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

/// Configuration for writing matrix snapshots.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    compression: Compression,
    /// Maximum number of entries per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn build_schema(nrows: usize, ncols: usize) -> Schema {
    let fields = vec![
        Field::new(ROW, DataType::UInt64, false),
        Field::new(COL, DataType::UInt64, false),
        Field::new(VALUE, DataType::Float64, false),
    ];
    let metadata = HashMap::from([
        (NROWS_KEY.to_string(), nrows.to_string()),
        (NCOLS_KEY.to_string(), ncols.to_string()),
    ]);
    Schema::new_with_metadata(fields, metadata)
}

fn matrix_to_batch(matrix: &CsrMatrix, schema: &Arc<Schema>) -> Result<RecordBatch, IoError> {
    let nnz = matrix.nnz();
    let mut rows = Vec::with_capacity(nnz);
    let mut cols = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);
    for (r, c, v) in matrix.triplets() {
        rows.push(r as u64);
        cols.push(c as u64);
        values.push(v);
    }
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(rows)),
        Arc::new(UInt64Array::from(cols)),
        Arc::new(Float64Array::from(values)),
    ];
    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

/// Writes `matrix` as a coordinate-form Parquet snapshot.
///
/// # Errors
///
/// Returns [`IoError::Validation`] for an invalid configuration,
/// [`IoError::File`] if the file cannot be created, or [`IoError::Parquet`].
#[tracing::instrument(skip_all, fields(path = %path.display(), nnz = matrix.nnz()))]
pub fn write_snapshot(path: &Path, matrix: &CsrMatrix, config: &WriterConfig) -> Result<(), IoError> {
    config.validate()?;
    let schema = Arc::new(build_schema(matrix.nrows(), matrix.ncols()));
    let props = WriterProperties::builder()
        .set_compression(config.compression.to_parquet()?)
        .set_max_row_group_size(config.row_group_size)
        .build();

    let batch = matrix_to_batch(matrix, &schema)?;
    let file = std::fs::File::create(path).map_err(|e| IoError::file(path, e))?;
    let mut writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    info!(
        rows = matrix.nrows(),
        cols = matrix.ncols(),
        "wrote matrix snapshot"
    );
    Ok(())
}

fn shape_entry(metadata: &HashMap<String, String>, key: &str) -> Result<usize, IoError> {
    let raw = metadata.get(key).ok_or_else(|| IoError::Validation {
        count: 1,
        details: format!("snapshot metadata lacks '{key}'"),
    })?;
    raw.parse().map_err(|_| IoError::Validation {
        count: 1,
        details: format!("snapshot metadata '{key}' is not an integer: '{raw}'"),
    })
}

fn column_index(schema: &Schema, name: &str) -> Result<usize, IoError> {
    schema.index_of(name).map_err(|_| IoError::Validation {
        count: 1,
        details: format!("snapshot has no '{name}' column"),
    })
}

/// Reads a snapshot written by [`write_snapshot`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Parquet`], or
/// [`IoError::Validation`] if the shape metadata or a column is missing or
/// has the wrong type, and [`IoError::Hazard`] for out-of-range entries.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_snapshot(path: &Path) -> Result<CsrMatrix, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let nrows = shape_entry(schema.metadata(), NROWS_KEY)?;
    let ncols = shape_entry(schema.metadata(), NCOLS_KEY)?;
    let (ri, ci, vi) = (
        column_index(&schema, ROW)?,
        column_index(&schema, COL)?,
        column_index(&schema, VALUE)?,
    );

    let wrong_type = |name: &str| IoError::Validation {
        count: 1,
        details: format!("snapshot column '{name}' has an unexpected type"),
    };
    let mut triplets = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let rows = batch
            .column(ri)
            .as_primitive_opt::<UInt64Type>()
            .ok_or_else(|| wrong_type(ROW))?;
        let cols = batch
            .column(ci)
            .as_primitive_opt::<UInt64Type>()
            .ok_or_else(|| wrong_type(COL))?;
        let values = batch
            .column(vi)
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| wrong_type(VALUE))?;
        for i in 0..batch.num_rows() {
            triplets.push((rows.value(i) as usize, cols.value(i) as usize, values.value(i)));
        }
    }

    let matrix = CsrMatrix::from_triplets(nrows, ncols, triplets)?;
    info!(rows = nrows, cols = ncols, nnz = matrix.nnz(), "read matrix snapshot");
    Ok(matrix)
}
