//! Integration tests: sparse matrix snapshots through Parquet.

use drisk_hazard::CsrMatrix;
use drisk_io::{Compression, IoError, WriterConfig, read_snapshot, write_snapshot};
use tempfile::tempdir;

fn sample() -> CsrMatrix {
    CsrMatrix::from_triplets(
        4,
        5,
        [(0, 1, 1.0), (0, 4, 0.5), (2, 0, 2.0), (3, 3, 1.0)],
    )
    .unwrap()
}

#[test]
fn snapshot_round_trip_each_compression() {
    let dir = tempdir().unwrap();
    for (i, comp) in [Compression::None, Compression::Snappy, Compression::Zstd]
        .into_iter()
        .enumerate()
    {
        let path = dir.path().join(format!("damage_{i}.parquet"));
        let config = WriterConfig::default().with_compression(comp);
        write_snapshot(&path, &sample(), &config).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), sample());
    }
}

#[test]
fn small_row_groups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("damage.parquet");
    let config = WriterConfig::default().with_row_group_size(1);
    write_snapshot(&path, &sample(), &config).unwrap();
    assert_eq!(read_snapshot(&path).unwrap(), sample());
}

#[test]
fn empty_matrix_keeps_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");
    write_snapshot(&path, &CsrMatrix::zeros(3, 2), &WriterConfig::default()).unwrap();
    let back = read_snapshot(&path).unwrap();
    assert_eq!((back.nrows(), back.ncols(), back.nnz()), (3, 2, 0));
}

#[test]
fn missing_snapshot() {
    let err = read_snapshot(std::path::Path::new("/nonexistent/x.parquet")).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
}
