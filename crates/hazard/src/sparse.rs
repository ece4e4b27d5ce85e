//! Compressed sparse row matrix.
//!
//! Used both for hazard intensity (events x centroids) and for impact
//! matrices (events x exposure points). Column indices within a row are
//! strictly increasing; explicit zeros are never stored by the builders.

use crate::error::HazardError;

/// Compressed sparse row matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Creates a matrix from raw CSR arrays after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::InvalidSparse`] if `indptr` has the wrong
    /// length, is not non-decreasing, does not end at `nnz`, or if a row's
    /// column indices are out of range or not strictly increasing.
    pub fn new(
        nrows: usize,
        ncols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, HazardError> {
        let invalid = |reason: String| Err(HazardError::InvalidSparse { reason });
        if indptr.len() != nrows + 1 {
            return invalid(format!(
                "indptr has length {}, expected {}",
                indptr.len(),
                nrows + 1
            ));
        }
        if indices.len() != data.len() {
            return invalid(format!(
                "{} indices but {} values",
                indices.len(),
                data.len()
            ));
        }
        if indptr[0] != 0 || indptr[nrows] != data.len() {
            return invalid(format!(
                "indptr must run from 0 to {}, got {}..{}",
                data.len(),
                indptr[0],
                indptr[nrows]
            ));
        }
        for r in 0..nrows {
            let (start, end) = (indptr[r], indptr[r + 1]);
            if start > end {
                return invalid(format!("indptr decreases at row {r}"));
            }
            let cols = &indices[start..end];
            if cols.iter().any(|&c| c >= ncols) {
                return invalid(format!("row {r} has a column index >= {ncols}"));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return invalid(format!("row {r} column indices not strictly increasing"));
            }
        }
        Ok(Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        })
    }

    /// An all-zero matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            indptr: vec![0; nrows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds a matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate coordinates are summed. Zero results are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::InvalidSparse`] if a coordinate is out of range.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, HazardError> {
        let mut entries: Vec<(usize, usize, f64)> = triplets.into_iter().collect();
        if let Some(&(r, c, _)) = entries.iter().find(|&&(r, c, _)| r >= nrows || c >= ncols) {
            return Err(HazardError::InvalidSparse {
                reason: format!("entry ({r}, {c}) outside {nrows}x{ncols}"),
            });
        }
        entries.sort_by_key(|&(r, c, _)| (r, c));

        let mut builder = CsrBuilder::new(ncols);
        let mut iter = entries.into_iter().peekable();
        for r in 0..nrows {
            let mut row: Vec<(usize, f64)> = Vec::new();
            while let Some(&(er, c, v)) = iter.peek()
                && er == r
            {
                match row.last_mut() {
                    Some((lc, lv)) if *lc == c => *lv += v,
                    _ => row.push((c, v)),
                }
                iter.next();
            }
            builder.push_sparse_row(row);
        }
        Ok(builder.finish())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Column indices and values of row `r`.
    ///
    /// # Panics
    ///
    /// Panics if `r >= nrows`.
    pub fn row(&self, r: usize) -> (&[usize], &[f64]) {
        let (s, e) = (self.indptr[r], self.indptr[r + 1]);
        (&self.indices[s..e], &self.data[s..e])
    }

    /// Value at `(r, c)`, zero when not stored or out of range.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        if r >= self.nrows {
            return 0.0;
        }
        let (cols, vals) = self.row(r);
        cols.binary_search(&c).map(|i| vals[i]).unwrap_or(0.0)
    }

    /// Iterates stored entries as `(row, col, value)`.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows).flat_map(move |r| {
            let (cols, vals) = self.row(r);
            cols.iter().zip(vals).map(move |(&c, &v)| (r, c, v))
        })
    }

    /// Stacks matrices vertically. All inputs must share a column count.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::Empty`] for no inputs or
    /// [`HazardError::ShapeMismatch`] on differing column counts.
    pub fn vstack(parts: &[&CsrMatrix]) -> Result<Self, HazardError> {
        let first = parts.first().ok_or(HazardError::Empty { operation: "vstack" })?;
        let ncols = first.ncols;
        let mut out = Self::zeros(0, ncols);
        for m in parts {
            if m.ncols != ncols {
                return Err(HazardError::ShapeMismatch {
                    what: "vstack columns".to_string(),
                    expected: ncols,
                    got: m.ncols,
                });
            }
            let base = out.data.len();
            out.indptr.extend(m.indptr[1..].iter().map(|p| p + base));
            out.indices.extend_from_slice(&m.indices);
            out.data.extend_from_slice(&m.data);
            out.nrows += m.nrows;
        }
        Ok(out)
    }

    /// Block-diagonal composition: each part keeps its own rows and columns.
    pub fn block_diag(parts: &[&CsrMatrix]) -> Self {
        let ncols = parts.iter().map(|m| m.ncols).sum();
        let mut out = Self::zeros(0, ncols);
        let mut col_offset = 0;
        for m in parts {
            let base = out.data.len();
            out.indptr.extend(m.indptr[1..].iter().map(|p| p + base));
            out.indices.extend(m.indices.iter().map(|c| c + col_offset));
            out.data.extend_from_slice(&m.data);
            out.nrows += m.nrows;
            col_offset += m.ncols;
        }
        out
    }

    /// Keeps the listed columns, renumbered to their position in `cols`.
    ///
    /// `cols` must be strictly increasing; out-of-range entries are ignored.
    pub fn select_columns(&self, cols: &[usize]) -> Self {
        let mut map = vec![usize::MAX; self.ncols];
        for (new, &old) in cols.iter().enumerate() {
            if old < self.ncols {
                map[old] = new;
            }
        }
        let mut builder = CsrBuilder::new(cols.len());
        for r in 0..self.nrows {
            let (rc, rv) = self.row(r);
            builder.push_sparse_row(
                rc.iter()
                    .zip(rv)
                    .filter(|(c, _)| map[**c] != usize::MAX)
                    .map(|(c, &v)| (map[*c], v)),
            );
        }
        builder.finish()
    }

    /// Keeps the listed rows in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of range.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut builder = CsrBuilder::new(self.ncols);
        for &r in rows {
            let (c, v) = self.row(r);
            builder.push_sparse_row(c.iter().copied().zip(v.iter().copied()));
        }
        builder.finish()
    }

    /// Applies `f` to every stored value, dropping entries that become zero.
    pub fn map_values(&self, f: impl Fn(usize, usize, f64) -> f64) -> Self {
        let mut builder = CsrBuilder::new(self.ncols);
        for r in 0..self.nrows {
            let (c, v) = self.row(r);
            builder.push_sparse_row(c.iter().zip(v).map(|(&c, &v)| (c, f(r, c, v))));
        }
        builder.finish()
    }

    /// Boolean matrix (stored as 1.0) of entries strictly greater than `thresh`.
    pub fn threshold(&self, thresh: f64) -> Self {
        self.map_values(|_, _, v| if v > thresh { 1.0 } else { 0.0 })
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.nrows).map(|r| self.row(r).1.iter().sum()).collect()
    }

    /// Column-wise sum over rows `offset, offset + stride, offset + 2*stride, ...`.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn strided_column_sums(&self, offset: usize, stride: usize) -> Vec<f64> {
        assert!(stride > 0, "strided_column_sums: stride must be positive");
        let mut sums = vec![0.0; self.ncols];
        for r in (offset..self.nrows).step_by(stride) {
            let (cols, vals) = self.row(r);
            for (&c, &v) in cols.iter().zip(vals) {
                sums[c] += v;
            }
        }
        sums
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Row-by-row CSR construction.
///
/// Zero and non-finite values are dropped; callers push columns in
/// increasing order.
#[derive(Debug)]
pub struct CsrBuilder {
    ncols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrBuilder {
    pub fn new(ncols: usize) -> Self {
        Self {
            ncols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Appends a dense row; entry `i` goes to column `i`.
    pub fn push_dense_row(&mut self, values: impl IntoIterator<Item = f64>) {
        self.push_sparse_row(values.into_iter().enumerate());
    }

    /// Appends a row given as `(col, value)` pairs in increasing column order.
    pub fn push_sparse_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        for (c, v) in entries {
            if c < self.ncols && v != 0.0 && v.is_finite() {
                self.indices.push(c);
                self.data.push(v);
            }
        }
        self.indptr.push(self.data.len());
    }

    pub fn finish(self) -> CsrMatrix {
        CsrMatrix {
            nrows: self.indptr.len() - 1,
            ncols: self.ncols,
            indptr: self.indptr,
            indices: self.indices,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        // [[0, 2, 0],
        //  [1, 0, 3],
        //  [0, 0, 0]]
        CsrMatrix::new(3, 3, vec![0, 1, 3, 3], vec![1, 0, 2], vec![2.0, 1.0, 3.0]).unwrap()
    }

    #[test]
    fn new_validates_indptr() {
        let err = CsrMatrix::new(2, 2, vec![0, 1], vec![0], vec![1.0]).unwrap_err();
        assert!(matches!(err, HazardError::InvalidSparse { .. }));
    }

    #[test]
    fn new_validates_column_order() {
        let err = CsrMatrix::new(1, 3, vec![0, 2], vec![2, 1], vec![1.0, 1.0]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn new_validates_column_range() {
        assert!(CsrMatrix::new(1, 2, vec![0, 1], vec![5], vec![1.0]).is_err());
    }

    #[test]
    fn get_and_row() {
        let m = sample();
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(9, 0), 0.0);
        assert_eq!(m.row(1), (&[0usize, 2][..], &[1.0, 3.0][..]));
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn triplets_roundtrip() {
        let m = sample();
        let t: Vec<_> = m.triplets().collect();
        assert_eq!(t, vec![(0, 1, 2.0), (1, 0, 1.0), (1, 2, 3.0)]);
        assert_eq!(CsrMatrix::from_triplets(3, 3, t).unwrap(), m);
    }

    #[test]
    fn from_triplets_sums_duplicates() {
        let m = CsrMatrix::from_triplets(1, 2, vec![(0, 1, 1.0), (0, 1, 2.5)]).unwrap();
        assert_eq!(m.get(0, 1), 3.5);
        assert!(CsrMatrix::from_triplets(1, 2, vec![(0, 2, 1.0)]).is_err());
    }

    #[test]
    fn vstack_and_mismatch() {
        let m = sample();
        let s = CsrMatrix::vstack(&[&m, &m]).unwrap();
        assert_eq!(s.nrows(), 6);
        assert_eq!(s.get(4, 2), 3.0);
        let other = CsrMatrix::zeros(1, 4);
        assert!(matches!(
            CsrMatrix::vstack(&[&m, &other]),
            Err(HazardError::ShapeMismatch { .. })
        ));
        assert!(CsrMatrix::vstack(&[]).is_err());
    }

    #[test]
    fn block_diag_offsets_columns() {
        let m = sample();
        let b = CsrMatrix::block_diag(&[&m, &m]);
        assert_eq!((b.nrows(), b.ncols()), (6, 6));
        assert_eq!(b.get(3, 4), 2.0);
        assert_eq!(b.get(3, 1), 0.0);
    }

    #[test]
    fn select_columns_renumbers() {
        let s = sample().select_columns(&[0, 2]);
        assert_eq!(s.ncols(), 2);
        assert_eq!(s.get(1, 0), 1.0);
        assert_eq!(s.get(1, 1), 3.0);
        assert_eq!(s.row(0).0.len(), 0);
    }

    #[test]
    fn threshold_is_strict() {
        let t = sample().threshold(2.0);
        assert_eq!(t.nnz(), 1);
        assert_eq!(t.get(1, 2), 1.0);
    }

    #[test]
    fn strided_sums() {
        let m = sample();
        assert_eq!(m.strided_column_sums(0, 2), vec![0.0, 2.0, 0.0]);
        assert_eq!(m.strided_column_sums(1, 2), vec![1.0, 0.0, 3.0]);
        assert_eq!(m.row_sums(), vec![2.0, 4.0, 0.0]);
    }

    #[test]
    fn builder_drops_zeros_and_nan() {
        let mut b = CsrBuilder::new(4);
        b.push_dense_row([0.0, f64::NAN, 5.0, 0.0]);
        b.push_dense_row([]);
        let m = b.finish();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 2), 5.0);
    }
}
