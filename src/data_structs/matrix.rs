use itertools::Either;
use ndarray::{
    Array1,
    Array2,
    Axis,
};
use sprs::CsMat;

/// Cell-by-feature count matrix.
///
/// Rows are cells, columns are features. Entries are expected to be
/// non-negative integers stored as `f64`; see
/// [`check_nonnegative_integers`](crate::preprocessing::check_nonnegative_integers).
#[derive(Debug, Clone, PartialEq)]
pub enum CountMatrix {
    Dense(Array2<f64>),
    /// Always compressed-row.
    Sparse(CsMat<f64>),
}

impl CountMatrix {
    /// Wraps a sparse matrix, converting compressed-column storage to
    /// compressed-row.
    pub fn sparse(matrix: CsMat<f64>) -> Self {
        if matrix.is_csr() {
            CountMatrix::Sparse(matrix)
        }
        else {
            CountMatrix::Sparse(matrix.to_csr())
        }
    }

    pub fn dense(matrix: Array2<f64>) -> Self {
        CountMatrix::Dense(matrix)
    }

    /// `(n_rows, n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        match self {
            CountMatrix::Dense(a) => a.dim(),
            CountMatrix::Sparse(m) => m.shape(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, CountMatrix::Sparse(_))
    }

    /// Total count of every row.
    pub fn row_sums(&self) -> Array1<f64> {
        match self {
            CountMatrix::Dense(a) => a.sum_axis(Axis(1)),
            CountMatrix::Sparse(m) => {
                m.outer_iterator()
                    .map(|row| row.data().iter().sum::<f64>())
                    .collect()
            },
        }
    }

    /// Stored values. For sparse matrices implicit zeros are skipped.
    pub fn values(&self) -> impl Iterator<Item = &f64> + '_ {
        match self {
            CountMatrix::Dense(a) => Either::Left(a.iter()),
            CountMatrix::Sparse(m) => Either::Right(m.data().iter()),
        }
    }

    /// New matrix made of the given rows, in the given order. Fails on an
    /// out-of-bounds index.
    pub fn select_rows(
        &self,
        rows: &[usize],
    ) -> anyhow::Result<CountMatrix> {
        let n_rows = self.n_rows();
        if let Some(&row) = rows.iter().find(|&&row| row >= n_rows) {
            anyhow::bail!("Row {} out of bounds for {} rows", row, n_rows);
        }
        let selected = match self {
            CountMatrix::Dense(a) => CountMatrix::Dense(a.select(Axis(0), rows)),
            CountMatrix::Sparse(m) => {
                let mut indptr = Vec::with_capacity(rows.len() + 1);
                let mut indices = Vec::new();
                let mut data = Vec::new();
                indptr.push(0);
                for view in rows.iter().filter_map(|&row| m.outer_view(row)) {
                    indices.extend_from_slice(view.indices());
                    data.extend_from_slice(view.data());
                    indptr.push(indices.len());
                }
                CountMatrix::Sparse(CsMat::new(
                    (rows.len(), m.cols()),
                    indptr,
                    indices,
                    data,
                ))
            },
        };
        Ok(selected)
    }

    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            CountMatrix::Dense(a) => a.clone(),
            CountMatrix::Sparse(m) => m.to_dense(),
        }
    }
}

impl From<Array2<f64>> for CountMatrix {
    fn from(value: Array2<f64>) -> Self {
        CountMatrix::dense(value)
    }
}

impl From<CsMat<f64>> for CountMatrix {
    fn from(value: CsMat<f64>) -> Self {
        CountMatrix::sparse(value)
    }
}
