//! Sparse matrix utilities.
//!
//! Helpers for building the random sparse matrices behind the synthetic
//! precision matrices, on top of nalgebra-sparse.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use rand::Rng;

/// Create a CSC matrix from triplets (row, col, value).
///
/// Duplicates are summed together. Out-of-range triplets are dropped.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: impl IntoIterator<Item = (usize, usize, f64)>,
) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(nrows, ncols);
    for (row, col, val) in triplets {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }

    if coo.nnz() == 0 {
        return CscMatrix::zeros(nrows, ncols);
    }
    CscMatrix::from(&coo)
}

/// Draw a random sparse matrix.
///
/// Every entry is independently nonzero with probability `density`; nonzero
/// values are uniform in `[0, 1)`. Entries are visited in column-major order
/// so a seeded RNG always produces the same matrix.
pub fn random_sparse<R: Rng + ?Sized>(
    nrows: usize,
    ncols: usize,
    density: f64,
    rng: &mut R,
) -> CscMatrix<f64> {
    let mut triplets = Vec::new();
    for col in 0..ncols {
        for row in 0..nrows {
            if rng.random::<f64>() < density {
                triplets.push((row, col, rng.random::<f64>()));
            }
        }
    }
    csc_from_triplets(nrows, ncols, triplets)
}

/// Compute `a + aᵀ` for a square matrix.
pub fn csc_symmetrize(a: &CscMatrix<f64>) -> CscMatrix<f64> {
    let triplets = a
        .triplet_iter()
        .flat_map(|(r, c, v)| [(r, c, *v), (c, r, *v)]);
    csc_from_triplets(a.nrows(), a.ncols(), triplets)
}

/// Sum of absolute off-diagonal values in each row.
pub fn offdiag_abs_row_sums(a: &CscMatrix<f64>) -> Vec<f64> {
    let mut sums = vec![0.0; a.nrows()];
    for (row, col, val) in a.triplet_iter() {
        if row != col {
            sums[row] += val.abs();
        }
    }
    sums
}

/// Convert CSC to dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] += *val;
    }
    dense
}
