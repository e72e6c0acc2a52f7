use crate::error::OrbitalError;
use ndarray::prelude::*;
use ndarray_linalg::{Determinant, SVD};
use ndarray_stats::QuantileExt;

// Orbitals are unique only up to sign and, for degenerate subspaces, up to a rotation. The
// functions in this module compare subspaces instead of coefficient vectors.

/// det(A^T S B) of two orbital sets with the same number of orbitals. For two orthonormal sets
/// the absolute value is 1 if and only if they span the same subspace.
pub fn subspace_overlap_det(
    a: ArrayView2<f64>,
    b: ArrayView2<f64>,
    s: ArrayView2<f64>,
) -> Result<f64, OrbitalError> {
    if a.ncols() != b.ncols() {
        return Err(OrbitalError::dimension(format!(
            "cannot compare a subspace of {} orbitals with one of {} orbitals",
            a.ncols(),
            b.ncols()
        )));
    }
    let overlap: Array2<f64> = a.t().dot(&s.dot(&b));
    Ok(overlap.det()?)
}

/// Tr |A^T S B|, the sum of the absolute values of the diagonal of the MO overlap.
pub fn trace_abs_overlap(a: ArrayView2<f64>, b: ArrayView2<f64>, s: ArrayView2<f64>) -> f64 {
    a.t().dot(&s.dot(&b)).diag().mapv(f64::abs).sum()
}

/// Largest absolute deviation of C^T S C from the unit matrix.
pub fn orthonormality_error(c: ArrayView2<f64>, s: ArrayView2<f64>) -> f64 {
    if c.ncols() == 0 {
        return 0.0;
    }
    let deviation: Array2<f64> = c.t().dot(&s.dot(&c)) - Array2::<f64>::eye(c.ncols());
    *deviation.mapv(f64::abs).max().unwrap_or(&f64::NAN)
}

/// Numerical rank: number of singular values larger than `tol` times the largest one.
pub fn matrix_rank(a: ArrayView2<f64>, tol: f64) -> Result<usize, OrbitalError> {
    if a.nrows() == 0 || a.ncols() == 0 {
        return Ok(0);
    }
    let (_, sigma, _) = a.to_owned().svd(false, false)?;
    let sigma_max: f64 = sigma.iter().cloned().fold(0.0, f64::max);
    Ok(sigma.iter().filter(|&&x| x > tol * sigma_max).count())
}
