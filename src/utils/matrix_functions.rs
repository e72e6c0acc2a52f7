use crate::error::OrbitalError;
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, UPLO};
use ndarray_stats::QuantileExt;

/// Evaluates f(A) = U f(w) U^T for a real symmetric positive definite matrix A = U w U^T.
/// `what` names the matrix in the error message. The matrix is rejected as singular if its
/// smallest eigenvalue is not larger than `tol` times its largest eigenvalue.
fn spd_function<F: Fn(f64) -> f64>(
    a: ArrayView2<f64>,
    tol: f64,
    what: &str,
    func: F,
) -> Result<Array2<f64>, OrbitalError> {
    if a.nrows() == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let (w, u): (Array1<f64>, Array2<f64>) = a.eigh(UPLO::Upper)?;
    let w_max: f64 = *w
        .max()
        .map_err(|_| OrbitalError::singularity(format!("{} has undefined eigenvalues", what)))?;
    let w_min: f64 = *w
        .min()
        .map_err(|_| OrbitalError::singularity(format!("{} has undefined eigenvalues", what)))?;
    if w_max <= 0.0 || w_min <= tol * w_max {
        return Err(OrbitalError::singularity(format!(
            "{} is singular or not positive definite, eigenvalues range from {:e} to {:e}",
            what, w_min, w_max
        )));
    }
    let fw: Array1<f64> = w.mapv(func);
    // U diag(f(w)) U^T
    Ok((&u * &fw).dot(&u.t()))
}

/// A^{-1} of a symmetric positive definite matrix.
pub fn spd_inverse(a: ArrayView2<f64>, tol: f64, what: &str) -> Result<Array2<f64>, OrbitalError> {
    spd_function(a, tol, what, |x| 1.0 / x)
}

/// A^{-1/2} of a symmetric positive definite matrix (Loewdin orthogonalizer).
pub fn spd_inverse_sqrt(
    a: ArrayView2<f64>,
    tol: f64,
    what: &str,
) -> Result<Array2<f64>, OrbitalError> {
    spd_function(a, tol, what, |x| 1.0 / x.sqrt())
}

/// A^{1/2} of a symmetric positive definite matrix.
pub fn spd_sqrt(a: ArrayView2<f64>, tol: f64, what: &str) -> Result<Array2<f64>, OrbitalError> {
    spd_function(a, tol, what, f64::sqrt)
}
