use crate::utils::spd_inverse_sqrt;
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, UPLO};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;

pub fn random_matrix(n_rows: usize, n_cols: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::random_using((n_rows, n_cols), Uniform::new(-1.0, 1.0), rng)
}

/// Symmetric positive definite matrix with ones on the diagonal that looks like an AO overlap.
pub fn random_overlap(n_ao: usize, rng: &mut StdRng) -> Array2<f64> {
    let a: Array2<f64> = random_matrix(n_ao, n_ao, rng);
    let m: Array2<f64> = Array2::<f64>::eye(n_ao) + 0.5 * a.t().dot(&a) / (n_ao as f64);
    let norm: Array1<f64> = m.diag().mapv(|x| 1.0 / x.sqrt());
    let norm_col: ArrayView2<f64> = norm.view().insert_axis(Axis(1));
    let norm_row: ArrayView2<f64> = norm.view().insert_axis(Axis(0));
    &m * &norm_col * &norm_row
}

/// A complete set of orbitals that is orthonormal in the metric `s`, C = S^{-1/2} Q with a
/// random orthogonal matrix Q.
pub fn orthonormal_orbitals(s: ArrayView2<f64>, rng: &mut StdRng) -> Array2<f64> {
    let n_ao: usize = s.nrows();
    let a: Array2<f64> = random_matrix(n_ao, n_ao, rng);
    let sym: Array2<f64> = &a + &a.t();
    let (_, q): (Array1<f64>, Array2<f64>) = sym.eigh(UPLO::Upper).unwrap();
    spd_inverse_sqrt(s, 1e-14, "overlap matrix").unwrap().dot(&q)
}
