#![allow(dead_code)]
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, UPLO};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use orbpart::utils::spd_inverse_sqrt;

pub fn random_matrix(n_rows: usize, n_cols: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::random_using((n_rows, n_cols), Uniform::new(-1.0, 1.0), rng)
}

/// Symmetric positive definite matrix with unit diagonal.
pub fn random_overlap(n_ao: usize, rng: &mut StdRng) -> Array2<f64> {
    let a: Array2<f64> = random_matrix(n_ao, n_ao, rng);
    let m: Array2<f64> = Array2::<f64>::eye(n_ao) + 0.5 * a.t().dot(&a) / (n_ao as f64);
    let norm: Array1<f64> = m.diag().mapv(|x| 1.0 / x.sqrt());
    let outer: Array2<f64> = norm
        .view()
        .insert_axis(Axis(1))
        .dot(&norm.view().insert_axis(Axis(0)));
    &m * &outer
}

/// Orbitals C that are orthonormal in the metric `s` and a model Fock matrix
/// F = S C diag(e) C^T S that has them as eigenvectors with ascending energies e.
pub fn orbitals_and_fock(s: ArrayView2<f64>, rng: &mut StdRng) -> (Array2<f64>, Array2<f64>) {
    let n_ao: usize = s.nrows();
    let a: Array2<f64> = random_matrix(n_ao, n_ao, rng);
    let sym: Array2<f64> = &a + &a.t();
    let (_, q): (Array1<f64>, Array2<f64>) = sym.eigh(UPLO::Upper).unwrap();
    let c: Array2<f64> = spd_inverse_sqrt(s, 1e-14, "overlap matrix").unwrap().dot(&q);
    let energies: Array1<f64> = Array1::linspace(-2.0, 3.0, n_ao);
    let sc: Array2<f64> = s.dot(&c);
    let f: Array2<f64> = (&sc * &energies.view().insert_axis(Axis(0))).dot(&sc.t());
    (c, f)
}

/// Consecutive column blocks of `c` with the given numbers of columns.
pub fn blocks_of(c: &Array2<f64>, sizes: &[usize]) -> Vec<Array2<f64>> {
    let mut first: usize = 0;
    sizes
        .iter()
        .map(|n| {
            let block: Array2<f64> = c.slice(s![.., first..first + n]).to_owned();
            first += n;
            block
        })
        .collect()
}
