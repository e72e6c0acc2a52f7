use crate::error::OrbitalError;
use crate::utils::{check_square, spd_inverse, spd_sqrt};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Oblique projector onto the column space of the fragment projector `Pv` under the metric `S`
///
/// PS = Pv^T S Pv
/// P  = Pv PS^{-1} Pv^T
///
/// The columns of `Pv` are in general not orthonormal w.r.t. `S`, therefore the inverse of their
/// overlap is needed so that P S Pv = Pv holds. `tol` is the smallest ratio of the smallest
/// and the largest eigenvalue of PS that is accepted.
pub fn metric_projector(
    pv: ArrayView2<f64>,
    s: ArrayView2<f64>,
    tol: f64,
) -> Result<Array2<f64>, OrbitalError> {
    let n_ao: usize = s.nrows();
    check_square("overlap matrix", s, n_ao)?;
    if pv.nrows() != n_ao {
        return Err(OrbitalError::dimension(format!(
            "fragment projector has {} rows, but the AO basis has {} functions",
            pv.nrows(),
            n_ao
        )));
    }
    if pv.ncols() > n_ao {
        return Err(OrbitalError::dimension(format!(
            "fragment projector has {} columns, but the AO basis has only {} functions",
            pv.ncols(),
            n_ao
        )));
    }
    let ps: Array2<f64> = pv.t().dot(&s.dot(&pv));
    let ps_inv: Array2<f64> = spd_inverse(ps.view(), tol, "overlap of the fragment projector")?;
    Ok(pv.dot(&ps_inv.dot(&pv.t())))
}

/// Definition of the fragment onto which the orbitals are projected.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FragmentProjector {
    /// Explicit projector Pv[AO, frag], the projection is done with the oblique projector P S.
    Matrix(Array2<f64>),
    /// Indices of Loewdin orthogonalized AOs, S^{-1/2}[:, idx], that define the fragment.
    LowdinAtomic(Vec<usize>),
    /// Indices of the (non-orthogonal) AOs that define the fragment.
    NonOrthogonalAtomic(Vec<usize>),
}

impl FragmentProjector {
    /// Number of fragment orbitals that are selected with this projector.
    pub fn n_frag(&self) -> usize {
        match self {
            FragmentProjector::Matrix(pv) => pv.ncols(),
            FragmentProjector::LowdinAtomic(idx) => idx.len(),
            FragmentProjector::NonOrthogonalAtomic(idx) => idx.len(),
        }
    }

    /// Operator K whose product K B with an orbital block B is decomposed by the SVD
    /// partitioning. The right singular vectors of non-zero singular values span the row space
    /// of K B, which does not change under a left multiplication with a matrix of full column
    /// rank, so the AO index variants only keep the fragment rows.
    pub fn overlap_operator(&self, s: ArrayView2<f64>, tol: f64) -> Result<Array2<f64>, OrbitalError> {
        match self {
            FragmentProjector::Matrix(pv) => {
                let p: Array2<f64> = metric_projector(pv.view(), s, tol)?;
                Ok(p.dot(&s))
            }
            FragmentProjector::LowdinAtomic(idx) => {
                check_square("overlap matrix", s, s.nrows())?;
                check_ao_indices(idx, s.nrows())?;
                let s_half: Array2<f64> = spd_sqrt(s, tol, "overlap matrix")?;
                Ok(s_half.select(Axis(0), idx))
            }
            FragmentProjector::NonOrthogonalAtomic(idx) => {
                check_square("overlap matrix", s, s.nrows())?;
                check_ao_indices(idx, s.nrows())?;
                Ok(s.select(Axis(0), idx))
            }
        }
    }
}

fn check_ao_indices(idx: &[usize], n_ao: usize) -> Result<(), OrbitalError> {
    let mut seen: Vec<bool> = vec![false; n_ao];
    for &i in idx.iter() {
        if i >= n_ao {
            return Err(OrbitalError::dimension(format!(
                "AO index {} is out of range for a basis of {} functions",
                i, n_ao
            )));
        }
        if seen[i] {
            return Err(OrbitalError::dimension(format!(
                "AO index {} occurs more than once in the fragment",
                i
            )));
        }
        seen[i] = true;
    }
    Ok(())
}

/// Projector Pv = S^{-1/2}[:, idx] of the Loewdin orthogonalized AOs with the given indices.
/// Within each orbital block, passing this matrix as [FragmentProjector::Matrix] gives the same
/// span of orbitals with non-zero overlap as [FragmentProjector::LowdinAtomic], but different
/// singular values. Across several blocks the global ranking, and with it the fragment, can
/// therefore differ, unless the blocks together have exactly `idx.len()` non-zero singular
/// values.
pub fn lowdin_ao_projector(
    s: ArrayView2<f64>,
    idx: &[usize],
    tol: f64,
) -> Result<Array2<f64>, OrbitalError> {
    check_square("overlap matrix", s, s.nrows())?;
    check_ao_indices(idx, s.nrows())?;
    let x: Array2<f64> = crate::utils::spd_inverse_sqrt(s, tol, "overlap matrix")?;
    Ok(x.select(Axis(1), idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::AbsDiffEq;

    fn overlap() -> Array2<f64> {
        array![
            [1.0, 0.4, 0.1, 0.0],
            [0.4, 1.0, 0.3, 0.1],
            [0.1, 0.3, 1.0, 0.2],
            [0.0, 0.1, 0.2, 1.0]
        ]
    }

    #[test]
    fn projector_leaves_fragment_space_invariant() {
        let s: Array2<f64> = overlap();
        let pv: Array2<f64> = array![[1.0, 0.2], [0.5, 1.0], [0.0, 0.3], [0.1, 0.0]];
        let p: Array2<f64> = metric_projector(pv.view(), s.view(), 1e-12).unwrap();
        assert_eq!(p.dim(), (4, 4));
        assert!(p.dot(&s).dot(&pv).abs_diff_eq(&pv, 1e-10));
        // idempotent in the S metric
        let ps: Array2<f64> = p.dot(&s);
        assert!(ps.dot(&ps).abs_diff_eq(&ps, 1e-10));
    }

    #[test]
    fn dependent_projector_columns_are_singular() {
        let s: Array2<f64> = overlap();
        let pv: Array2<f64> = array![[1.0, 2.0], [0.5, 1.0], [0.0, 0.0], [0.1, 0.2]];
        match metric_projector(pv.view(), s.view(), 1e-12) {
            Err(OrbitalError::NumericalSingularity(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn projector_row_mismatch() {
        let s: Array2<f64> = overlap();
        let pv: Array2<f64> = Array2::zeros((3, 1));
        match metric_projector(pv.view(), s.view(), 1e-12) {
            Err(OrbitalError::InvalidDimension(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn atomic_operators_select_fragment_rows() {
        let s: Array2<f64> = overlap();
        let frag = FragmentProjector::NonOrthogonalAtomic(vec![1, 3]);
        assert_eq!(frag.n_frag(), 2);
        let k: Array2<f64> = frag.overlap_operator(s.view(), 1e-12).unwrap();
        assert_eq!(k.row(0), s.row(1));
        assert_eq!(k.row(1), s.row(3));

        let out_of_range = FragmentProjector::LowdinAtomic(vec![0, 4]);
        assert!(out_of_range.overlap_operator(s.view(), 1e-12).is_err());
        let duplicate = FragmentProjector::LowdinAtomic(vec![2, 2]);
        assert!(duplicate.overlap_operator(s.view(), 1e-12).is_err());
    }

    #[test]
    fn lowdin_projector_is_orthonormal() {
        let s: Array2<f64> = overlap();
        let pv: Array2<f64> = lowdin_ao_projector(s.view(), &[0, 2], 1e-12).unwrap();
        let overlap_frag: Array2<f64> = pv.t().dot(&s.dot(&pv));
        assert!(overlap_frag.abs_diff_eq(&Array2::<f64>::eye(2), 1e-10));
    }
}
