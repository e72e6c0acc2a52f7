use crate::error::OrbitalError;
use crate::utils::{
    check_ao_dimension, check_square, column_ranges, hstack_blocks, spd_inverse_sqrt,
    split_columns,
};
use log::debug;
use ndarray::prelude::*;
use std::ops::Range;

/// Symmetric (Loewdin) orthogonalization of a list of MO coefficient matrices, e.g.
/// [C1[AO, MO], C2[AO, MO], ...], in the metric `s`.
///
/// All blocks are concatenated to C, the MO overlap Smo = C^T S C is computed and the orbitals
/// are transformed with Smo^{-1/2}. The result has the same block structure and column order
/// as the input and all orbitals are orthonormal, also across different blocks. Orbitals that
/// are already orthonormal are left unchanged.
pub fn sym_ortho(
    blocks: &[Array2<f64>],
    s: ArrayView2<f64>,
    tol: f64,
) -> Result<Vec<Array2<f64>>, OrbitalError> {
    let n_ao: usize = s.nrows();
    check_square("overlap matrix", s, n_ao)?;
    check_ao_dimension(n_ao, blocks)?;

    let ranges: Vec<Range<usize>> = column_ranges(blocks);
    let c_nonorth: Array2<f64> = hstack_blocks(n_ao, blocks);
    let s_mo: Array2<f64> = c_nonorth.t().dot(&s.dot(&c_nonorth));
    let x: Array2<f64> = spd_inverse_sqrt(
        s_mo.view(),
        tol,
        "MO overlap matrix (the orbitals are linearly dependent)",
    )?;
    debug!(
        "symmetric orthogonalization of {} orbitals in {} blocks",
        c_nonorth.ncols(),
        blocks.len()
    );
    let c_orth: Array2<f64> = c_nonorth.dot(&x);
    Ok(split_columns(c_orth.view(), &ranges))
}
