use crate::error::OrbitalError;
use ndarray::prelude::*;
use std::ops::Range;

/// Checks that every orbital block is expressed in an AO basis of size `n_ao`.
pub fn check_ao_dimension(n_ao: usize, blocks: &[Array2<f64>]) -> Result<(), OrbitalError> {
    for (idx, block) in blocks.iter().enumerate() {
        if block.nrows() != n_ao {
            return Err(OrbitalError::dimension(format!(
                "orbital block {} has {} rows, but the AO basis has {} functions",
                idx,
                block.nrows(),
                n_ao
            )));
        }
    }
    Ok(())
}

/// Checks that `matrix` is a square matrix of dimension `n_ao`.
pub fn check_square(name: &str, matrix: ArrayView2<f64>, n_ao: usize) -> Result<(), OrbitalError> {
    if matrix.nrows() != n_ao || matrix.ncols() != n_ao {
        return Err(OrbitalError::dimension(format!(
            "{} has shape {}x{}, expected {}x{}",
            name,
            matrix.nrows(),
            matrix.ncols(),
            n_ao,
            n_ao
        )));
    }
    Ok(())
}

/// The column range that each block occupies in the horizontal concatenation of all blocks.
pub fn column_ranges(blocks: &[Array2<f64>]) -> Vec<Range<usize>> {
    let mut shift: usize = 0;
    blocks
        .iter()
        .map(|block| {
            let range: Range<usize> = shift..(shift + block.ncols());
            shift += block.ncols();
            range
        })
        .collect()
}

/// Horizontal concatenation of the orbital blocks. The result is allocated once and the
/// blocks are copied into their column ranges.
pub fn hstack_blocks(n_ao: usize, blocks: &[Array2<f64>]) -> Array2<f64> {
    let n_mo: usize = blocks.iter().map(|block| block.ncols()).sum();
    let mut c: Array2<f64> = Array2::zeros((n_ao, n_mo));
    for (block, range) in blocks.iter().zip(column_ranges(blocks).into_iter()) {
        c.slice_mut(s![.., range]).assign(block);
    }
    c
}

/// Inverse of [hstack_blocks]: cuts the columns of `c` into the given ranges.
pub fn split_columns(c: ArrayView2<f64>, ranges: &[Range<usize>]) -> Vec<Array2<f64>> {
    ranges
        .iter()
        .map(|range| c.slice(s![.., range.clone()]).to_owned())
        .collect()
}

/// 1/2 (A + A^T), removes the asymmetry that is introduced by round-off errors.
pub fn symmetrize(a: ArrayView2<f64>) -> Array2<f64> {
    0.5 * (&a + &a.t())
}

/// 1-based global orbital indices for consecutive groups of orbitals of the given sizes,
/// starting at `first`.
pub fn index_ranges(sizes: &[usize], first: usize) -> Vec<Vec<usize>> {
    let mut orb_index: usize = first;
    sizes
        .iter()
        .map(|n| {
            let cluster: Vec<usize> = (orb_index..orb_index + n).collect();
            orb_index += n;
            cluster
        })
        .collect()
}
