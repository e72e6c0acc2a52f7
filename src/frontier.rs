use crate::error::OrbitalError;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of core, active and virtual orbitals of one orbital block.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierDims {
    pub core: usize,
    pub active: usize,
    pub virt: usize,
}

impl FrontierDims {
    pub fn new(core: usize, active: usize, virt: usize) -> Self {
        FrontierDims { core, active, virt }
    }

    pub fn total(&self) -> usize {
        self.core + self.active + self.virt
    }
}

impl From<(usize, usize, usize)> for FrontierDims {
    fn from(dims: (usize, usize, usize)) -> Self {
        FrontierDims::new(dims.0, dims.1, dims.2)
    }
}

/// Core, active and virtual orbitals, index-aligned with the blocks they were cut from.
#[derive(Clone, Debug)]
pub struct FrontierOrbitals {
    pub core: Vec<Array2<f64>>,
    pub active: Vec<Array2<f64>>,
    pub virt: Vec<Array2<f64>>,
}

/// Cut every (canonicalized) block into its first `core` orbitals, the next `active` orbitals
/// and the remaining `virt` orbitals. The orbitals are neither reordered nor rotated.
pub fn extract_frontier_orbitals(
    blocks: &[Array2<f64>],
    dims: &[FrontierDims],
) -> Result<FrontierOrbitals, OrbitalError> {
    if blocks.len() != dims.len() {
        return Err(OrbitalError::dimension(format!(
            "{} orbital blocks but {} dimension triples were given",
            blocks.len(),
            dims.len()
        )));
    }
    let mut core: Vec<Array2<f64>> = Vec::with_capacity(blocks.len());
    let mut active: Vec<Array2<f64>> = Vec::with_capacity(blocks.len());
    let mut virt: Vec<Array2<f64>> = Vec::with_capacity(blocks.len());
    for (idx, (block, dim)) in blocks.iter().zip(dims.iter()).enumerate() {
        if dim.total() != block.ncols() {
            return Err(OrbitalError::dimension(format!(
                "block {} has {} orbitals, but the dimensions ({}, {}, {}) sum up to {}",
                idx,
                block.ncols(),
                dim.core,
                dim.active,
                dim.virt,
                dim.total()
            )));
        }
        let first_virt: usize = dim.core + dim.active;
        core.push(block.slice(s![.., ..dim.core]).to_owned());
        active.push(block.slice(s![.., dim.core..first_virt]).to_owned());
        virt.push(block.slice(s![.., first_virt..]).to_owned());
    }
    Ok(FrontierOrbitals { core, active, virt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hstack_blocks;

    #[test]
    fn split_reassembles_block() {
        let block: Array2<f64> = Array2::from_shape_fn((3, 6), |(i, j)| (10 * i + j) as f64);
        let empty: Array2<f64> = Array2::zeros((3, 0));
        let frontier: FrontierOrbitals = extract_frontier_orbitals(
            &[block.clone(), empty],
            &[FrontierDims::new(1, 4, 1), FrontierDims::new(0, 0, 0)],
        )
        .unwrap();
        assert_eq!(frontier.core[0].ncols(), 1);
        assert_eq!(frontier.active[0].ncols(), 4);
        assert_eq!(frontier.virt[0].ncols(), 1);
        let parts: Vec<Array2<f64>> = vec![
            frontier.core[0].clone(),
            frontier.active[0].clone(),
            frontier.virt[0].clone(),
        ];
        assert_eq!(hstack_blocks(3, &parts), block);
        assert_eq!(frontier.active[1].dim(), (3, 0));
    }

    #[test]
    fn dimensions_must_sum_to_block_size() {
        let block: Array2<f64> = Array2::zeros((3, 6));
        assert!(matches!(
            extract_frontier_orbitals(&[block.clone()], &[FrontierDims::new(1, 2, 1)]),
            Err(OrbitalError::InvalidDimension(_))
        ));
        assert!(matches!(
            extract_frontier_orbitals(&[block], &[]),
            Err(OrbitalError::InvalidDimension(_))
        ));
    }
}
