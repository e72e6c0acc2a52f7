use crate::error::OrbitalError;
use crate::io::PartitionConfig;
use crate::partitioning::logging::*;
use crate::projector::FragmentProjector;
use crate::utils::{check_ao_dimension, check_square};
use log::debug;
use ndarray::prelude::*;
use ndarray_linalg::SVD;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rule that decides which orbital is ranked first if two orbitals from different blocks have
/// exactly the same singular value. This matters at the border between the fragment and the
/// environment, where it decides which block receives the contested orbital.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The orbital of the block that comes first in the list of blocks wins.
    BlockOrder,
    /// The orbital of the block that comes last in the list of blocks wins.
    ReverseBlockOrder,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::BlockOrder
    }
}

impl TieBreak {
    fn order(&self, block_a: usize, block_b: usize) -> Ordering {
        match self {
            TieBreak::BlockOrder => block_a.cmp(&block_b),
            TieBreak::ReverseBlockOrder => block_b.cmp(&block_a),
        }
    }
}

/// Singular value of a rotated orbital, together with the index of the block it belongs to and
/// its column inside the rotated block.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RankedSingularValue {
    pub value: f64,
    pub block: usize,
    pub column: usize,
}

/// Result of the SVD partitioning. `fragment[i]` and `environment[i]` contain the orbitals of
/// the i-th input block that were assigned to the fragment and the environment.
#[derive(Clone, Debug)]
pub struct SubspacePartition {
    pub fragment: Vec<Array2<f64>>,
    pub environment: Vec<Array2<f64>>,
    /// All singular values in descending order, the first `n_frag` belong to the fragment.
    pub spectrum: Vec<RankedSingularValue>,
    pub n_frag: usize,
    leak_threshold: f64,
}

impl SubspacePartition {
    pub fn fragment_sizes(&self) -> Vec<usize> {
        self.fragment.iter().map(|c| c.ncols()).collect()
    }

    pub fn environment_sizes(&self) -> Vec<usize> {
        self.environment.iter().map(|c| c.ncols()).collect()
    }

    /// Environment orbitals whose overlap with the fragment is numerically significant.
    pub fn leaked(&self) -> impl Iterator<Item = &RankedSingularValue> + '_ {
        let threshold: f64 = self.leak_threshold;
        self.spectrum[self.n_frag..]
            .iter()
            .filter(move |sv| sv.value > threshold)
    }

    pub fn into_parts(self) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        (self.fragment, self.environment)
    }
}

struct RotatedBlock {
    orbitals: Array2<f64>,
    singular_values: Array1<f64>,
}

fn unrotated_block(block: &Array2<f64>) -> RotatedBlock {
    RotatedBlock {
        orbitals: block.clone(),
        singular_values: Array1::zeros(block.ncols()),
    }
}

/// SVD of K B = U s V^T. The block is rotated to B V so that its orbitals are ordered by their
/// overlap with the fragment. The singular values are padded with zeros if K B has less rows
/// than columns.
fn rotate_block(k: ArrayView2<f64>, block: &Array2<f64>) -> Result<RotatedBlock, OrbitalError> {
    let n_mo: usize = block.ncols();
    if n_mo == 0 || k.nrows() == 0 {
        return Ok(unrotated_block(block));
    }
    let kb: Array2<f64> = k.dot(block);
    let (_, sigma, vt): (Option<Array2<f64>>, Array1<f64>, Option<Array2<f64>>) =
        kb.svd(false, true)?;
    let vt: Array2<f64> = match vt {
        Some(vt) => vt,
        None => {
            return Err(OrbitalError::singularity(
                "the SVD did not return the right singular vectors",
            ))
        }
    };
    let mut singular_values: Array1<f64> = Array1::zeros(n_mo);
    singular_values
        .slice_mut(s![..sigma.len()])
        .assign(&sigma);
    Ok(RotatedBlock {
        orbitals: block.dot(&vt.t()),
        singular_values,
    })
}

/// Find the orbitals that overlap most strongly with the fragment projector `pv` by rotations
/// within each orbital block.
///
/// [C1, C2, C3] -> [(C1f, C2f, C3f), (C1e, C2e, C3e)]
///
/// where C1f and C1e are the fragment and the environment orbitals of block 1. Common choices
/// for the blocks are [occupied, virtual] or [doubly occupied, singly occupied, virtual].
/// Exactly `pv.ncols()` orbitals are assigned to the fragment.
pub fn svd_subspace_partitioning(
    blocks: &[Array2<f64>],
    pv: ArrayView2<f64>,
    s: ArrayView2<f64>,
    config: &PartitionConfig,
) -> Result<SubspacePartition, OrbitalError> {
    check_square("overlap matrix", s, s.nrows())?;
    check_ao_dimension(s.nrows(), blocks)?;
    check_fragment_size(blocks, pv.ncols())?;
    let p: Array2<f64> = crate::projector::metric_projector(pv, s, config.singularity_tol)?;
    partition_with_operator(blocks, p.dot(&s).view(), pv.ncols(), config)
}

/// Same as [svd_subspace_partitioning] but for any kind of [FragmentProjector].
pub fn partition_with_projector(
    blocks: &[Array2<f64>],
    fragment: &FragmentProjector,
    s: ArrayView2<f64>,
    config: &PartitionConfig,
) -> Result<SubspacePartition, OrbitalError> {
    partition_top_orbitals(blocks, fragment, s, fragment.n_frag(), config)
}

/// Assigns the `n_frag` orbitals with the largest overlap with `fragment` to the fragment,
/// independent of the number of functions that define the fragment.
pub fn partition_top_orbitals(
    blocks: &[Array2<f64>],
    fragment: &FragmentProjector,
    s: ArrayView2<f64>,
    n_frag: usize,
    config: &PartitionConfig,
) -> Result<SubspacePartition, OrbitalError> {
    check_square("overlap matrix", s, s.nrows())?;
    check_ao_dimension(s.nrows(), blocks)?;
    check_fragment_size(blocks, n_frag)?;
    let k: Array2<f64> = fragment.overlap_operator(s, config.singularity_tol)?;
    partition_with_operator(blocks, k.view(), n_frag, config)
}

/// Descending singular values, then the tie-break between blocks, then the column. This is a
/// total order, also for NaN values.
fn rank_order(a: &RankedSingularValue, b: &RankedSingularValue, tie_break: TieBreak) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| tie_break.order(a.block, b.block))
        .then_with(|| a.column.cmp(&b.column))
}

fn check_fragment_size(blocks: &[Array2<f64>], n_frag: usize) -> Result<(), OrbitalError> {
    let n_mo: usize = blocks.iter().map(|c| c.ncols()).sum();
    if n_frag > n_mo {
        return Err(OrbitalError::dimension(format!(
            "{} fragment orbitals were requested, but the blocks contain only {} orbitals",
            n_frag, n_mo
        )));
    }
    Ok(())
}

fn partition_with_operator(
    blocks: &[Array2<f64>],
    k: ArrayView2<f64>,
    n_frag: usize,
    config: &PartitionConfig,
) -> Result<SubspacePartition, OrbitalError> {
    let n_ao: usize = k.ncols();
    let n_mo: usize = blocks.iter().map(|c| c.ncols()).sum();
    print_partition_header(n_mo, n_frag);

    // the blocks are independent of each other, the global ranking below has to wait for all
    let rotated: Vec<RotatedBlock> = if n_frag == 0 || k.nrows() == 0 {
        // nothing overlaps with an empty fragment, all orbitals go to the environment
        blocks.iter().map(unrotated_block).collect()
    } else if config.parallel {
        blocks
            .par_iter()
            .map(|block| rotate_block(k, block))
            .collect::<Result<Vec<RotatedBlock>, OrbitalError>>()?
    } else {
        blocks
            .iter()
            .map(|block| rotate_block(k, block))
            .collect::<Result<Vec<RotatedBlock>, OrbitalError>>()?
    };

    // global ranking of the singular values of all blocks in descending order
    let mut spectrum: Vec<RankedSingularValue> = rotated
        .iter()
        .enumerate()
        .flat_map(|(block, rot)| {
            rot.singular_values
                .iter()
                .enumerate()
                .map(move |(column, &value)| RankedSingularValue {
                    value,
                    block,
                    column,
                })
        })
        .collect();
    let tie_break: TieBreak = config.tie_break;
    spectrum.sort_by(|a, b| rank_order(a, b, tie_break));
    print_singular_values(&spectrum, n_frag, config.print_threshold);

    // the output blocks are allocated with their final size and filled column by column
    let mut n_frag_per_block: Vec<usize> = vec![0; blocks.len()];
    for sv in spectrum[..n_frag].iter() {
        n_frag_per_block[sv.block] += 1;
    }
    let mut fragment: Vec<Array2<f64>> = n_frag_per_block
        .iter()
        .map(|&n| Array2::zeros((n_ao, n)))
        .collect();
    let mut environment: Vec<Array2<f64>> = blocks
        .iter()
        .zip(n_frag_per_block.iter())
        .map(|(block, &n)| Array2::zeros((n_ao, block.ncols() - n)))
        .collect();
    let mut frag_pos: Vec<usize> = vec![0; blocks.len()];
    let mut env_pos: Vec<usize> = vec![0; blocks.len()];
    for (rank, sv) in spectrum.iter().enumerate() {
        let orbital: ArrayView1<f64> = rotated[sv.block].orbitals.column(sv.column);
        if rank < n_frag {
            fragment[sv.block]
                .column_mut(frag_pos[sv.block])
                .assign(&orbital);
            frag_pos[sv.block] += 1;
        } else {
            environment[sv.block]
                .column_mut(env_pos[sv.block])
                .assign(&orbital);
            env_pos[sv.block] += 1;
        }
    }
    debug!(
        "fragment orbitals per block: {:?}, environment orbitals per block: {:?}",
        frag_pos, env_pos
    );

    Ok(SubspacePartition {
        fragment,
        environment,
        spectrum,
        n_frag,
        leak_threshold: config.print_threshold,
    })
}
