use crate::error::OrbitalError;
use crate::io::{OrthogonalizationConfig, PartitionConfig};
use crate::orthogonalization::sym_ortho;
use crate::partitioning::{partition_with_projector, RankedSingularValue, SubspacePartition};
use crate::projector::FragmentProjector;
use crate::utils::{hstack_blocks, index_ranges, orthonormality_error};
use log::{info, warn};
use ndarray::prelude::*;

/// Orthonormal orbitals of all fragments together with the bookkeeping that a fragment based
/// active space calculation needs.
#[derive(Clone, Debug)]
pub struct ActiveSpace {
    /// Orbitals of each fragment, orthonormal within and across the fragments.
    pub fragments: Vec<Array2<f64>>,
    /// Number of orbitals that each fragment received from each orbital block.
    pub block_sizes: Vec<Vec<usize>>,
    /// Number of (alpha, beta) electrons in every fragment.
    pub init_fspace: Vec<(usize, usize)>,
    /// 1-based indices of the orbitals of every fragment in the concatenated active space.
    pub clusters: Vec<Vec<usize>>,
    /// Ranked singular values of the fragment orbitals of every fragment.
    pub singular_values: Vec<Vec<RankedSingularValue>>,
    /// Environment orbitals that still overlap with the fragment, for every fragment.
    pub leaked: Vec<Vec<RankedSingularValue>>,
}

impl ActiveSpace {
    pub fn n_orbitals(&self) -> usize {
        self.fragments.iter().map(|c| c.ncols()).sum()
    }

    /// All fragment orbitals in one matrix, ordered like `clusters`.
    pub fn orbitals(&self) -> Array2<f64> {
        let n_ao: usize = self.fragments.first().map(|c| c.nrows()).unwrap_or(0);
        hstack_blocks(n_ao, &self.fragments)
    }
}

/// Electron counts of a fragment whose orbitals come from the blocks
/// [doubly occupied, singly occupied, virtual] or [occupied, virtual].
fn electron_counts(block_sizes: &[usize]) -> (usize, usize) {
    let n_docc: usize = block_sizes.first().cloned().unwrap_or(0);
    let n_socc: usize = if block_sizes.len() > 2 {
        block_sizes[1]
    } else {
        0
    };
    (n_docc + n_socc, n_docc)
}

/// Every fragment selects its orbitals from the full set of orbital blocks with the SVD
/// partitioning. The orbitals of the different fragments overlap in general, so that they are
/// orthogonalized symmetrically at the end, which keeps each of them as close as possible to
/// its fragment.
pub fn fragment_active_space(
    blocks: &[Array2<f64>],
    fragments: &[FragmentProjector],
    s: ArrayView2<f64>,
    partition_config: &PartitionConfig,
    ortho_config: &OrthogonalizationConfig,
) -> Result<ActiveSpace, OrbitalError> {
    let n_ao: usize = s.nrows();
    let mut c_frags: Vec<Array2<f64>> = Vec::with_capacity(fragments.len());
    let mut block_sizes: Vec<Vec<usize>> = Vec::with_capacity(fragments.len());
    let mut init_fspace: Vec<(usize, usize)> = Vec::with_capacity(fragments.len());
    let mut singular_values: Vec<Vec<RankedSingularValue>> = Vec::with_capacity(fragments.len());
    let mut leaked: Vec<Vec<RankedSingularValue>> = Vec::with_capacity(fragments.len());

    for (idx, fragment) in fragments.iter().enumerate() {
        info!("{: <25} {}", "Fragment:", idx);
        let partition: SubspacePartition =
            partition_with_projector(blocks, fragment, s, partition_config)?;
        let sizes: Vec<usize> = partition.fragment_sizes();
        init_fspace.push(electron_counts(&sizes));
        leaked.push(partition.leaked().cloned().collect());
        singular_values.push(partition.spectrum[..partition.n_frag].to_vec());
        c_frags.push(hstack_blocks(n_ao, &partition.fragment));
        block_sizes.push(sizes);
    }

    let n_orbs: Vec<usize> = c_frags.iter().map(|c| c.ncols()).collect();
    let clusters: Vec<Vec<usize>> = index_ranges(&n_orbs, 1);

    let c_frags: Vec<Array2<f64>> = if c_frags.is_empty() {
        c_frags
    } else {
        sym_ortho(&c_frags, s, ortho_config.singularity_tol)?
    };
    if !c_frags.is_empty() {
        let error: f64 = orthonormality_error(hstack_blocks(n_ao, &c_frags).view(), s);
        if error > ortho_config.orthonormality_tol {
            warn!(
                "the fragment orbitals deviate from orthonormality by {:e}",
                error
            );
        }
    }
    info!("{: <25} {:?}", "init_fspace:", init_fspace);

    Ok(ActiveSpace {
        fragments: c_frags,
        block_sizes,
        init_fspace,
        clusters,
        singular_values,
        leaked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::{orthonormal_orbitals, random_overlap};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn electron_counts_of_block_layouts() {
        assert_eq!(electron_counts(&[3, 1, 2]), (4, 3));
        assert_eq!(electron_counts(&[3, 2]), (3, 3));
        assert_eq!(electron_counts(&[]), (0, 0));
    }

    #[test]
    fn two_fragments_are_orthonormal() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(17);
        let s: Array2<f64> = random_overlap(14, &mut rng);
        let c: Array2<f64> = orthonormal_orbitals(s.view(), &mut rng);
        let blocks: Vec<Array2<f64>> = vec![
            c.slice(s![.., 0..5]).to_owned(),
            c.slice(s![.., 5..6]).to_owned(),
            c.slice(s![.., 6..14]).to_owned(),
        ];
        let fragments: Vec<FragmentProjector> = vec![
            FragmentProjector::LowdinAtomic(vec![0, 1, 2]),
            FragmentProjector::NonOrthogonalAtomic(vec![7, 8, 9, 10]),
        ];
        let active: ActiveSpace = fragment_active_space(
            &blocks,
            &fragments,
            s.view(),
            &PartitionConfig::default(),
            &OrthogonalizationConfig::default(),
        )
        .unwrap();
        assert_eq!(active.n_orbitals(), 7);
        assert_eq!(active.clusters, vec![vec![1, 2, 3], vec![4, 5, 6, 7]]);
        for (sizes, fspace) in active.block_sizes.iter().zip(active.init_fspace.iter()) {
            assert_eq!(*fspace, (sizes[0] + sizes[1], sizes[0]));
        }
        assert!(orthonormality_error(active.orbitals().view(), s.view()) < 1e-8);
        assert_eq!(active.singular_values[1].len(), 4);
    }
}
