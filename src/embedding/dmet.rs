use crate::error::OrbitalError;
use crate::io::PartitionConfig;
use crate::partitioning::{partition_top_orbitals, SubspacePartition};
use crate::projector::FragmentProjector;
use crate::utils::{check_ao_dimension, check_square, hstack_blocks, index_ranges};
use log::info;
use ndarray::prelude::*;

/// Orbitals of a DMET like clustering: `orbitals` = [occupied environment, fragment 1, ...,
/// fragment n, virtual environment].
#[derive(Clone, Debug)]
pub struct DmetClusters {
    pub orbitals: Vec<Array2<f64>>,
    pub init_fspace: Vec<(usize, usize)>,
    pub clusters: Vec<Vec<usize>>,
}

impl DmetClusters {
    pub fn sizes(&self) -> Vec<usize> {
        self.orbitals.iter().map(|c| c.ncols()).collect()
    }

    pub fn environment_occupied(&self) -> Option<&Array2<f64>> {
        self.orbitals.first()
    }

    pub fn environment_virtual(&self) -> Option<&Array2<f64>> {
        self.orbitals.last()
    }
}

/// Takes the `n` occupied and the `n` virtual orbitals with the largest overlap with every
/// fragment, where `n` is the number of functions of the fragment. Each fragment only sees the
/// orbitals that were not claimed by the fragments before it, so that the occupied and the
/// virtual orbitals of a fragment together form its bath. A fragment receives fewer orbitals if
/// the environment is exhausted.
pub fn dmet_clustering(
    c_occ: ArrayView2<f64>,
    c_vir: ArrayView2<f64>,
    fragments: &[FragmentProjector],
    s: ArrayView2<f64>,
    config: &PartitionConfig,
) -> Result<DmetClusters, OrbitalError> {
    let n_ao: usize = s.nrows();
    check_square("overlap matrix", s, n_ao)?;
    let mut env_occ: Array2<f64> = c_occ.to_owned();
    let mut env_vir: Array2<f64> = c_vir.to_owned();
    check_ao_dimension(n_ao, std::slice::from_ref(&env_occ))?;
    check_ao_dimension(n_ao, std::slice::from_ref(&env_vir))?;

    let mut c_frags: Vec<Array2<f64>> = Vec::with_capacity(fragments.len());
    let mut init_fspace: Vec<(usize, usize)> = Vec::with_capacity(fragments.len());

    for (idx, fragment) in fragments.iter().enumerate() {
        let n_frag: usize = fragment.n_frag();
        let n_occ: usize = n_frag.min(env_occ.ncols());
        let n_vir: usize = n_frag.min(env_vir.ncols());

        let occ: SubspacePartition =
            partition_top_orbitals(&[env_occ], fragment, s, n_occ, config)?;
        let (mut frag_occ, mut rest_occ) = occ.into_parts();
        let vir: SubspacePartition =
            partition_top_orbitals(&[env_vir], fragment, s, n_vir, config)?;
        let (mut frag_vir, mut rest_vir) = vir.into_parts();

        let frag_occ: Array2<f64> = frag_occ.remove(0);
        let frag_vir: Array2<f64> = frag_vir.remove(0);
        env_occ = rest_occ.remove(0);
        env_vir = rest_vir.remove(0);

        info!(
            "{: <25} {} occupied and {} virtual orbitals",
            format!("DMET fragment {}:", idx),
            frag_occ.ncols(),
            frag_vir.ncols()
        );
        init_fspace.push((frag_occ.ncols(), frag_occ.ncols()));
        c_frags.push(hstack_blocks(n_ao, &[frag_occ, frag_vir]));
    }

    let n_orbs: Vec<usize> = c_frags.iter().map(|c| c.ncols()).collect();
    let clusters: Vec<Vec<usize>> = index_ranges(&n_orbs, 1);

    let mut orbitals: Vec<Array2<f64>> = Vec::with_capacity(c_frags.len() + 2);
    orbitals.push(env_occ);
    orbitals.extend(c_frags);
    orbitals.push(env_vir);

    Ok(DmetClusters {
        orbitals,
        init_fspace,
        clusters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::orthonormality_error;
    use crate::utils::tests::{orthonormal_orbitals, random_overlap};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fragments_are_peeled_from_environment() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(23);
        let s: Array2<f64> = random_overlap(16, &mut rng);
        let c: Array2<f64> = orthonormal_orbitals(s.view(), &mut rng);
        let c_occ: ArrayView2<f64> = c.slice(s![.., 0..6]);
        let c_vir: ArrayView2<f64> = c.slice(s![.., 6..16]);
        let fragments: Vec<FragmentProjector> = vec![
            FragmentProjector::LowdinAtomic(vec![0, 1]),
            FragmentProjector::LowdinAtomic(vec![4, 5, 6]),
        ];
        let dmet: DmetClusters =
            dmet_clustering(c_occ, c_vir, &fragments, s.view(), &PartitionConfig::default())
                .unwrap();
        assert_eq!(dmet.sizes(), vec![1, 4, 6, 5]);
        assert_eq!(dmet.init_fspace, vec![(2, 2), (3, 3)]);
        assert_eq!(
            dmet.clusters,
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8, 9, 10]]
        );
        // the orbitals are only rotated within the occupied and the virtual space
        let all: Array2<f64> = hstack_blocks(16, &dmet.orbitals);
        assert!(orthonormality_error(all.view(), s.view()) < 1e-10);
    }

    #[test]
    fn exhausted_environment() {
        let mut rng = StdRng::seed_from_u64(29);
        let s: Array2<f64> = random_overlap(6, &mut rng);
        let c: Array2<f64> = orthonormal_orbitals(s.view(), &mut rng);
        let fragments: Vec<FragmentProjector> = vec![
            FragmentProjector::NonOrthogonalAtomic(vec![0, 1, 2]),
            FragmentProjector::NonOrthogonalAtomic(vec![3, 4]),
        ];
        let dmet: DmetClusters = dmet_clustering(
            c.slice(s![.., 0..4]),
            c.slice(s![.., 4..6]),
            &fragments,
            s.view(),
            &PartitionConfig::default(),
        )
        .unwrap();
        assert_eq!(dmet.sizes(), vec![0, 5, 1, 0]);
        assert_eq!(dmet.init_fspace, vec![(3, 3), (1, 1)]);
        assert_eq!(dmet.environment_occupied().map(|c| c.ncols()), Some(0));
    }
}
