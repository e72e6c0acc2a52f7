use crate::error::OrbitalError;
use crate::io::CanonicalizationConfig;
use crate::utils::{check_ao_dimension, check_square, symmetrize};
use itertools::Itertools;
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, UPLO};
use rayon::prelude::*;

/// Orbital block in the eigenbasis of its projected Fock matrix.
#[derive(Clone, Debug)]
pub struct CanonicalBlock {
    /// Eigenvalues of B^T F B, in ascending order if the block was sorted.
    pub orbital_energies: Array1<f64>,
    pub orbitals: Array2<f64>,
}

/// Rotate each orbital block B into the eigenbasis of f = 1/2 (B^T F B + (B^T F B)^T).
/// The orbitals of each block keep spanning the same subspace. If `sort_orbital_energies` is
/// set, the orbitals are ordered by ascending orbital energy independently of the order in which
/// the eigensolver returns them. The blocks are diagonalized on the rayon thread pool if
/// `parallel` is set.
pub fn canonicalize(
    blocks: &[Array2<f64>],
    f: ArrayView2<f64>,
    config: &CanonicalizationConfig,
) -> Result<Vec<CanonicalBlock>, OrbitalError> {
    check_square("Fock matrix", f, f.nrows())?;
    check_ao_dimension(f.nrows(), blocks)?;
    let sort: bool = config.sort_orbital_energies;
    if config.parallel {
        blocks
            .par_iter()
            .map(|block| canonicalize_block(block, f, sort))
            .collect()
    } else {
        blocks
            .iter()
            .map(|block| canonicalize_block(block, f, sort))
            .collect()
    }
}

fn canonicalize_block(
    block: &Array2<f64>,
    f: ArrayView2<f64>,
    sort: bool,
) -> Result<CanonicalBlock, OrbitalError> {
    if block.ncols() == 0 {
        return Ok(CanonicalBlock {
            orbital_energies: Array1::zeros(0),
            orbitals: block.clone(),
        });
    }
    let f_mo: Array2<f64> = symmetrize(block.t().dot(&f.dot(block)).view());
    let (energies, u): (Array1<f64>, Array2<f64>) = f_mo.eigh(UPLO::Upper)?;
    let orbitals: Array2<f64> = block.dot(&u);
    if !sort {
        return Ok(CanonicalBlock {
            orbital_energies: energies,
            orbitals,
        });
    }
    let order: Vec<usize> = energies
        .iter()
        .enumerate()
        .sorted_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(idx, _)| idx)
        .collect();
    Ok(CanonicalBlock {
        orbital_energies: energies.select(Axis(0), &order),
        orbitals: orbitals.select(Axis(1), &order),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::{random_matrix, random_overlap};
    use crate::utils::subspace_overlap_det;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn projected_fock_matrix_is_diagonal() {
        let mut rng = StdRng::seed_from_u64(21);
        let s: Array2<f64> = random_overlap(8, &mut rng);
        let h: Array2<f64> = random_matrix(8, 8, &mut rng);
        let f: Array2<f64> = &h + &h.t();
        let blocks: Vec<Array2<f64>> = vec![random_matrix(8, 4, &mut rng), random_matrix(8, 3, &mut rng)];
        let canonical: Vec<CanonicalBlock> = canonicalize(&blocks, f.view(), &CanonicalizationConfig::default()).unwrap();
        for (block, can) in blocks.iter().zip(canonical.iter()) {
            let f_mo: Array2<f64> = can.orbitals.t().dot(&f.dot(&can.orbitals));
            for i in 0..f_mo.nrows() {
                for j in 0..f_mo.ncols() {
                    if i != j {
                        assert!(f_mo[[i, j]].abs() < 1e-8);
                    }
                }
                assert!((f_mo[[i, i]] - can.orbital_energies[i]).abs() < 1e-8);
            }
            assert!(can
                .orbital_energies
                .windows(2)
                .into_iter()
                .all(|pair| pair[0] <= pair[1]));
            // same subspace as the input block, B^T S B_out is not singular
            let det: f64 = subspace_overlap_det(block.view(), can.orbitals.view(), s.view()).unwrap();
            assert!(det.abs() > 1e-10);
        }
    }

    #[test]
    fn serial_and_parallel_blocks_agree() {
        let mut rng = StdRng::seed_from_u64(31);
        let h: Array2<f64> = random_matrix(6, 6, &mut rng);
        let f: Array2<f64> = &h + &h.t();
        let blocks: Vec<Array2<f64>> = vec![
            random_matrix(6, 2, &mut rng),
            Array2::zeros((6, 0)),
            random_matrix(6, 3, &mut rng),
        ];
        let mut config: CanonicalizationConfig = CanonicalizationConfig::default();
        config.parallel = false;
        let serial: Vec<CanonicalBlock> = canonicalize(&blocks, f.view(), &config).unwrap();
        config.parallel = true;
        let parallel: Vec<CanonicalBlock> = canonicalize(&blocks, f.view(), &config).unwrap();
        assert_eq!(serial.len(), 3);
        for (a, b) in serial.iter().zip(parallel.iter()) {
            assert_eq!(a.orbital_energies, b.orbital_energies);
            assert_eq!(a.orbitals.dim(), b.orbitals.dim());
        }
        assert_eq!(serial[1].orbitals.dim(), (6, 0));
    }

    #[test]
    fn fock_matrix_must_match_ao_basis() {
        let f: Array2<f64> = Array2::eye(4);
        let blocks: Vec<Array2<f64>> = vec![Array2::zeros((5, 2))];
        assert!(matches!(
            canonicalize(&blocks, f.view(), &CanonicalizationConfig::default()),
            Err(OrbitalError::InvalidDimension(_))
        ));
    }
}
