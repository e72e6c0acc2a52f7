//! Partitioning of molecular orbitals into fragment and environment subspaces.
//!
//! The orbitals of one or more blocks (e.g. doubly occupied, singly occupied and virtual
//! orbitals) are rotated within each block such that they are ordered by their overlap with a
//! fragment projector. The orbitals with the largest overlap across all blocks form the
//! fragment, the rest the environment. The fragment orbitals can be orthogonalized
//! symmetrically, canonicalized with a Fock matrix and split into core, active and virtual
//! orbitals.
pub mod canonicalization;
pub mod defaults;
pub mod embedding;
pub mod error;
pub mod frontier;
pub mod io;
pub mod orthogonalization;
pub mod partitioning;
pub mod projector;
pub mod utils;

pub use canonicalization::{canonicalize, CanonicalBlock};
pub use embedding::{dmet_clustering, fragment_active_space, ActiveSpace, DmetClusters};
pub use error::OrbitalError;
pub use frontier::{extract_frontier_orbitals, FrontierDims, FrontierOrbitals};
pub use orthogonalization::sym_ortho;
pub use partitioning::{
    partition_top_orbitals, partition_with_projector, svd_subspace_partitioning,
    RankedSingularValue, SubspacePartition, TieBreak,
};
pub use projector::{lowdin_ao_projector, metric_projector, FragmentProjector};
