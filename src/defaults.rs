// config file
pub const CONFIG_FILE_NAME: &str = "orbpart.toml";
// name of the optional file with the reference partition inside an input directory
pub const REFERENCE_FILE_NAME: &str = "reference.json";
// name of the summary file that is written to the output directory
pub const SUMMARY_FILE_NAME: &str = "summary.json";

// the env. variable that points to the root directory of the source code. This is only
// needed for the regression tests that read the reference data
pub const SOURCE_DIR_VARIABLE: &str = "ORBPART_SRC_DIR";

// PROJECTOR
// the overlap of the projector columns (Pv^T S Pv) is regarded as singular if the ratio
// of its smallest and largest eigenvalue drops below this value
pub const PROJECTOR_SINGULARITY_TOL: f64 = 1.0e-12;

// SVD PARTITIONING
// singular values of environment orbitals above this threshold are reported, since they
// indicate an overlap with the fragment that was cut off by the fragment size
pub const SINGULAR_VALUE_PRINT_THRESHOLD: f64 = 1.0e-6;
// the per-block SVDs are distributed over the rayon thread pool
pub const PARALLEL_BLOCKS: bool = false;

// ORTHOGONALIZATION
// the MO overlap matrix is regarded as singular (linearly dependent orbitals) if the ratio of
// its smallest and largest eigenvalue drops below this value
pub const ORTHOGONALIZATION_SINGULARITY_TOL: f64 = 1.0e-10;
// threshold for the deviation of C^T S C from the unit matrix
pub const ORTHONORMALITY_TOL: f64 = 1.0e-8;

// CANONICALIZATION
// the orbitals of each block are sorted by their orbital energies in ascending order
pub const SORT_ORBITAL_ENERGIES: bool = true;

// EMBEDDING
// additionally build DMET clusters from the first (occupied) and the last (virtual) block
pub const DMET_CLUSTERING: bool = false;
