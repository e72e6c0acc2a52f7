use crate::defaults::*;
use crate::frontier::FrontierDims;
use crate::io::IoError;
use crate::partitioning::TieBreak;
use crate::io::MatrixBundle;
use crate::projector::FragmentProjector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_verbose() -> i8 {
    0
}
fn default_orbital_blocks() -> Vec<String> {
    vec![
        String::from("Cdocc"),
        String::from("Csing"),
        String::from("Cvirt"),
    ]
}
fn default_overlap() -> String {
    String::from("S")
}
fn default_projector_singularity_tol() -> f64 {
    PROJECTOR_SINGULARITY_TOL
}
fn default_print_threshold() -> f64 {
    SINGULAR_VALUE_PRINT_THRESHOLD
}
fn default_parallel_blocks() -> bool {
    PARALLEL_BLOCKS
}
fn default_orthogonalization_singularity_tol() -> f64 {
    ORTHOGONALIZATION_SINGULARITY_TOL
}
fn default_orthonormality_tol() -> f64 {
    ORTHONORMALITY_TOL
}
fn default_sort_orbital_energies() -> bool {
    SORT_ORBITAL_ENERGIES
}
fn default_dmet() -> bool {
    DMET_CLUSTERING
}
fn default_ao_basis() -> AoBasis {
    AoBasis::Lowdin
}

/// Settings of a partitioning run. Every field has a default value, so that an empty file is
/// a valid configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Configuration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    /// Names of the orbital blocks in the input bundle, e.g. [docc, socc, virt].
    #[serde(default = "default_orbital_blocks")]
    pub orbital_blocks: Vec<String>,
    /// Name of the AO overlap matrix in the input bundle.
    #[serde(default = "default_overlap")]
    pub overlap: String,
    /// Name of the Fock matrix in the input bundle. Without a Fock matrix the fragment
    /// orbitals are neither canonicalized nor split into core, active and virtual orbitals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fock: Option<String>,
    /// DMET clustering of the first (occupied) and the last (virtual) orbital block.
    #[serde(default = "default_dmet")]
    pub dmet: bool,
    #[serde(default)]
    pub partitioning: PartitionConfig,
    #[serde(default)]
    pub orthogonalization: OrthogonalizationConfig,
    #[serde(default)]
    pub canonicalization: CanonicalizationConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<FragmentConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            verbose: default_verbose(),
            orbital_blocks: default_orbital_blocks(),
            overlap: default_overlap(),
            fock: None,
            partitioning: PartitionConfig::default(),
            orthogonalization: OrthogonalizationConfig::default(),
            canonicalization: CanonicalizationConfig::default(),
            dmet: default_dmet(),
            fragments: Vec::new(),
        }
    }
}

impl Configuration {
    /// Reads the configuration file. If it does not exist, the default settings are used and
    /// written to the file so that the user can see all options.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let config_file_path: &Path = path.as_ref();
        let config_string: String = if config_file_path.exists() {
            fs::read_to_string(config_file_path)?
        } else {
            String::from("")
        };
        let config: Self = toml::from_str(&config_string)?;
        if !config_file_path.exists() {
            fs::write(config_file_path, toml::to_string(&config)?)?;
        }
        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PartitionConfig {
    /// Smallest accepted ratio of the eigenvalues of the projector overlap Pv^T S Pv.
    #[serde(default = "default_projector_singularity_tol")]
    pub singularity_tol: f64,
    /// Environment singular values above this value are reported.
    #[serde(default = "default_print_threshold")]
    pub print_threshold: f64,
    #[serde(default)]
    pub tie_break: TieBreak,
    #[serde(default = "default_parallel_blocks")]
    pub parallel: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            singularity_tol: default_projector_singularity_tol(),
            print_threshold: default_print_threshold(),
            tie_break: TieBreak::default(),
            parallel: default_parallel_blocks(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrthogonalizationConfig {
    #[serde(default = "default_orthogonalization_singularity_tol")]
    pub singularity_tol: f64,
    /// Largest accepted deviation of C^T S C from the unit matrix of the final orbitals.
    #[serde(default = "default_orthonormality_tol")]
    pub orthonormality_tol: f64,
}

impl Default for OrthogonalizationConfig {
    fn default() -> Self {
        OrthogonalizationConfig {
            singularity_tol: default_orthogonalization_singularity_tol(),
            orthonormality_tol: default_orthonormality_tol(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CanonicalizationConfig {
    #[serde(default = "default_sort_orbital_energies")]
    pub sort_orbital_energies: bool,
    #[serde(default = "default_parallel_blocks")]
    pub parallel: bool,
}

impl Default for CanonicalizationConfig {
    fn default() -> Self {
        CanonicalizationConfig {
            sort_orbital_energies: default_sort_orbital_energies(),
            parallel: default_parallel_blocks(),
        }
    }
}

/// Basis of the AO indices of a fragment.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AoBasis {
    Lowdin,
    NonOrthogonal,
}

/// Definition of one fragment. Either `projector` names a projector matrix Pv[AO, frag] in the
/// input bundle, or the fragment is given by the AO indices in `ao_indices`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FragmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projector: Option<String>,
    #[serde(default)]
    pub ao_indices: Vec<usize>,
    #[serde(default = "default_ao_basis")]
    pub ao_basis: AoBasis,
    /// Number of (core, active, virtual) orbitals of the canonicalized fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontier: Option<[usize; 3]>,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        FragmentConfig {
            name: None,
            projector: None,
            ao_indices: Vec::new(),
            ao_basis: default_ao_basis(),
            frontier: None,
        }
    }
}

impl FragmentConfig {
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("frag{}", index),
        }
    }

    /// The [FragmentProjector] of this fragment, projector matrices are taken from `bundle`.
    pub fn projector(&self, bundle: &MatrixBundle) -> Result<FragmentProjector, IoError> {
        match &self.projector {
            Some(name) => Ok(FragmentProjector::Matrix(bundle.get(name)?.to_owned())),
            None => match self.ao_basis {
                AoBasis::Lowdin => Ok(FragmentProjector::LowdinAtomic(self.ao_indices.clone())),
                AoBasis::NonOrthogonal => Ok(FragmentProjector::NonOrthogonalAtomic(
                    self.ao_indices.clone(),
                )),
            },
        }
    }

    pub fn frontier_dims(&self) -> Option<FrontierDims> {
        self.frontier
            .map(|dims| FrontierDims::new(dims[0], dims[1], dims[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Configuration = toml::from_str("").unwrap();
        assert_eq!(config.orbital_blocks, default_orbital_blocks());
        assert_eq!(config.partitioning.tie_break, TieBreak::BlockOrder);
        assert_eq!(
            config.partitioning.print_threshold,
            SINGULAR_VALUE_PRINT_THRESHOLD
        );
        assert!(config.fragments.is_empty());
        // the default configuration can be written back
        assert!(toml::to_string(&config).is_ok());
    }

    #[test]
    fn fragments_are_read() {
        let input: &str = r#"
            fock = "F"

            [partitioning]
            tie_break = "reverse_block_order"

            [[fragments]]
            name = "Cr1"
            ao_indices = [0, 1, 2]
            frontier = [1, 1, 1]

            [[fragments]]
            projector = "Pf_1"
        "#;
        let config: Configuration = toml::from_str(input).unwrap();
        assert_eq!(config.fock.as_deref(), Some("F"));
        assert_eq!(config.partitioning.tie_break, TieBreak::ReverseBlockOrder);
        assert_eq!(config.fragments.len(), 2);
        assert_eq!(config.fragments[0].label(0), "Cr1");
        assert_eq!(config.fragments[1].label(1), "frag1");
        assert_eq!(config.fragments[0].ao_basis, AoBasis::Lowdin);
        assert_eq!(
            config.fragments[0].frontier_dims(),
            Some(FrontierDims::new(1, 1, 1))
        );
        assert_eq!(config.fragments[1].projector.as_deref(), Some("Pf_1"));
    }
}
