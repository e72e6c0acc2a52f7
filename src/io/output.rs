use crate::frontier::FrontierDims;
use crate::io::IoError;
use log::info;
use ndarray::prelude::*;
use ndarray_npy::write_npy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of the partitioning of one fragment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FragmentSummary {
    pub name: String,
    /// Number of fragment orbitals from each orbital block.
    pub block_sizes: Vec<usize>,
    /// Singular values of the fragment orbitals.
    pub singular_values: Vec<f64>,
    /// Singular values of environment orbitals that still overlap with the fragment.
    pub leaked_singular_values: Vec<f64>,
    #[serde(default)]
    pub orbital_energies: Option<Vec<f64>>,
    #[serde(default)]
    pub frontier: Option<FrontierDims>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Summary {
    pub fragments: Vec<FragmentSummary>,
    pub init_fspace: Vec<(usize, usize)>,
    pub clusters: Vec<Vec<usize>>,
}

/// Writes the blocks to `<directory>/<prefix>_<index>.npy`.
pub fn write_blocks<P: AsRef<Path>>(
    directory: P,
    prefix: &str,
    blocks: &[Array2<f64>],
) -> Result<(), IoError> {
    fs::create_dir_all(directory.as_ref())?;
    for (idx, block) in blocks.iter().enumerate() {
        let path: PathBuf = directory.as_ref().join(format!("{}_{}.npy", prefix, idx));
        write_npy(&path, block).map_err(|err| IoError::WriteNpy(path.clone(), err))?;
    }
    Ok(())
}

pub fn write_summary<P: AsRef<Path>>(path: P, summary: &Summary) -> Result<(), IoError> {
    let json: String = serde_json::to_string_pretty(summary)?;
    fs::write(path.as_ref(), json)?;
    info!("{: <25} {}", "summary written to:", path.as_ref().display());
    Ok(())
}
