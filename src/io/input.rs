use crate::io::IoError;
use data_reader::reader::{load_txt_f64, Delimiter, ReaderParams};
use hashbrown::HashMap;
use log::{debug, info};
use ndarray::prelude::*;
use ndarray_npy::read_npy;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a dense matrix from a NumPy `.npy` file or from a whitespace separated text file
/// (`.dat`/`.txt`, lines starting with `%` are comments).
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<Array2<f64>, IoError> {
    let path: &Path = path.as_ref();
    match path.extension().and_then(OsStr::to_str) {
        Some("npy") => read_npy(path).map_err(|err| IoError::ReadNpy(path.to_path_buf(), err)),
        Some("dat") | Some("txt") => load_2d(path),
        _ => Err(IoError::UnknownFormat(path.to_path_buf())),
    }
}

fn load_2d(path: &Path) -> Result<Array2<f64>, IoError> {
    let params = ReaderParams {
        comments: Some(b'%'),
        delimiter: Delimiter::WhiteSpace,
        skip_header: None,
        skip_footer: None,
        usecols: None,
        max_rows: None,
    };
    let file: String = path.to_string_lossy().into_owned();
    let results = load_txt_f64(&file, &params)
        .map_err(|err| IoError::Text(path.to_path_buf(), err.to_string()))?;
    let shape: (usize, usize) = (results.num_lines, results.num_fields);
    Array2::from_shape_vec(shape, results.results)
        .map_err(|err| IoError::Text(path.to_path_buf(), err.to_string()))
}

/// Named dense matrices, e.g. the orbital blocks, the overlap and the Fock matrix.
#[derive(Clone, Debug, Default)]
pub struct MatrixBundle {
    matrices: HashMap<String, Array2<f64>>,
}

impl MatrixBundle {
    pub fn new() -> Self {
        MatrixBundle {
            matrices: HashMap::new(),
        }
    }

    /// Loads every `.npy`, `.dat` and `.txt` file of the directory. The file stem is used as
    /// the name of the matrix, so `S.npy` is available as `S`.
    pub fn from_directory<P: AsRef<Path>>(directory: P) -> Result<Self, IoError> {
        let mut bundle: MatrixBundle = MatrixBundle::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(directory.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(OsStr::to_str),
                    Some("npy") | Some("dat") | Some("txt")
                )
            })
            .collect();
        paths.sort();
        for path in paths.iter() {
            let name: String = match path.file_stem().and_then(OsStr::to_str) {
                Some(stem) => stem.to_owned(),
                None => continue,
            };
            let matrix: Array2<f64> = read_matrix(path)?;
            debug!("read {} with shape {:?} from {}", name, matrix.dim(), path.display());
            bundle.insert(name, matrix);
        }
        info!(
            "{: <25} {} matrices from {}",
            "input:",
            bundle.len(),
            directory.as_ref().display()
        );
        Ok(bundle)
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, matrix: Array2<f64>) {
        self.matrices.insert(name.into(), matrix);
    }

    pub fn get(&self, name: &str) -> Result<ArrayView2<f64>, IoError> {
        self.matrices
            .get(name)
            .map(|matrix| matrix.view())
            .ok_or_else(|| IoError::MissingMatrix(name.to_owned()))
    }

    /// Owned copies of the matrices with the given names, in that order.
    pub fn get_all(&self, names: &[String]) -> Result<Vec<Array2<f64>>, IoError> {
        names
            .iter()
            .map(|name| self.get(name).map(|matrix| matrix.to_owned()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

/// Reference partition that accompanies a set of input matrices. `frags` holds the AO indices
/// of every fragment, `init_fspace` the (alpha, beta) electron counts and `clusters` the
/// 1-based orbital indices of every fragment.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReferencePartition {
    #[serde(default)]
    pub frags: Vec<Vec<usize>>,
    #[serde(default)]
    pub init_fspace: Vec<(usize, usize)>,
    #[serde(default)]
    pub clusters: Vec<Vec<usize>>,
    /// Trace of |C_frag^T S C_act| of the orthogonalized fragments with the reference active
    /// space.
    #[serde(default)]
    pub active_space_trace: Option<f64>,
    /// Number of orbitals of [environment occupied, fragments..., environment virtual] of the
    /// DMET clustering.
    #[serde(default)]
    pub dmet_sizes: Vec<usize>,
}

impl ReferencePartition {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let content: String = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_matrix_is_reported() {
        let mut bundle: MatrixBundle = MatrixBundle::new();
        bundle.insert("S", Array2::eye(2));
        assert!(bundle.contains("S"));
        assert_eq!(bundle.get("S").unwrap().dim(), (2, 2));
        match bundle.get("F") {
            Err(IoError::MissingMatrix(name)) => assert_eq!(name, "F"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reference_from_json() {
        let json: &str = r#"{"frags": [[0, 1], [2]], "init_fspace": [[3, 2]], "clusters": [[1, 2, 3]]}"#;
        let reference: ReferencePartition = serde_json::from_str(json).unwrap();
        assert_eq!(reference.frags, vec![vec![0, 1], vec![2]]);
        assert_eq!(reference.init_fspace, vec![(3, 2)]);
        assert_eq!(reference.clusters, vec![vec![1, 2, 3]]);
        assert!(reference.dmet_sizes.is_empty());
        assert_eq!(reference.active_space_trace, None);
    }

    #[test]
    fn unknown_extension() {
        assert!(matches!(
            read_matrix("orbitals.csv"),
            Err(IoError::UnknownFormat(_))
        ));
    }
}
