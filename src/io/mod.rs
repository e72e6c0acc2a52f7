mod imprint;
mod input;
mod output;
pub(crate) mod settings;

pub use imprint::write_header;
pub use input::{read_matrix, MatrixBundle, ReferencePartition};
pub use output::{write_blocks, write_summary, FragmentSummary, Summary};
pub use settings::{
    AoBasis, CanonicalizationConfig, Configuration, FragmentConfig, OrthogonalizationConfig,
    PartitionConfig,
};

use std::fmt;
use std::path::PathBuf;

/// Errors while reading or writing matrices, configuration and result files.
#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    ReadNpy(PathBuf, ndarray_npy::ReadNpyError),
    WriteNpy(PathBuf, ndarray_npy::WriteNpyError),
    /// A text matrix could not be parsed.
    Text(PathBuf, String),
    Json(serde_json::Error),
    TomlRead(toml::de::Error),
    TomlWrite(toml::ser::Error),
    /// A matrix that is referenced by name is not contained in the input bundle.
    MissingMatrix(String),
    UnknownFormat(PathBuf),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Io(err) => write!(f, "I/O error: {}", err),
            IoError::ReadNpy(path, err) => {
                write!(f, "could not read {}: {}", path.display(), err)
            }
            IoError::WriteNpy(path, err) => {
                write!(f, "could not write {}: {}", path.display(), err)
            }
            IoError::Text(path, message) => {
                write!(f, "could not parse {}: {}", path.display(), message)
            }
            IoError::Json(err) => write!(f, "invalid JSON: {}", err),
            IoError::TomlRead(err) => write!(f, "invalid configuration: {}", err),
            IoError::TomlWrite(err) => write!(f, "could not serialize configuration: {}", err),
            IoError::MissingMatrix(name) => {
                write!(f, "the matrix '{}' is not part of the input", name)
            }
            IoError::UnknownFormat(path) => write!(
                f,
                "unknown matrix format of {}, expected .npy or .dat",
                path.display()
            ),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Io(err) => Some(err),
            IoError::ReadNpy(_, err) => Some(err),
            IoError::WriteNpy(_, err) => Some(err),
            IoError::Json(err) => Some(err),
            IoError::TomlRead(err) => Some(err),
            IoError::TomlWrite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(err: serde_json::Error) -> Self {
        IoError::Json(err)
    }
}

impl From<toml::de::Error> for IoError {
    fn from(err: toml::de::Error) -> Self {
        IoError::TomlRead(err)
    }
}

impl From<toml::ser::Error> for IoError {
    fn from(err: toml::ser::Error) -> Self {
        IoError::TomlWrite(err)
    }
}
