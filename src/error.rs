use ndarray_linalg::error::LinalgError;
use std::fmt;

/// Errors of the orbital subspace routines. All of them describe violated preconditions of a
/// deterministic numerical computation, a failing call is never retried and never returns
/// partial results.
#[derive(Debug)]
pub enum OrbitalError {
    /// Row count mismatch between matrices that should share the AO basis, a fragment that
    /// asks for more orbitals than available, or dimension triples that do not sum up to the
    /// number of orbitals of a block.
    InvalidDimension(String),
    /// Inversion or inverse square root of a matrix that is singular or too ill-conditioned.
    NumericalSingularity(String),
    /// The LAPACK backend reported an error.
    Linalg(LinalgError),
}

impl OrbitalError {
    pub fn dimension<S: Into<String>>(message: S) -> Self {
        OrbitalError::InvalidDimension(message.into())
    }

    pub fn singularity<S: Into<String>>(message: S) -> Self {
        OrbitalError::NumericalSingularity(message.into())
    }
}

impl fmt::Display for OrbitalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitalError::InvalidDimension(message) => write!(f, "Invalid dimension: {}", message),
            OrbitalError::NumericalSingularity(message) => {
                write!(f, "Numerical singularity: {}", message)
            }
            OrbitalError::Linalg(err) => write!(f, "Linear algebra backend failed: {}", err),
        }
    }
}

impl std::error::Error for OrbitalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrbitalError::Linalg(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LinalgError> for OrbitalError {
    fn from(err: LinalgError) -> Self {
        OrbitalError::Linalg(err)
    }
}
