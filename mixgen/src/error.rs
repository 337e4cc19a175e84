use thiserror::Error;

/// Failures of the numerical routines. Nothing is recovered locally: every
/// variant surfaces at the call that produced it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericalError {
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("matrix is singular or not positive definite")]
    NotPositiveDefinite,

    #[error("{0} decomposition failed")]
    Decomposition(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, NumericalError>;

/// Checks that `got == expected`, naming the offending quantity otherwise.
pub(crate) fn check_dim(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(NumericalError::DimensionMismatch {
            what,
            expected,
            got,
        })
    }
}

#[cfg(feature = "pyo3")]
impl From<NumericalError> for pyo3::PyErr {
    fn from(err: NumericalError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
