//! Covariance structures used by the members of the mixture model family:
//! spherical and diagonal Gaussians, mixtures of probabilistic PCA and
//! mixtures of factor analysers.

use ndarray::{prelude::*, Data};

use crate::error::{check_dim, NumericalError, Result};

fn check_variances<'a, I: IntoIterator<Item = &'a f64>>(variances: I) -> Result<()> {
    for &v in variances {
        if !(v > 0.0) {
            return Err(NumericalError::InvalidParameter(format!(
                "variances must be positive, got {v}"
            )));
        }
    }
    Ok(())
}

/// `variance · I`
pub fn spherical(dim: usize, variance: f64) -> Result<Array2<f64>> {
    check_variances([variance].iter())?;
    Ok(Array2::<f64>::eye(dim) * variance)
}

/// Diagonal matrix with the given variances.
pub fn diagonal<S: Data<Elem = f64>>(variances: &ArrayBase<S, Ix1>) -> Result<Array2<f64>> {
    check_variances(variances.iter())?;
    Ok(Array2::from_diag(variances))
}

/// `W·Wᵗ + sigma_sq·I`, with `w` of shape `dim`×`latent_dim`.
pub fn ppca<S: Data<Elem = f64>>(w: &ArrayBase<S, Ix2>, sigma_sq: f64) -> Result<Array2<f64>> {
    check_variances([sigma_sq].iter())?;
    Ok(w.dot(&w.t()) + Array2::<f64>::eye(w.nrows()) * sigma_sq)
}

/// `W·Wᵗ + diag(psi)`, with `w` of shape `dim`×`latent_dim` and one noise
/// variance per dimension in `psi`.
pub fn factor_analysis<S1, S2>(w: &ArrayBase<S1, Ix2>, psi: &ArrayBase<S2, Ix1>) -> Result<Array2<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    check_dim("noise variances", w.nrows(), psi.len())?;
    Ok(w.dot(&w.t()) + diagonal(psi)?)
}

/// Whether `m` is square and equal to its transpose within `tol`.
pub fn is_symmetric<S: Data<Elem = f64>>(m: &ArrayBase<S, Ix2>, tol: f64) -> bool {
    m.is_square()
        && m.indexed_iter()
            .all(|((i, j), v)| (v - m[[j, i]]).abs() <= tol)
}
