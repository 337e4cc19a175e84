//! Bridge between the `ndarray` types used throughout the crate and the
//! decompositions provided by `nalgebra`.

use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use ndarray::{prelude::*, Data};

use crate::error::{NumericalError, Result};

pub(crate) fn to_dmatrix<S: Data<Elem = f64>>(a: &ArrayBase<S, Ix2>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn check_square<S: Data<Elem = f64>>(a: &ArrayBase<S, Ix2>) -> Result<()> {
    crate::error::check_dim("square matrix columns", a.nrows(), a.ncols())
}

/// Inverse and log-determinant of a covariance matrix, both from one
/// Cholesky factorization. `log_det = 2·Σ ln L_ii` stays finite where the
/// determinant itself would overflow.
pub(crate) fn inverse_and_log_det<S: Data<Elem = f64>>(
    sigma: &ArrayBase<S, Ix2>,
) -> Result<(Array2<f64>, f64)> {
    check_square(sigma)?;
    let chol = Cholesky::new(to_dmatrix(sigma)).ok_or(NumericalError::NotPositiveDefinite)?;
    let log_det = 2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>();
    if !log_det.is_finite() {
        return Err(NumericalError::NotPositiveDefinite);
    }
    Ok((from_dmatrix(&chol.inverse()), log_det))
}

/// Lower triangular factor `L` with `L·Lᵗ = sigma`.
pub(crate) fn cholesky_lower<S: Data<Elem = f64>>(sigma: &ArrayBase<S, Ix2>) -> Result<Array2<f64>> {
    check_square(sigma)?;
    let chol = Cholesky::new(to_dmatrix(sigma)).ok_or(NumericalError::NotPositiveDefinite)?;
    Ok(from_dmatrix(&chol.l()))
}

/// Thin singular value decomposition `a = U·diag(s)·Vᵗ`, with the singular
/// values in non-increasing order.
pub(crate) fn thin_svd<S: Data<Elem = f64>>(
    a: &ArrayBase<S, Ix2>,
) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
    let svd = to_dmatrix(a)
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(NumericalError::Decomposition("svd"))?;
    let u = svd.u.as_ref().ok_or(NumericalError::Decomposition("svd"))?;
    let v_t = svd.v_t.as_ref().ok_or(NumericalError::Decomposition("svd"))?;

    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&i, &j| svd.singular_values[j].total_cmp(&svd.singular_values[i]));

    let u = from_dmatrix(u).select(Axis(1), &order);
    let v_t = from_dmatrix(v_t).select(Axis(0), &order);
    let s = order.iter().map(|&i| svd.singular_values[i]).collect();
    Ok((u, s, v_t))
}

/// Eigenvalues (ascending) and matching eigenvectors (as columns) of a
/// symmetric matrix.
pub(crate) fn symmetric_eigen<S: Data<Elem = f64>>(
    a: &ArrayBase<S, Ix2>,
) -> Result<(Array1<f64>, Array2<f64>)> {
    check_square(a)?;
    let eig = SymmetricEigen::new(to_dmatrix(a));
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let vectors = from_dmatrix(&eig.eigenvectors).select(Axis(1), &order);
    Ok((values, vectors))
}
