//! Missing values are represented as `NaN` entries of the data matrix.

use ndarray::{prelude::*, Data};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Bernoulli;
use ndarray_rand::RandomExt;

use crate::error::{check_dim, NumericalError, Result};

/// Mask of the given shape where each entry is `true` (missing) with
/// probability `fraction`.
pub fn random_missing_mask<R: Rng + ?Sized>(
    shape: (usize, usize),
    fraction: f64,
    rng: &mut R,
) -> Result<Array2<bool>> {
    let dist = Bernoulli::new(fraction).map_err(|_| {
        NumericalError::InvalidParameter(format!("missing fraction {fraction} not in [0, 1]"))
    })?;
    Ok(Array2::random_using(shape, dist, rng))
}

/// Copy of `x` with the entries selected by `mask` replaced by `NaN`.
pub fn apply_missing<S1, S2>(x: &ArrayBase<S1, Ix2>, mask: &ArrayBase<S2, Ix2>) -> Result<Array2<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = bool>,
{
    check_dim("mask rows", x.nrows(), mask.nrows())?;
    check_dim("mask columns", x.ncols(), mask.ncols())?;
    let mut out = x.to_owned();
    out.zip_mut_with(mask, |v, &missing| {
        if missing {
            *v = f64::NAN;
        }
    });
    Ok(out)
}

/// For each row of `x`, whether any of its entries is missing.
pub fn missing_rows<S: Data<Elem = f64>>(x: &ArrayBase<S, Ix2>) -> Array1<bool> {
    x.rows()
        .into_iter()
        .map(|row| row.iter().any(|v| v.is_nan()))
        .collect()
}
