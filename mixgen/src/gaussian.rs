use std::f64::consts::PI;

use ndarray::{prelude::*, Data};

use crate::error::{check_dim, Result};
use crate::linalg::inverse_and_log_det;

fn check_shapes<S1, S2, S3>(
    x: &ArrayBase<S1, Ix2>,
    mu: &ArrayBase<S2, Ix1>,
    sigma: &ArrayBase<S3, Ix2>,
) -> Result<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    let d = x.ncols();
    check_dim("mean length", d, mu.len())?;
    check_dim("covariance rows", d, sigma.nrows())?;
    check_dim("covariance columns", d, sigma.ncols())
}

/// Log density of the multivariate normal `N(mu, sigma)` at each row of `x`.
///
/// The inverse and the log-determinant of `sigma` are computed once and
/// shared by all rows. The Mahalanobis term is evaluated as the row sums of
/// `(dev · sigma⁻¹) ∘ dev`, which never forms an N×N product.
pub fn log_density<S1, S2, S3>(
    x: &ArrayBase<S1, Ix2>,
    mu: &ArrayBase<S2, Ix1>,
    sigma: &ArrayBase<S3, Ix2>,
) -> Result<Array1<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    check_shapes(x, mu, sigma)?;
    let d = x.ncols() as f64;
    let (sigma_inv, log_det) = inverse_and_log_det(sigma)?;

    let dev = x - mu;
    let maha = (dev.dot(&sigma_inv) * &dev).sum_axis(Axis(1));

    let norm = d * (2.0 * PI).ln() + log_det;
    Ok(maha.mapv_into(|m| -0.5 * (norm + m)))
}

/// Density of the multivariate normal `N(mu, sigma)` at each row of `x`.
pub fn density<S1, S2, S3>(
    x: &ArrayBase<S1, Ix2>,
    mu: &ArrayBase<S2, Ix1>,
    sigma: &ArrayBase<S3, Ix2>,
) -> Result<Array1<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    Ok(log_density(x, mu, sigma)?.mapv_into(f64::exp))
}

/// Like [`log_density`], but `NaN` entries of `x` are treated as missing and
/// each row is scored under the marginal of its observed coordinates.
///
/// A row without observed coordinates has log density zero.
pub fn log_density_observed<S1, S2, S3>(
    x: &ArrayBase<S1, Ix2>,
    mu: &ArrayBase<S2, Ix1>,
    sigma: &ArrayBase<S3, Ix2>,
) -> Result<Array1<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    check_shapes(x, mu, sigma)?;

    let complete: Vec<usize> = x
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|v| !v.is_nan()))
        .map(|(i, _)| i)
        .collect();

    let mut out = Array1::zeros(x.nrows());

    // Complete rows share one factorization of the full covariance.
    if !complete.is_empty() {
        let full = log_density(&x.select(Axis(0), &complete), mu, sigma)?;
        for (&i, ll) in complete.iter().zip(full.iter()) {
            out[i] = *ll;
        }
    }

    for (i, row) in x.rows().into_iter().enumerate() {
        let observed: Vec<usize> = (0..row.len()).filter(|&j| !row[j].is_nan()).collect();
        if observed.is_empty() || observed.len() == row.len() {
            continue;
        }
        let x_o = row.select(Axis(0), &observed).insert_axis(Axis(0));
        let mu_o = mu.select(Axis(0), &observed);
        let sigma_o = sigma
            .select(Axis(0), &observed)
            .select(Axis(1), &observed);
        out[i] = log_density(&x_o, &mu_o, &sigma_o)?[0];
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use ndarray::prelude::*;

    use super::*;
    use crate::error::NumericalError;
    use crate::test::{random_spd, seeded_rng};

    #[test]
    fn test_standard_normal_at_origin() {
        let p = density(&array![[0.0]], &array![0.0], &array![[1.0]]).unwrap();
        assert_abs_diff_eq!(p[0], 0.3989422804, epsilon = 1e-10);
    }

    #[test]
    fn test_density_is_exp_of_log_density() {
        let mut rng = seeded_rng(7);
        let sigma = random_spd(4, &mut rng);
        let mu = array![0.5, -1.0, 2.0, 0.0];
        let x = crate::test::standard_normal((25, 4), &mut rng);

        let ll = log_density(&x, &mu, &sigma).unwrap();
        let p = density(&x, &mu, &sigma).unwrap();
        for (a, b) in ll.iter().zip(p.iter()) {
            assert_abs_diff_eq!(a.exp(), *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_at_mean_only_normalizer_remains() {
        let sigma = array![[2.0, 0.3, 0.0], [0.3, 1.0, 0.1], [0.0, 0.1, 0.5]];
        let mu = array![1.0, 2.0, 3.0];
        let x = mu.clone().insert_axis(Axis(0));
        let (_, log_det) = crate::linalg::inverse_and_log_det(&sigma).unwrap();

        let ll = log_density(&x, &mu, &sigma).unwrap();
        assert_abs_diff_eq!(
            ll[0],
            -0.5 * (3.0 * (2.0 * PI).ln() + log_det),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_univariate_formula() {
        let (m, var) = (1.5, 2.5);
        let xs = array![[-1.0], [0.0], [1.5], [4.0]];
        let ll = log_density(&xs, &array![m], &array![[var]]).unwrap();
        for (x, got) in xs.column(0).iter().zip(ll.iter()) {
            let expected = -0.5 * (2.0 * PI * var).ln() - (x - m).powi(2) / (2.0 * var);
            assert_abs_diff_eq!(*got, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_diagonal_factorizes() {
        let sigma = array![[1.0, 0.0], [0.0, 4.0]];
        let mu = array![0.0, 1.0];
        let x = array![[0.3, -0.2], [1.0, 3.0]];
        let joint = log_density(&x, &mu, &sigma).unwrap();
        for (i, row) in x.rows().into_iter().enumerate() {
            let a = log_density(&array![[row[0]]], &array![0.0], &array![[1.0]]).unwrap()[0];
            let b = log_density(&array![[row[1]]], &array![1.0], &array![[4.0]]).unwrap()[0];
            assert_abs_diff_eq!(joint[i], a + b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_covariance_fails() {
        let sigma = array![[1.0, 1.0], [1.0, 1.0]];
        let err = log_density(&array![[0.0, 0.0]], &array![0.0, 0.0], &sigma).unwrap_err();
        assert_eq!(err, NumericalError::NotPositiveDefinite);
    }

    #[test]
    fn test_indefinite_covariance_fails() {
        // both have a positive determinant
        let x = array![[0.0, 0.0]];
        let mu = array![0.0, 0.0];
        let err = log_density(&x, &mu, &-Array2::<f64>::eye(2)).unwrap_err();
        assert_eq!(err, NumericalError::NotPositiveDefinite);
        let err = density(&x, &mu, &array![[-2.0, 0.5], [0.5, -1.0]]).unwrap_err();
        assert_eq!(err, NumericalError::NotPositiveDefinite);
    }

    #[test]
    fn test_high_dimensional_generated_covariance() {
        let dim = 160;
        let mut rng = seeded_rng(12);
        let sigma = crate::sampler::generate_random_covariance(dim, &mut rng);
        let mu = Array1::<f64>::zeros(dim);
        let x = crate::test::standard_normal((4, dim), &mut rng);

        let ll = log_density(&x, &mu, &sigma).unwrap();
        assert!(ll.iter().all(|v| v.is_finite()), "{ll}");

        // every eigenvalue is at least dim, which bounds the log determinant
        let at_mean = log_density(&mu.clone().insert_axis(Axis(0)), &mu, &sigma).unwrap()[0];
        assert!(at_mean <= -0.5 * dim as f64 * ((2.0 * PI).ln() + (dim as f64).ln()));
        assert!(ll.iter().all(|&v| v <= at_mean));
    }

    #[test]
    fn test_small_variances_in_high_dimension() {
        let dim = 400;
        let sigma = Array2::<f64>::eye(dim) * 0.1;
        let mu = Array1::<f64>::zeros(dim);
        let ll = log_density(&mu.clone().insert_axis(Axis(0)), &mu, &sigma).unwrap();
        let expected = -0.5 * dim as f64 * ((2.0 * PI).ln() + 0.1f64.ln());
        assert_abs_diff_eq!(ll[0], expected, epsilon = 1e-8);
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let err = log_density(&array![[0.0, 0.0]], &array![0.0], &array![[1.0]]).unwrap_err();
        assert!(matches!(err, NumericalError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_observed_matches_full_without_missing() {
        let mut rng = seeded_rng(3);
        let sigma = random_spd(3, &mut rng);
        let mu = array![0.0, 1.0, -1.0];
        let x = crate::test::standard_normal((10, 3), &mut rng);
        let full = log_density(&x, &mu, &sigma).unwrap();
        let observed = log_density_observed(&x, &mu, &sigma).unwrap();
        for (a, b) in full.iter().zip(observed.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_observed_marginalizes_missing() {
        let sigma = array![[2.0, 0.5], [0.5, 1.0]];
        let mu = array![1.0, -1.0];
        let x = array![[0.5, f64::NAN], [f64::NAN, f64::NAN], [f64::NAN, 0.0]];
        let ll = log_density_observed(&x, &mu, &sigma).unwrap();

        let first = log_density(&array![[0.5]], &array![1.0], &array![[2.0]]).unwrap()[0];
        let last = log_density(&array![[0.0]], &array![-1.0], &array![[1.0]]).unwrap()[0];
        assert_abs_diff_eq!(ll[0], first, epsilon = 1e-12);
        assert_eq!(ll[1], 0.0);
        assert_abs_diff_eq!(ll[2], last, epsilon = 1e-12);
    }
}
