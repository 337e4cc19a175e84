//! Synthetic data drawn from randomly parameterized Gaussian mixtures.

use ndarray::prelude::*;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;

use crate::error::{NumericalError, Result};
use crate::mixture::GaussianMixture;

/// Random symmetric positive definite `dim`×`dim` matrix `A·Aᵗ + dim·I`,
/// where `A` has independent standard normal entries.
pub fn generate_random_covariance<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Array2<f64> {
    let a = Array2::<f64>::random_using((dim, dim), StandardNormal, rng);
    a.dot(&a.t()) + Array2::<f64>::eye(dim) * dim as f64
}

/// Data drawn by [`generate_mixture_sample`], together with the ground truth
/// that produced it.
#[derive(Clone, Debug)]
pub struct MixtureSample {
    pub data: Array2<f64>,
    /// component index of each row of `data`
    pub assignment: Array1<usize>,
    pub mixture: GaussianMixture,
}

/// Draws `num_samples` points of dimension `dim` from a mixture of
/// `num_components` Gaussians whose parameters are themselves random:
/// uniform weights (normalized), means uniform in `[0, 2)` and covariances
/// from [`generate_random_covariance`].
pub fn generate_mixture_sample<R: Rng + ?Sized>(
    dim: usize,
    num_components: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<MixtureSample> {
    if num_components == 0 {
        return Err(NumericalError::InvalidParameter(
            "at least one mixture component is required".into(),
        ));
    }
    log::debug!(
        "generating {} samples from a {}-component mixture in {} dimensions",
        num_samples,
        num_components,
        dim
    );

    let weights = Array1::<f64>::random_using(num_components, Uniform::new(0.0, 1.0), rng);
    let weights = &weights / weights.sum();

    let mut covariances = Vec::with_capacity(num_components);
    for _ in 0..num_components {
        covariances.push(generate_random_covariance(dim, rng));
    }
    let means = Array2::<f64>::random_using((num_components, dim), Uniform::new(0.0, 1.0), rng) * 2.0;

    let mixture = GaussianMixture::new(weights, means, covariances)?;
    let (data, assignment) = mixture.sample(num_samples, rng)?;

    Ok(MixtureSample {
        data,
        assignment,
        mixture,
    })
}

/// Same draws as [`generate_mixture_sample`], returning only the
/// `num_samples`×`dim` data matrix.
pub fn generate_mixture_data<R: Rng + ?Sized>(
    dim: usize,
    num_components: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<Array2<f64>> {
    generate_mixture_sample(dim, num_components, num_samples, rng).map(|sample| sample.data)
}
