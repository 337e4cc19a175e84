use ndarray::{prelude::*, Data};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

use crate::error::{check_dim, NumericalError, Result};
use crate::gaussian::log_density;
use crate::linalg::cholesky_lower;

/// Anything that can report the log density of a set of points, one value
/// per row. This is the capability the plotting helpers consume.
pub trait ScoreSamples {
    fn score_samples(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>;
}

/// Index of the first cumulative boundary that is `>= r`.
///
/// Rounding can leave the last boundary slightly below one, in which case the
/// last component is picked.
pub(crate) fn pick_component(cumulative: &[f64], r: f64) -> usize {
    cumulative
        .iter()
        .position(|&c| c >= r)
        .unwrap_or(cumulative.len() - 1)
}

pub(crate) fn cumulative_sum<S: Data<Elem = f64>>(weights: &ArrayBase<S, Ix1>) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

fn log_sum_exp(values: ArrayView1<f64>) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Parameters of a Gaussian mixture: one weight, mean and covariance per
/// component.
#[derive(Clone, Debug)]
pub struct GaussianMixture {
    weights: Array1<f64>,
    /// one mean per row
    means: Array2<f64>,
    covariances: Vec<Array2<f64>>,
}

impl GaussianMixture {
    pub fn new(
        weights: Array1<f64>,
        means: Array2<f64>,
        covariances: Vec<Array2<f64>>,
    ) -> Result<Self> {
        let k = weights.len();
        if k == 0 {
            return Err(NumericalError::InvalidParameter(
                "a mixture needs at least one component".into(),
            ));
        }
        check_dim("number of means", k, means.nrows())?;
        check_dim("number of covariances", k, covariances.len())?;
        let d = means.ncols();
        for cov in covariances.iter() {
            check_dim("covariance rows", d, cov.nrows())?;
            check_dim("covariance columns", d, cov.ncols())?;
        }
        if weights.iter().any(|w| !(*w >= 0.0)) {
            return Err(NumericalError::InvalidParameter(
                "mixture weights must be non-negative".into(),
            ));
        }
        let total = weights.sum();
        if (total - 1.0).abs() > 1e-8 {
            return Err(NumericalError::InvalidParameter(format!(
                "mixture weights sum to {total}, not 1"
            )));
        }

        Ok(Self {
            weights,
            means,
            covariances,
        })
    }

    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    pub fn dim(&self) -> usize {
        self.means.ncols()
    }

    pub fn weights(&self) -> ArrayView1<f64> {
        self.weights.view()
    }

    pub fn means(&self) -> ArrayView2<f64> {
        self.means.view()
    }

    pub fn covariances(&self) -> &[Array2<f64>] {
        &self.covariances
    }

    /// Draws `n` samples. Returns the samples and, for each of them, the
    /// index of the component it was drawn from.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<(Array2<f64>, Array1<usize>)> {
        let factors = self
            .covariances
            .iter()
            .map(|cov| cholesky_lower(cov))
            .collect::<Result<Vec<_>>>()?;
        let cumulative = cumulative_sum(&self.weights);

        let mut samples = Array2::zeros((n, self.dim()));
        let mut assignment = Array1::zeros(n);
        for (mut row, z) in samples.rows_mut().into_iter().zip(assignment.iter_mut()) {
            let r: f64 = rng.gen();
            let c = pick_component(&cumulative, r);
            *z = c;
            let noise = Array1::<f64>::random_using(self.dim(), StandardNormal, rng);
            row.assign(&(factors[c].dot(&noise) + self.means.row(c)));
        }
        log::trace!("drew {} samples from {} components", n, self.n_components());

        Ok((samples, assignment))
    }

    /// `ln w_k + ln N(x | mu_k, sigma_k)` for every row and component.
    fn weighted_log_densities<S: Data<Elem = f64>>(
        &self,
        x: &ArrayBase<S, Ix2>,
    ) -> Result<Array2<f64>> {
        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_components()));
        for (k, mut col) in out.columns_mut().into_iter().enumerate() {
            let ll = log_density(x, &self.means.row(k), &self.covariances[k])?;
            col.assign(&(ll + self.weights[k].ln()));
        }
        Ok(out)
    }

    /// Log-likelihood of each row of `x` under the mixture.
    pub fn score_samples<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Result<Array1<f64>> {
        let weighted = self.weighted_log_densities(x)?;
        Ok(weighted.rows().into_iter().map(log_sum_exp).collect())
    }

    /// Average log-likelihood of the rows of `x`.
    pub fn score<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Result<f64> {
        let ll = self.score_samples(x)?;
        ll.mean().ok_or_else(|| {
            NumericalError::InvalidParameter("cannot score an empty data matrix".into())
        })
    }

    /// Posterior probability of each component for each row of `x`; the
    /// result is N×K and every row sums to one.
    pub fn responsibilities<S: Data<Elem = f64>>(
        &self,
        x: &ArrayBase<S, Ix2>,
    ) -> Result<Array2<f64>> {
        let mut weighted = self.weighted_log_densities(x)?;
        for mut row in weighted.rows_mut() {
            let norm = log_sum_exp(row.view());
            row.mapv_inplace(|v| (v - norm).exp());
        }
        Ok(weighted)
    }
}

impl ScoreSamples for GaussianMixture {
    fn score_samples(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        GaussianMixture::score_samples(self, &x)
    }
}
