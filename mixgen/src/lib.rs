pub mod covariance;
pub mod error;
pub mod gaussian;
mod linalg;
pub mod lowrank;
pub mod missing;
pub mod mixture;
pub mod plot;
pub mod sampler;

pub use error::{NumericalError, Result};
pub use gaussian::{density, log_density, log_density_observed};
pub use lowrank::{generate_low_rank_data, LowRankData};
pub use mixture::{GaussianMixture, ScoreSamples};
pub use sampler::{
    generate_mixture_data, generate_mixture_sample, generate_random_covariance, MixtureSample,
};
