use mixgen::plot::ErrorEllipse;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{thread_rng, RngCore, SeedableRng};
use numpy::*;
use pyo3::prelude::*;

/// Seeded stream when a seed is given, the thread local generator otherwise.
fn make_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(thread_rng()),
    }
}

#[pyfunction]
fn log_density<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<'py, f64>,
    mu: PyReadonlyArray1<'py, f64>,
    sigma: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let ll = mixgen::log_density(&x.as_array(), &mu.as_array(), &sigma.as_array())?;
    Ok(ll.into_pyarray_bound(py))
}

#[pyfunction]
fn density<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<'py, f64>,
    mu: PyReadonlyArray1<'py, f64>,
    sigma: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let p = mixgen::density(&x.as_array(), &mu.as_array(), &sigma.as_array())?;
    Ok(p.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(signature = (dim, seed=None))]
fn generate_random_covariance(
    py: Python<'_>,
    dim: usize,
    seed: Option<u64>,
) -> Bound<'_, PyArray2<f64>> {
    let mut rng = make_rng(seed);
    mixgen::generate_random_covariance(dim, &mut *rng).into_pyarray_bound(py)
}

#[pyfunction]
#[pyo3(signature = (dim, num_components, num_samples, seed=None))]
fn generate_mixture_data(
    py: Python<'_>,
    dim: usize,
    num_components: usize,
    num_samples: usize,
    seed: Option<u64>,
) -> PyResult<Bound<'_, PyArray2<f64>>> {
    let mut rng = make_rng(seed);
    let data = mixgen::generate_mixture_data(dim, num_components, num_samples, &mut *rng)?;
    Ok(data.into_pyarray_bound(py))
}

#[pyfunction]
#[pyo3(signature = (dim, rank, num_samples, sigma=mixgen::lowrank::DEFAULT_SIGMA, seed=mixgen::lowrank::DEFAULT_SEED))]
fn generate_low_rank_data(
    py: Python<'_>,
    dim: usize,
    rank: usize,
    num_samples: usize,
    sigma: f64,
    seed: u64,
) -> PyResult<Bound<'_, PyArray2<f64>>> {
    let data = mixgen::generate_low_rank_data(dim, rank, num_samples, sigma, seed)?;
    Ok(data.into_pyarray_bound(py))
}

/// Returns `(width, height, angle)` of the error ellipse of a 2x2
/// covariance, the angle in degrees.
#[pyfunction]
#[pyo3(signature = (cov, n_std=2.0))]
fn error_ellipse(cov: PyReadonlyArray2<'_, f64>, n_std: f64) -> PyResult<(f64, f64, f64)> {
    let e = ErrorEllipse::from_covariance((0.0, 0.0), &cov.as_array(), n_std)?;
    Ok((e.width, e.height, e.angle))
}

#[pymodule]
#[pyo3(name = "mixgen")]
fn py_mixgen(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    m.add_function(wrap_pyfunction!(log_density, m)?)?;
    m.add_function(wrap_pyfunction!(density, m)?)?;
    m.add_function(wrap_pyfunction!(generate_random_covariance, m)?)?;
    m.add_function(wrap_pyfunction!(generate_mixture_data, m)?)?;
    m.add_function(wrap_pyfunction!(generate_low_rank_data, m)?)?;
    m.add_function(wrap_pyfunction!(error_ellipse, m)?)?;
    Ok(())
}
