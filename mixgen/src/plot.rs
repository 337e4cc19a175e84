//! Backend independent geometry for the usual diagnostic plots of a fitted
//! mixture: error ellipses, density grids for contour plots and scatter
//! overlays that single out rows with missing data. With the `plotting`
//! feature, [`render`] draws them on a `plotters` chart.

#[cfg(feature = "plotting")]
pub mod render;

use ndarray::{prelude::*, Data};

use crate::error::{check_dim, NumericalError, Result};
use crate::linalg::symmetric_eigen;
use crate::mixture::ScoreSamples;

/// Ellipse of constant Mahalanobis distance `n_std` around `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorEllipse {
    pub center: (f64, f64),
    /// full length of the major axis
    pub width: f64,
    /// full length of the minor axis
    pub height: f64,
    /// counter-clockwise rotation of the major axis, in degrees
    pub angle: f64,
}

impl ErrorEllipse {
    pub fn from_covariance<S: Data<Elem = f64>>(
        center: (f64, f64),
        cov: &ArrayBase<S, Ix2>,
        n_std: f64,
    ) -> Result<Self> {
        check_dim("ellipse covariance rows", 2, cov.nrows())?;
        check_dim("ellipse covariance columns", 2, cov.ncols())?;
        let (values, vectors) = symmetric_eigen(cov)?;
        let (minor, major) = (values[0], values[1]);
        // numerically flat ellipses count as degenerate
        if !(minor > major.abs() * 1e-12) {
            return Err(NumericalError::NotPositiveDefinite);
        }
        let direction = vectors.column(1);
        Ok(Self {
            center,
            width: 2.0 * n_std * major.sqrt(),
            height: 2.0 * n_std * minor.sqrt(),
            angle: direction[1].atan2(direction[0]).to_degrees(),
        })
    }

    /// `n` points evenly spaced in angle along the ellipse, starting at the
    /// positive end of the major axis.
    pub fn boundary(&self, n: usize) -> Vec<(f64, f64)> {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (a, b) = (self.width / 2.0, self.height / 2.0);
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                let (x, y) = (a * t.cos(), b * t.sin());
                (
                    self.center.0 + cos * x - sin * y,
                    self.center.1 + sin * x + cos * y,
                )
            })
            .collect()
    }
}

pub type AxisRange = (f64, f64);

/// Extent of the first two columns of `x`, widened on each side by `margin`
/// times the span. `NaN` entries are ignored.
pub fn axis_range<S: Data<Elem = f64>>(
    x: &ArrayBase<S, Ix2>,
    margin: f64,
) -> Result<(AxisRange, AxisRange)> {
    if x.ncols() < 2 {
        return Err(NumericalError::DimensionMismatch {
            what: "plotted columns",
            expected: 2,
            got: x.ncols(),
        });
    }
    let range = |j: usize| -> Result<AxisRange> {
        let (lo, hi) = x
            .column(j)
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return Err(NumericalError::InvalidParameter(
                "no observed values to plot".into(),
            ));
        }
        let pad = (hi - lo) * margin;
        Ok((lo - pad, hi + pad))
    };
    Ok((range(0)?, range(1)?))
}

/// Density of a model on a regular 2D mesh, at least two points per axis.
#[derive(Clone, Debug)]
pub struct DensityGrid {
    xs: Array1<f64>,
    ys: Array1<f64>,
    density: Array2<f64>,
}

impl DensityGrid {
    pub fn xs(&self) -> ArrayView1<f64> {
        self.xs.view()
    }

    pub fn ys(&self) -> ArrayView1<f64> {
        self.ys.view()
    }

    /// `density()[[iy, ix]]` is the density at `(xs()[ix], ys()[iy])`.
    pub fn density(&self) -> ArrayView2<f64> {
        self.density.view()
    }

    pub fn evaluate<M: ScoreSamples + ?Sized>(
        model: &M,
        x_range: AxisRange,
        y_range: AxisRange,
        resolution: usize,
    ) -> Result<Self> {
        if resolution < 2 {
            return Err(NumericalError::InvalidParameter(format!(
                "grid resolution must be at least 2, got {resolution}"
            )));
        }
        let xs = Array1::linspace(x_range.0, x_range.1, resolution);
        let ys = Array1::linspace(y_range.0, y_range.1, resolution);

        let points = Array2::from_shape_fn((resolution * resolution, 2), |(i, c)| {
            if c == 0 {
                xs[i % resolution]
            } else {
                ys[i / resolution]
            }
        });
        let ll = model.score_samples(points.view())?;
        check_dim("scored grid points", points.nrows(), ll.len())?;
        let density = Array2::from_shape_fn((resolution, resolution), |(iy, ix)| {
            ll[iy * resolution + ix].exp()
        });

        Ok(Self { xs, ys, density })
    }

    /// `n` contour levels evenly spaced strictly between the smallest and
    /// the largest density on the grid.
    pub fn levels(&self, n: usize) -> Vec<f64> {
        let lo = self.density.fold(f64::INFINITY, |m, &v| m.min(v));
        let hi = self.density.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let step = (hi - lo) / (n + 1) as f64;
        (1..=n).map(|i| lo + step * i as f64).collect()
    }
}

/// Points of a scatter plot split by a missing-data indicator, so the rows
/// with missing values can be drawn in a different style.
#[derive(Clone, Debug)]
pub struct ScatterOverlay {
    pub observed: Array2<f64>,
    pub missing: Array2<f64>,
}

impl ScatterOverlay {
    pub fn new<S: Data<Elem = f64>>(
        x: &ArrayBase<S, Ix2>,
        missing: Option<&Array1<bool>>,
    ) -> Result<Self> {
        if x.ncols() < 2 {
            return Err(NumericalError::DimensionMismatch {
                what: "plotted columns",
                expected: 2,
                got: x.ncols(),
            });
        }
        let Some(missing) = missing else {
            return Ok(Self {
                observed: x.to_owned(),
                missing: Array2::zeros((0, x.ncols())),
            });
        };
        check_dim("missing indicator length", x.nrows(), missing.len())?;
        let (miss, obs): (Vec<usize>, Vec<usize>) = (0..x.nrows()).partition(|&i| missing[i]);
        Ok(Self {
            observed: x.select(Axis(0), &obs),
            missing: x.select(Axis(0), &miss),
        })
    }
}
