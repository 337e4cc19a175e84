use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::{DensityGrid, ErrorEllipse, ScatterOverlay};

pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Paints each grid cell with `color`, its opacity proportional to the
/// density relative to the grid maximum.
pub fn draw_density<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    grid: &DensityGrid,
    color: &RGBColor,
) -> DrawResult<DB> {
    let (xs, ys, density) = (grid.xs(), grid.ys(), grid.density());
    let peak = density.fold(0.0f64, |m, &v| m.max(v));
    if peak <= 0.0 {
        return Ok(());
    }
    // a DensityGrid always has at least two points per axis
    let half_dx = (xs[1] - xs[0]) / 2.0;
    let half_dy = (ys[1] - ys[0]) / 2.0;

    let cells = density.indexed_iter().map(|((iy, ix), &p)| {
        let (x, y) = (xs[ix], ys[iy]);
        Rectangle::new(
            [(x - half_dx, y - half_dy), (x + half_dx, y + half_dy)],
            color.mix(p / peak).filled(),
        )
    });
    chart.draw_series(cells)?;
    Ok(())
}

/// Scatter plot of the first two columns; rows flagged as missing are drawn
/// in `missing_color`. [`ScatterOverlay::new`] guarantees both columns exist.
pub fn draw_scatter<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    overlay: &ScatterOverlay,
    color: &RGBColor,
    missing_color: &RGBColor,
    size: u32,
) -> DrawResult<DB> {
    let dots = |points: &ndarray::Array2<f64>, c: &RGBColor| {
        points
            .rows()
            .into_iter()
            .map(|row| Circle::new((row[0], row[1]), size, c.filled()))
            .collect::<Vec<_>>()
    };
    chart.draw_series(dots(&overlay.observed, color))?;
    chart.draw_series(dots(&overlay.missing, missing_color))?;
    Ok(())
}

/// Outline of an error ellipse, approximated by `segments` straight lines.
pub fn draw_ellipse<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    ellipse: &ErrorEllipse,
    color: &RGBColor,
    segments: usize,
) -> DrawResult<DB> {
    let mut outline = ellipse.boundary(segments);
    if let Some(&first) = outline.first() {
        outline.push(first);
    }
    chart.draw_series(std::iter::once(PathElement::new(
        outline,
        color.stroke_width(2),
    )))?;
    Ok(())
}
