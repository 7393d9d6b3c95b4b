use ndarray::Array2;
use rustfft::num_complex::Complex64;

use crate::grid::Grid;

/// Complex optical field sampled on a square grid.
///
/// Indexed `[i, j]` with `i` along x and `j` along y.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexField {
    pub grid: Grid,
    pub values: Array2<Complex64>,
}

impl ComplexField {
    pub fn zeros(grid: Grid) -> Self {
        ComplexField {
            grid,
            values: Array2::zeros((grid.n, grid.n)),
        }
    }

    /// Sample `f(x, y)` at every grid point
    pub fn from_fn<F>(grid: Grid, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> Complex64,
    {
        let values = Array2::from_shape_fn((grid.n, grid.n), |(i, j)| {
            f(grid.coord(i), grid.coord(j))
        });
        ComplexField { grid, values }
    }

    pub fn size(&self) -> usize {
        self.grid.n
    }

    pub fn get(&self, i: usize, j: usize) -> Option<Complex64> {
        if self.grid.in_bounds(i, j) {
            Some(self.values[[i, j]])
        } else {
            None
        }
    }

    /// |u|² at every sample
    pub fn intensity(&self) -> Array2<f64> {
        self.values.mapv(|u| u.norm_sqr())
    }

    pub fn total_intensity(&self) -> f64 {
        self.values.iter().map(|u| u.norm_sqr()).sum()
    }

    pub fn max_intensity(&self) -> f64 {
        self.values
            .iter()
            .map(|u| u.norm_sqr())
            .fold(0.0_f64, f64::max)
    }
}
