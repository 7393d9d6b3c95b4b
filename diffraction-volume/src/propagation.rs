//! Fresnel propagation with a quadratic-phase transfer function.
//!
//! The field is taken to the frequency domain with a 2D FFT, multiplied by
//! `exp(i k z) * exp(-i pi lambda z (fx^2 + fy^2))`, and brought back. This is
//! the paraxial approximation: no evanescent cutoff and no anti-aliasing of
//! the transfer function, so frequencies far outside the paraxial regime alias.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::field::ComplexField;
use crate::grid::Grid;

/// Forward transform of a field, zero frequency at bin `[0, 0]`
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub grid: Grid,
    pub values: Array2<Complex64>,
}

/// Reusable propagator for one grid size and wavelength.
///
/// FFT plans and scratch buffers are built once; cloning is cheap and gives
/// each worker its own scratch.
#[derive(Clone)]
pub struct FresnelPropagator {
    grid: Grid,
    wavelength: f64,
    freq_sq: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    lane: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl FresnelPropagator {
    /// Plan transforms for `grid`. `wavelength` must be positive.
    pub fn new(grid: Grid, wavelength: f64) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(grid.n);
        let inverse = planner.plan_fft_inverse(grid.n);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        let freq_sq = grid.frequencies().iter().map(|f| f * f).collect();

        Self {
            grid,
            wavelength,
            freq_sq,
            forward,
            inverse,
            lane: vec![Complex64::new(0.0, 0.0); grid.n],
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Forward 2D FFT of `u0`
    pub fn spectrum(&mut self, u0: &ComplexField) -> Spectrum {
        debug_assert_eq!(u0.grid.n, self.grid.n);
        let mut values = u0.values.clone();
        transform_2d(
            &mut values,
            self.forward.as_ref(),
            &mut self.lane,
            &mut self.scratch,
        );
        Spectrum {
            grid: self.grid,
            values,
        }
    }

    /// Transfer function value at frequency bin `(i, j)` for distance `z`
    pub fn transfer(&self, i: usize, j: usize, z: f64) -> Complex64 {
        let k = 2.0 * PI / self.wavelength;
        let fy2 = self.freq_sq[i];
        let fx2 = self.freq_sq[j];
        let phase = -PI * self.wavelength * z * (fx2 + fy2);
        Complex64::from_polar(1.0, k * z + phase)
    }

    /// Propagate a precomputed spectrum by `z` meters
    pub fn propagate_spectrum(&mut self, spectrum: &Spectrum, z: f64) -> ComplexField {
        debug_assert_eq!(spectrum.grid.n, self.grid.n);
        let mut values = spectrum.values.clone();
        for ((i, j), u) in values.indexed_iter_mut() {
            *u *= self.transfer(i, j, z);
        }

        transform_2d(
            &mut values,
            self.inverse.as_ref(),
            &mut self.lane,
            &mut self.scratch,
        );
        let norm = 1.0 / (self.grid.n * self.grid.n) as f64;
        values.mapv_inplace(|u| u * norm);

        ComplexField {
            grid: self.grid,
            values,
        }
    }

    /// Propagate `u0` by `z` meters
    pub fn propagate(&mut self, u0: &ComplexField, z: f64) -> ComplexField {
        let spectrum = self.spectrum(u0);
        self.propagate_spectrum(&spectrum, z)
    }
}

/// One-shot propagation of `u0` over distance `z`.
///
/// `dx` overrides the spacing stored on the field's grid.
pub fn fresnel_propagate(u0: &ComplexField, z: f64, wavelength: f64, dx: f64) -> ComplexField {
    let n = u0.size();
    let grid = Grid::new(n, dx * n as f64);
    let mut propagator = FresnelPropagator::new(grid, wavelength);
    let source = ComplexField {
        grid,
        values: u0.values.clone(),
    };
    let mut out = propagator.propagate(&source, z);
    out.grid = u0.grid;
    out
}

/// 1D transforms along rows, then along columns
fn transform_2d(
    values: &mut Array2<Complex64>,
    fft: &dyn Fft<f64>,
    lane: &mut [Complex64],
    scratch: &mut [Complex64],
) {
    for axis in [Axis(1), Axis(0)] {
        for mut line in values.lanes_mut(axis) {
            for (dst, src) in lane.iter_mut().zip(line.iter()) {
                *dst = *src;
            }
            fft.process_with_scratch(lane, scratch);
            for (dst, src) in line.iter_mut().zip(lane.iter()) {
                *dst = *src;
            }
        }
    }
}
