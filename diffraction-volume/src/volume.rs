//! Depth sampling and assembly of the normalized 3D intensity grid.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};
use ndarray::{Array2, Array3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aperture::ApertureSpec;
use crate::error::{DiffractionError, Result};
use crate::field::ComplexField;
use crate::progress::{CancelToken, NoProgress, SliceObserver, SliceProgress};
use crate::propagation::{FresnelPropagator, Spectrum};

/// Propagation distances, linearly interpolated over `[z_min, z_max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSampling {
    pub z_min: f64,
    pub z_max: f64,
    pub num_z: usize,
}

impl DepthSampling {
    pub fn new(z_min: f64, z_max: f64, num_z: usize) -> Self {
        Self { z_min, z_max, num_z }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_z < 2 {
            return Err(DiffractionError::sampling(format!(
                "at least two depth slices are required, got {}",
                self.num_z
            )));
        }
        if !self.z_min.is_finite() || !self.z_max.is_finite() {
            return Err(DiffractionError::sampling(format!(
                "depth range must be finite (z_min={}, z_max={})",
                self.z_min, self.z_max
            )));
        }
        Ok(())
    }

    pub fn depth(&self, idx: usize) -> f64 {
        let t = idx as f64 / (self.num_z - 1) as f64;
        self.z_min + (self.z_max - self.z_min) * t
    }

    pub fn depths(&self) -> Vec<f64> {
        (0..self.num_z).map(|idx| self.depth(idx)).collect()
    }
}

/// Dimensions of an intensity volume (x, y, depth)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeShape {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl VolumeShape {
    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Sample count, or `None` when the dimensions overflow `usize`
    pub fn checked_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat buffer position of sample `(z, x, y)`
    pub fn index(&self, z: usize, x: usize, y: usize) -> usize {
        z * self.width * self.height + x * self.height + y
    }
}

/// Normalized intensities, flat buffer ordered `z * N * N + x * N + y`
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityVolume {
    shape: VolumeShape,
    data: Vec<f32>,
    depths: Vec<f64>,
    raw_max: f32,
}

impl IntensityVolume {
    /// Wrap an already-normalized buffer, checking its length against `shape`.
    ///
    /// `raw_max` is the peak intensity the buffer was divided by.
    pub fn from_raw(
        shape: VolumeShape,
        data: Vec<f32>,
        depths: Vec<f64>,
        raw_max: f32,
    ) -> Result<Self> {
        let expected = shape.checked_len().ok_or_else(|| {
            DiffractionError::Format(format!("volume dimensions overflow: {shape:?}"))
        })?;
        if data.len() != expected {
            return Err(DiffractionError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        if depths.len() != shape.depth {
            return Err(DiffractionError::ShapeMismatch {
                expected: shape.depth,
                got: depths.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            depths,
            raw_max,
        })
    }

    pub fn dims(&self) -> VolumeShape {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    /// Propagation distance of every slice (meters)
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Largest intensity before normalization
    pub fn raw_max(&self) -> f32 {
        self.raw_max
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0_f32, f32::max)
    }

    pub fn sample(&self, z: usize, x: usize, y: usize) -> f32 {
        self.data[self.shape.index(z, x, y)]
    }

    /// One depth slice indexed `[x, y]`
    pub fn slice(&self, z: usize) -> Array2<f32> {
        Array2::from_shape_fn((self.shape.width, self.shape.height), |(x, y)| {
            self.sample(z, x, y)
        })
    }

    /// Cut through all depths at row `y`, indexed `[z, x]`
    pub fn xz_section(&self, y: usize) -> Array2<f32> {
        Array2::from_shape_fn((self.shape.depth, self.shape.width), |(z, x)| {
            self.sample(z, x, y)
        })
    }

    pub fn to_array(&self) -> Array3<f32> {
        Array3::from_shape_fn(
            (self.shape.depth, self.shape.width, self.shape.height),
            |(z, x, y)| self.sample(z, x, y),
        )
    }
}

/// Builds an [`IntensityVolume`] by propagating an aperture field to every depth
pub struct VolumeAssembler<'a> {
    spec: &'a ApertureSpec,
    sampling: &'a DepthSampling,
    parallel: bool,
    yield_every: usize,
    cancel: CancelToken,
    observer: &'a dyn SliceObserver,
}

impl<'a> VolumeAssembler<'a> {
    pub fn new(spec: &'a ApertureSpec, sampling: &'a DepthSampling) -> Self {
        Self {
            spec,
            sampling,
            parallel: false,
            yield_every: 10,
            cancel: CancelToken::new(),
            observer: &NoProgress,
        }
    }

    /// Spread slices over the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Report to the observer every `every` completed slices (and after the last)
    pub fn yield_every(mut self, every: usize) -> Self {
        self.yield_every = every.max(1);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn observer(mut self, observer: &'a dyn SliceObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn assemble(&self, aperture: &ComplexField) -> Result<IntensityVolume> {
        self.spec.validate()?;
        self.sampling.validate()?;
        if aperture.size() != self.spec.n {
            return Err(DiffractionError::ShapeMismatch {
                expected: self.spec.n * self.spec.n,
                got: aperture.values.len(),
            });
        }

        let n = self.spec.n;
        let shape = VolumeShape {
            width: n,
            height: n,
            depth: self.sampling.num_z,
        };
        let depths = self.sampling.depths();
        let started = Instant::now();
        info!(
            "Assembling {}x{}x{} volume over z=[{}, {}] m ({})",
            n,
            n,
            shape.depth,
            self.sampling.z_min,
            self.sampling.z_max,
            if self.parallel { "parallel" } else { "serial" }
        );

        let mut propagator = FresnelPropagator::new(self.spec.grid(), self.spec.wavelength);
        let spectrum = propagator.spectrum(aperture);

        // Raw intensities first; the divisor is only known once every slice exists
        let mut data = vec![0.0_f32; shape.len()];
        let max = if self.parallel {
            self.fill_parallel(&propagator, &spectrum, &depths, &mut data)?
        } else {
            self.fill_serial(&mut propagator, &spectrum, &depths, &mut data)?
        };

        normalize(&mut data, max);
        info!(
            "Volume complete in {:.2?}, peak raw intensity {:.4e}",
            started.elapsed(),
            max
        );

        Ok(IntensityVolume {
            shape,
            data,
            depths,
            raw_max: max,
        })
    }

    fn fill_serial(
        &self,
        propagator: &mut FresnelPropagator,
        spectrum: &Spectrum,
        depths: &[f64],
        data: &mut [f32],
    ) -> Result<f32> {
        let plane = self.spec.n * self.spec.n;
        let mut max = 0.0_f32;

        for (idx, (&z, chunk)) in depths.iter().zip(data.chunks_exact_mut(plane)).enumerate() {
            self.check_cancelled(idx)?;
            let field = propagator.propagate_spectrum(spectrum, z);
            max = max.max(write_intensity(&field, chunk));
            self.report(idx + 1, z);
        }
        Ok(max)
    }

    fn fill_parallel(
        &self,
        propagator: &FresnelPropagator,
        spectrum: &Spectrum,
        depths: &[f64],
        data: &mut [f32],
    ) -> Result<f32> {
        let plane = self.spec.n * self.spec.n;
        let completed = AtomicUsize::new(0);

        // Each worker keeps its own propagator scratch; slices write disjoint chunks
        let local_max: Vec<f32> = data
            .par_chunks_mut(plane)
            .zip(depths.par_iter())
            .map_init(
                || propagator.clone(),
                |propagator, (chunk, &z)| {
                    self.check_cancelled(completed.load(Ordering::SeqCst))?;
                    let field = propagator.propagate_spectrum(spectrum, z);
                    let max = write_intensity(&field, chunk);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    self.report(done, z);
                    Ok(max)
                },
            )
            .collect::<Result<Vec<f32>>>()?;

        Ok(local_max.into_iter().fold(0.0_f32, f32::max))
    }

    fn check_cancelled(&self, completed: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            info!(
                "Volume generation cancelled after {}/{} slices",
                completed, self.sampling.num_z
            );
            return Err(DiffractionError::Cancelled {
                completed,
                total: self.sampling.num_z,
            });
        }
        Ok(())
    }

    fn report(&self, completed: usize, z: f64) {
        let total = self.sampling.num_z;
        debug!("Slice {}/{} at z={:.4} m", completed, total, z);
        if completed % self.yield_every != 0 && completed != total {
            return;
        }
        let progress = SliceProgress {
            completed,
            total,
            depth: z,
        };
        if let ControlFlow::Break(()) = self.observer.on_slice(&progress) {
            self.cancel.cancel();
        }
    }
}

/// Store |u|² into `out`, returning the slice maximum
fn write_intensity(field: &ComplexField, out: &mut [f32]) -> f32 {
    let mut max = 0.0_f32;
    for (dst, u) in out.iter_mut().zip(field.values.iter()) {
        let intensity = u.norm_sqr() as f32;
        max = max.max(intensity);
        *dst = intensity;
    }
    max
}

/// Divide by the global maximum; an all-zero volume is left untouched
fn normalize(data: &mut [f32], max: f32) {
    if max > 0.0 {
        for v in data.iter_mut() {
            *v /= max;
        }
    }
}
