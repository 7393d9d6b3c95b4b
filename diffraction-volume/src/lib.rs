//! Fresnel diffraction volumes.
//!
//! A hard-edged aperture field is propagated to a range of depths with an
//! FFT-based Fresnel transfer function. The per-slice intensities are stacked
//! into a 3D grid and normalized by the maximum over the whole volume, ready
//! for a volumetric renderer.
//!
//! ```no_run
//! use diffraction_volume::{ApertureSpec, DepthSampling, Generator};
//!
//! let spec = ApertureSpec::circular(0.00025, 64, 0.001, 632.8e-9);
//! let sampling = DepthSampling::new(0.01, 0.05, 5);
//! let volume = Generator::default().generate(&spec, &sampling)?;
//! assert_eq!(volume.as_slice().len(), 64 * 64 * 5);
//! # Ok::<(), diffraction_volume::DiffractionError>(())
//! ```

pub mod aperture;
pub mod config;
pub mod error;
pub mod export;
pub mod field;
pub mod generator;
pub mod grid;
pub mod interface;
pub mod progress;
pub mod propagation;
pub mod visualisation;
pub mod volume;

pub use aperture::{initialize, ApertureShape, ApertureSpec};
pub use error::{DiffractionError, Result};
pub use field::ComplexField;
pub use generator::{GenerationOptions, Generator, GeneratorState};
pub use grid::Grid;
pub use progress::{CancelToken, NoProgress, SliceObserver, SliceProgress};
pub use propagation::{fresnel_propagate, FresnelPropagator, Spectrum};
pub use volume::{DepthSampling, IntensityVolume, VolumeAssembler, VolumeShape};
