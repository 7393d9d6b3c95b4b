//! Aperture description and the initial field behind it.

use log::debug;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{DiffractionError, Result};
use crate::field::ComplexField;
use crate::grid::Grid;

/// Opening shape of the transmittance mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApertureShape {
    /// Circular hole of the given radius
    #[default]
    Circular,
    /// Slit along x, open where `|y| <= radius`
    HorizontalSlit,
}

/// Physical description of the aperture and its sampling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApertureSpec {
    pub radius: f64,     // Hole radius, or slit half-height (meters)
    pub n: usize,        // Samples per side
    pub extent: f64,     // Window width L (meters)
    pub wavelength: f64, // Meters
    pub shape: ApertureShape,
}

impl ApertureSpec {
    pub fn circular(radius: f64, n: usize, extent: f64, wavelength: f64) -> Self {
        Self {
            radius,
            n,
            extent,
            wavelength,
            shape: ApertureShape::Circular,
        }
    }

    pub fn with_shape(mut self, shape: ApertureShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.n, self.extent)
    }

    /// Sample spacing `L / N`
    pub fn dx(&self) -> f64 {
        self.grid().dx()
    }

    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(DiffractionError::aperture("sample count must be positive"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(DiffractionError::aperture(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(DiffractionError::aperture(format!(
                "extent must be positive, got {}",
                self.extent
            )));
        }
        if !(self.wavelength.is_finite() && self.wavelength > 0.0) {
            return Err(DiffractionError::aperture(format!(
                "wavelength must be positive, got {}",
                self.wavelength
            )));
        }
        Ok(())
    }

    /// Whether the sample point `(x, y)` lies inside the opening
    pub fn transmits(&self, x: f64, y: f64) -> bool {
        match self.shape {
            ApertureShape::Circular => x * x + y * y <= self.radius * self.radius,
            ApertureShape::HorizontalSlit => y.abs() <= self.radius,
        }
    }
}

/// Build the field immediately behind the aperture.
///
/// Hard-edged mask: each sample is classified by its own coordinate only.
pub fn initialize(spec: &ApertureSpec) -> Result<ComplexField> {
    spec.validate()?;

    let open = Complex64::new(1.0, 0.0);
    let closed = Complex64::new(0.0, 0.0);
    let field = ComplexField::from_fn(spec.grid(), |x, y| {
        if spec.transmits(x, y) {
            open
        } else {
            closed
        }
    });

    debug!(
        "Aperture {:?}: {}x{} samples, dx={:.3e} m, {} open",
        spec.shape,
        spec.n,
        spec.n,
        spec.dx(),
        field.values.iter().filter(|u| u.re > 0.0).count()
    );
    Ok(field)
}
