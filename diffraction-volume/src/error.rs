//! Error types for aperture setup, volume generation and export.

use thiserror::Error;

/// Errors raised by the diffraction pipeline
#[derive(Error, Debug)]
pub enum DiffractionError {
    /// Aperture parameters failed validation
    #[error("Invalid aperture: {reason}")]
    InvalidAperture {
        /// What was wrong
        reason: String,
    },

    /// Depth sampling failed validation
    #[error("Invalid depth sampling: {reason}")]
    InvalidSampling {
        /// What was wrong
        reason: String,
    },

    /// A generation is already running on this generator
    #[error("A volume generation is already in progress")]
    Busy,

    /// The generation was cancelled before all slices were computed
    #[error("Volume generation cancelled after {completed} of {total} slices")]
    Cancelled {
        /// Slices finished before cancellation was observed
        completed: usize,
        /// Slices requested
        total: usize,
    },

    /// Buffer or field dimensions do not agree
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },

    /// Filesystem failure while exporting or loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sidecar metadata could not be encoded or decoded
    #[error("Metadata format error: {0}")]
    Format(String),
}

impl DiffractionError {
    pub(crate) fn aperture(reason: impl Into<String>) -> Self {
        Self::InvalidAperture {
            reason: reason.into(),
        }
    }

    pub(crate) fn sampling(reason: impl Into<String>) -> Self {
        Self::InvalidSampling {
            reason: reason.into(),
        }
    }
}

/// Result alias for the diffraction pipeline
pub type Result<T> = std::result::Result<T, DiffractionError>;
