//! Entry point that guards volume generation with an Idle/Running state machine.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::aperture::{self, ApertureSpec};
use crate::error::{DiffractionError, Result};
use crate::field::ComplexField;
use crate::progress::{CancelToken, NoProgress, SliceObserver};
use crate::volume::{DepthSampling, IntensityVolume, VolumeAssembler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Running,
}

/// Tuning knobs for how a volume is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub parallel: bool,
    pub yield_every: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            yield_every: 10,
        }
    }
}

/// Runs at most one volume computation at a time.
///
/// A second `generate` while one is in flight is rejected with
/// [`DiffractionError::Busy`] and leaves the running computation alone.
#[derive(Debug, Default)]
pub struct Generator {
    options: GenerationOptions,
    running: AtomicBool,
    cancel: CancelToken,
}

/// Returns the generator to Idle however the run ends
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Generator {
    pub fn new(options: GenerationOptions) -> Self {
        Self {
            options,
            running: AtomicBool::new(false),
            cancel: CancelToken::new(),
        }
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn state(&self) -> GeneratorState {
        if self.running.load(Ordering::SeqCst) {
            GeneratorState::Running
        } else {
            GeneratorState::Idle
        }
    }

    /// Handle the host can use to stop the current run
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Build the aperture field for `spec`
    pub fn initialize(&self, spec: &ApertureSpec) -> Result<ComplexField> {
        aperture::initialize(spec)
    }

    pub fn generate(&self, spec: &ApertureSpec, sampling: &DepthSampling) -> Result<IntensityVolume> {
        self.generate_with(spec, sampling, &NoProgress)
    }

    /// Generate a volume, reporting to `observer` between slices
    pub fn generate_with(
        &self,
        spec: &ApertureSpec,
        sampling: &DepthSampling,
        observer: &dyn SliceObserver,
    ) -> Result<IntensityVolume> {
        let _guard = self.begin()?;

        // `initialize` validates the aperture itself
        sampling.validate()?;
        let aperture = aperture::initialize(spec)?;
        VolumeAssembler::new(spec, sampling)
            .parallel(self.options.parallel)
            .yield_every(self.options.yield_every)
            .cancel_token(self.cancel.clone())
            .observer(observer)
            .assemble(&aperture)
    }

    fn begin(&self) -> Result<RunGuard<'_>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejecting generate request: a volume is already being computed");
            return Err(DiffractionError::Busy);
        }
        self.cancel.reset();
        info!("Generator: Idle -> Running");
        Ok(RunGuard(&self.running))
    }
}
