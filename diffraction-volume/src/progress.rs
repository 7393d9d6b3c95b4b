//! Progress reporting and cancellation between depth slices.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Snapshot handed to observers while a volume is being assembled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceProgress {
    pub completed: usize, // Slices finished so far
    pub total: usize,     // Slices requested
    pub depth: f64,       // Propagation distance of the slice that just finished
}

impl SliceProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_last(&self) -> bool {
        self.completed == self.total
    }
}

/// Host hook called between slices.
///
/// Returning `ControlFlow::Break` cancels the computation. With parallel
/// assembly the hook runs on worker threads, hence `Sync`.
pub trait SliceObserver: Sync {
    fn on_slice(&self, progress: &SliceProgress) -> ControlFlow<()>;
}

impl<F> SliceObserver for F
where
    F: Fn(&SliceProgress) -> ControlFlow<()> + Sync,
{
    fn on_slice(&self, progress: &SliceProgress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Observer that never interrupts
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl SliceObserver for NoProgress {
    fn on_slice(&self, _progress: &SliceProgress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Shared cancellation flag, checked before each slice
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
