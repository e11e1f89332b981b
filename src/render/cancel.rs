use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::SurfError;

/// Shared stop flag for one draw call
///
/// Clones observe the same flag. Workers poll it once per sample.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(RenderCancelled)` once cancelled
    #[inline]
    pub fn check(&self) -> Result<(), SurfError> {
        if self.is_cancelled() {
            Err(SurfError::RenderCancelled)
        } else {
            Ok(())
        }
    }
}
