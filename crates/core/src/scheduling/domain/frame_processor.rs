use thiserror::Error;

use crate::progress::handle::ProgressHandle;
use crate::shared::job::{FrameId, JobContext};

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("processing failed for {frame}: {reason}")]
    Frame { frame: FrameId, reason: String },
    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// The opaque per-frame processing capability.
///
/// Supplied by the inference subsystem. The pipeline assumes nothing about
/// its behavior beyond: it eventually returns, and failure is
/// distinguishable from success. Implementations must be safe to call from
/// multiple workers at once.
///
/// `frames` carries the identifiers this call owns — the scheduler passes
/// single-frame lists. The handle is for processor-originated status
/// messages; completion accounting belongs to the scheduler.
pub trait FrameProcessor: Send + Sync {
    fn process(
        &self,
        ctx: &JobContext,
        frames: &[FrameId],
        progress: &ProgressHandle,
    ) -> Result<(), ProcessingError>;
}
