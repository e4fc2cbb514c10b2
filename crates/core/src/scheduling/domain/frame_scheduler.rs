use crate::planning::domain::resource_planner::ExecutionConfig;
use crate::progress::handle::ProgressHandle;
use crate::scheduling::domain::frame_processor::ProcessingError;
use crate::shared::job::FrameJob;

/// Abstracts how a job's frames are fanned out to workers.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. bounded thread pool).
///
/// Contract: `run` returns only after every submitted frame reaches a
/// terminal state (join barrier). Frame completion order is unconstrained.
/// A single frame's failure does not cancel in-flight siblings; the first
/// failure is surfaced after the join.
pub trait FrameScheduler: Send + Sync {
    fn run(
        &self,
        job: &FrameJob,
        config: &ExecutionConfig,
        progress: &ProgressHandle,
    ) -> Result<(), ProcessingError>;
}
