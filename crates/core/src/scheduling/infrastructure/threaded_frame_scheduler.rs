use std::sync::Mutex;
use std::thread;

use crate::planning::domain::resource_planner::ExecutionConfig;
use crate::progress::handle::ProgressHandle;
use crate::scheduling::domain::frame_processor::ProcessingError;
use crate::scheduling::domain::frame_scheduler::FrameScheduler;
use crate::shared::job::{FrameId, FrameJob};

/// Fans a job's frames out to a bounded pool of worker threads.
///
/// Frames travel through one shared channel; each worker pulls the next
/// identifier and invokes the opaque processor with a single-frame list.
/// Failures are collected rather than cancelling siblings: frames are
/// independent files written in place, so a bad input never starves the
/// rest of the job. The first failure wins and is returned after all
/// workers drain the queue.
pub struct ThreadedFrameScheduler;

impl ThreadedFrameScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedFrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ThreadedFrameScheduler {
    fn run(
        &self,
        job: &FrameJob,
        config: &ExecutionConfig,
        progress: &ProgressHandle,
    ) -> Result<(), ProcessingError> {
        if job.frames.is_empty() {
            return Ok(());
        }

        let worker_count = config.worker_count.max(1).min(job.frames.len());
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameId>(worker_count * 2);
        let first_failure: Mutex<Option<ProcessingError>> = Mutex::new(None);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(worker_count);
            for _ in 0..worker_count {
                let frame_rx = frame_rx.clone();
                let progress = progress.clone();
                let first_failure = &first_failure;
                handles.push(scope.spawn(move || {
                    for frame in frame_rx {
                        let result = job.processor.process(
                            &job.context,
                            std::slice::from_ref(&frame),
                            &progress,
                        );
                        if let Err(e) = result {
                            set_if_none(first_failure, e);
                        }
                        // Counted on success and failure alike, so one bad
                        // frame still yields a full progress trace.
                        progress.frame_done();
                    }
                }));
            }
            drop(frame_rx);

            for frame in &job.frames {
                if frame_tx.send(frame.clone()).is_err() {
                    break;
                }
            }
            drop(frame_tx);

            for handle in handles {
                if handle.join().is_err() {
                    set_if_none(&first_failure, ProcessingError::WorkerPanicked);
                }
            }
        });

        match first_failure.into_inner().unwrap_or_else(|e| e.into_inner()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn set_if_none(slot: &Mutex<Option<ProcessingError>>, error: ProcessingError) {
    let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(error);
    }
}
