use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::batch::result::{BatchResult, JobOutcome};
use crate::batch::status::{BatchPhase, BatchStatus, StatusBoard};
use crate::planning::domain::capacity_probe::CapacityProbe;
use crate::planning::domain::resource_planner::{plan_with_probe, PlanHints};
use crate::progress::handle::ProgressHandle;
use crate::progress::status_sink::StatusSink;
use crate::progress::tracker::{percent, ProgressTracker};
use crate::scheduling::domain::frame_processor::FrameProcessor;
use crate::scheduling::domain::frame_scheduler::FrameScheduler;
use crate::shared::job::{Capability, FrameId, FrameJob, JobContext, JobOptions};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("a batch is already processing")]
    AlreadyProcessing,
}

/// One queued source+target entry.
pub struct BatchJob {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub output_path: PathBuf,
    pub frames: Vec<FrameId>,
    pub capabilities: Vec<Capability>,
    pub options: JobOptions,
}

/// Joins the batch's background thread. Pollers never need this; it exists
/// for callers that want a completion barrier (CLI, tests).
pub struct BatchHandle {
    thread: JoinHandle<()>,
}

impl BatchHandle {
    pub fn wait(self) {
        let _ = self.thread.join();
    }
}

/// Sequences independent jobs through the frame scheduler one at a time.
///
/// The job loop runs on its own background thread so starting a batch never
/// blocks the caller; pollers read the shared status record instead.
/// Failure isolation is per-job: a failed job is recorded and the queue
/// continues, coarser than the scheduler's per-frame isolation.
pub struct BatchOrchestrator {
    scheduler: Arc<dyn FrameScheduler>,
    probe: Arc<dyn CapacityProbe>,
    processor: Arc<dyn FrameProcessor>,
    hints: PlanHints,
    board: Arc<StatusBoard>,
    results: Arc<Mutex<Vec<BatchResult>>>,
}

impl BatchOrchestrator {
    pub fn new(
        scheduler: Arc<dyn FrameScheduler>,
        probe: Arc<dyn CapacityProbe>,
        processor: Arc<dyn FrameProcessor>,
        hints: PlanHints,
    ) -> Self {
        Self {
            scheduler,
            probe,
            processor,
            hints,
            board: Arc::new(StatusBoard::new()),
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Current status record, as one indivisible copy.
    pub fn status(&self) -> BatchStatus {
        self.board.snapshot()
    }

    pub fn results(&self) -> Vec<BatchResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Start processing `jobs` on a background thread.
    ///
    /// At most one batch runs at a time: while the status is `Processing`
    /// the request is rejected synchronously with no state touched. The
    /// result list is cleared inside the claim, so status and results reset
    /// as one step from a poller's point of view.
    pub fn start(&self, jobs: Vec<BatchJob>) -> Result<BatchHandle, BatchError> {
        let claimed = self.board.begin(jobs.len(), || {
            self.results
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clear();
        });
        if !claimed {
            return Err(BatchError::AlreadyProcessing);
        }

        let scheduler = Arc::clone(&self.scheduler);
        let probe = Arc::clone(&self.probe);
        let processor = Arc::clone(&self.processor);
        let hints = self.hints.clone();
        let board = Arc::clone(&self.board);
        let results = Arc::clone(&self.results);

        let thread = thread::spawn(move || {
            let run = catch_unwind(AssertUnwindSafe(|| {
                run_batch(&*scheduler, &*probe, processor, &hints, &board, &results, jobs);
            }));
            if run.is_err() {
                board.finish(
                    BatchPhase::Error,
                    "Batch aborted: internal orchestration fault".to_string(),
                );
            }
        });

        Ok(BatchHandle { thread })
    }
}

#[allow(clippy::too_many_arguments)]
fn run_batch(
    scheduler: &dyn FrameScheduler,
    probe: &dyn CapacityProbe,
    processor: Arc<dyn FrameProcessor>,
    hints: &PlanHints,
    board: &Arc<StatusBoard>,
    results: &Mutex<Vec<BatchResult>>,
    jobs: Vec<BatchJob>,
) {
    let total = jobs.len();
    board.status("BATCH", &format!("Processing {total} job(s)"));

    let mut completed = 0usize;
    let mut failed = 0usize;

    for (index, job) in jobs.into_iter().enumerate() {
        let ordinal = index + 1;
        let source_name = display_name(&job.source_path);
        let target_name = display_name(&job.target_path);

        board.status("SETUP", &format!("Setting up files for job {ordinal}/{total}"));
        board.set_message(format!("Processing {target_name} ({ordinal}/{total})"));

        let outcome = process_job(scheduler, probe, &processor, hints, board, job, ordinal);

        let result = match outcome {
            Ok(output) => {
                completed += 1;
                board.status("PROCESS", &format!("Completed job {ordinal}/{total}"));
                BatchResult {
                    source_name,
                    target_name,
                    output: Some(output),
                    outcome: JobOutcome::Completed,
                }
            }
            Err(reason) => {
                failed += 1;
                board.status("ERROR", &format!("Job {ordinal}/{total} failed: {reason}"));
                BatchResult {
                    source_name,
                    target_name,
                    output: None,
                    outcome: JobOutcome::Failed,
                }
            }
        };

        results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result);
        board.advance(ordinal, percent(ordinal, total));
    }

    board.finish(
        BatchPhase::Completed,
        format!("Batch processing completed: {completed} succeeded, {failed} failed"),
    );
}

/// Run one job through the scheduler. The error branch carries the
/// human-readable reason recorded on the status surface.
fn process_job(
    scheduler: &dyn FrameScheduler,
    probe: &dyn CapacityProbe,
    processor: &Arc<dyn FrameProcessor>,
    hints: &PlanHints,
    board: &Arc<StatusBoard>,
    job: BatchJob,
    ordinal: usize,
) -> Result<PathBuf, String> {
    if job.frames.is_empty() {
        return Err("no frames to process".to_string());
    }

    // Capacity drifts between jobs, so every plan starts from a fresh probe.
    let config = plan_with_probe(probe, hints);

    let output_path = job.output_path.clone();
    let frame_job = FrameJob {
        job_id: format!("job-{ordinal}"),
        frames: job.frames,
        context: JobContext {
            source_path: job.source_path,
            target_path: job.target_path,
            output_path: job.output_path,
            capabilities: job.capabilities,
            options: job.options,
        },
        processor: Arc::clone(processor),
    };

    board.status(
        "PROCESS",
        &format!(
            "Processing {} frame(s) with {} worker(s)",
            frame_job.frames.len(),
            config.worker_count
        ),
    );

    let tracker = Arc::new(ProgressTracker::new(frame_job.frames.len(), &config));
    let sink: Arc<dyn StatusSink> = Arc::clone(board) as Arc<dyn StatusSink>;
    let progress = ProgressHandle::new(tracker, sink);

    scheduler
        .run(&frame_job, &config, &progress)
        .map(|()| output_path)
        .map_err(|e| e.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
