use std::collections::VecDeque;
use std::sync::{RwLock, RwLockWriteGuard};

use crate::progress::status_sink::StatusSink;
use crate::progress::tracker::ProgressSnapshot;
use crate::shared::constants::STATUS_LOG_CAPACITY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Live batch state readable by concurrent pollers.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchStatus {
    pub phase: BatchPhase,
    pub message: String,
    /// Batch-level percentage: `floor(100 * batch_index / total_jobs)`.
    pub progress_percent: u8,
    /// Jobs finished so far (terminal per-job state reached).
    pub batch_index: usize,
    pub total_jobs: usize,
    /// Most recent status lines, oldest evicted first.
    pub log: VecDeque<String>,
}

impl BatchStatus {
    fn idle() -> Self {
        Self {
            phase: BatchPhase::Idle,
            message: "Ready".to_string(),
            progress_percent: 0,
            batch_index: 0,
            total_jobs: 0,
            log: VecDeque::new(),
        }
    }
}

/// Single-writer home of the shared `BatchStatus` record.
///
/// The orchestrator mutates it under one write lock per update, so pollers
/// (which clone the whole record) never observe a half-applied update. Lock
/// poisoning is recovered rather than propagated: a crashed worker must not
/// wedge the status surface.
pub struct StatusBoard {
    inner: RwLock<BatchStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BatchStatus::idle()),
        }
    }

    /// Non-blocking-style read: a full copy of the current record.
    pub fn snapshot(&self) -> BatchStatus {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Claim the board for a new batch, resetting the whole record.
    ///
    /// Returns `false` without mutating anything while a batch is still
    /// processing. `reset` runs with the claim held, before the new record
    /// is published, so a poller that observes `Processing` can never pair
    /// it with companion state left over from the previous batch.
    pub(crate) fn begin(&self, total_jobs: usize, reset: impl FnOnce()) -> bool {
        let mut status = self.write();
        if status.phase == BatchPhase::Processing {
            return false;
        }
        reset();
        *status = BatchStatus {
            phase: BatchPhase::Processing,
            message: "Starting batch processing...".to_string(),
            progress_percent: 0,
            batch_index: 0,
            total_jobs,
            log: VecDeque::new(),
        };
        true
    }

    /// Record that `finished` jobs of the batch reached a terminal state.
    pub(crate) fn advance(&self, finished: usize, percent: u8) {
        let mut status = self.write();
        status.batch_index = finished;
        status.progress_percent = percent;
    }

    pub(crate) fn set_message(&self, message: String) {
        self.write().message = message;
    }

    pub(crate) fn finish(&self, phase: BatchPhase, message: String) {
        let mut status = self.write();
        push_log(&mut status.log, format!("[BATCH] {message}"));
        status.phase = phase;
        status.message = message;
    }

    fn write(&self) -> RwLockWriteGuard<'_, BatchStatus> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusBoard {
    fn status(&self, scope: &str, message: &str) {
        log::debug!("[{scope}] {message}");
        let mut status = self.write();
        push_log(&mut status.log, format!("[{scope}] {message}"));
        status.message = message.to_string();
    }

    fn progress(&self, snapshot: &ProgressSnapshot) {
        let mut status = self.write();
        status.message = format!(
            "Processing frames {}/{} ({}%)",
            snapshot.completed, snapshot.total, snapshot.percent
        );
        push_log(&mut status.log, format!("[PROGRESS] {}", snapshot.message()));
    }
}

fn push_log(log: &mut VecDeque<String>, line: String) {
    if log.len() == STATUS_LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::domain::resource_planner::ExecutionConfig;
    use std::time::Duration;

    #[test]
    fn test_starts_idle() {
        let board = StatusBoard::new();
        let status = board.snapshot();
        assert_eq!(status.phase, BatchPhase::Idle);
        assert_eq!(status.progress_percent, 0);
        assert!(status.log.is_empty());
    }

    #[test]
    fn test_begin_claims_and_resets() {
        let board = StatusBoard::new();
        board.status("BATCH", "old line");
        board.finish(BatchPhase::Completed, "done".to_string());

        assert!(board.begin(3, || {}));
        let status = board.snapshot();
        assert_eq!(status.phase, BatchPhase::Processing);
        assert_eq!(status.total_jobs, 3);
        assert_eq!(status.batch_index, 0);
        assert!(status.log.is_empty());
    }

    #[test]
    fn test_begin_rejected_while_processing_without_mutation() {
        let board = StatusBoard::new();
        assert!(board.begin(2, || {}));
        board.status("SETUP", "job 1/2");
        let before = board.snapshot();

        assert!(!board.begin(5, || {}));
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_begin_runs_reset_only_on_claim() {
        use std::cell::Cell;

        let board = StatusBoard::new();
        let reset_ran = Cell::new(false);
        assert!(board.begin(1, || reset_ran.set(true)));
        assert!(reset_ran.get());

        let rejected_reset_ran = Cell::new(false);
        assert!(!board.begin(1, || rejected_reset_ran.set(true)));
        assert!(!rejected_reset_ran.get());
    }

    #[test]
    fn test_log_evicts_oldest_at_capacity() {
        let board = StatusBoard::new();
        for i in 0..STATUS_LOG_CAPACITY + 10 {
            board.status("PROCESS", &format!("line {i}"));
        }
        let status = board.snapshot();
        assert_eq!(status.log.len(), STATUS_LOG_CAPACITY);
        assert_eq!(status.log.front().unwrap(), "[PROCESS] line 10");
        assert_eq!(
            status.log.back().unwrap(),
            &format!("[PROCESS] line {}", STATUS_LOG_CAPACITY + 9)
        );
    }

    #[test]
    fn test_progress_updates_message_and_log() {
        let board = StatusBoard::new();
        board.begin(1, || {});
        board.progress(&ProgressSnapshot {
            completed: 45,
            total: 90,
            percent: 50,
            elapsed: Duration::from_secs(9),
            remaining: Duration::from_secs(9),
            secs_per_frame: 0.2,
            config: ExecutionConfig {
                worker_count: 4,
                ..ExecutionConfig::cpu_only()
            },
        });
        let status = board.snapshot();
        assert_eq!(status.message, "Processing frames 45/90 (50%)");
        assert!(status.log.back().unwrap().starts_with("[PROGRESS]"));
        // Batch-level percent is owned by the orchestrator, not frame progress.
        assert_eq!(status.progress_percent, 0);
    }

    #[test]
    fn test_snapshot_is_a_detached_copy() {
        let board = StatusBoard::new();
        board.begin(1, || {});
        let snapshot = board.snapshot();
        board.status("PROCESS", "mutated after snapshot");
        assert_ne!(board.snapshot().message, snapshot.message);
    }
}
