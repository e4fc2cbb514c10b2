use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::planning::domain::resource_planner::ExecutionConfig;
use crate::shared::constants::{GIB, PROGRESS_EMIT_INTERVAL_MS};

/// Structured progress for one frame job, handed to the status sink.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub secs_per_frame: f64,
    /// The configuration the job is running under, carried for diagnostic
    /// display alongside the counters.
    pub config: ExecutionConfig,
}

impl ProgressSnapshot {
    /// One-line rendering for log-style sinks.
    pub fn message(&self) -> String {
        format!(
            "{:3}% | {}/{} [{}<{}, {:.2}s/frame, {} workers, {}]",
            self.percent,
            self.completed,
            self.total,
            format_interval(self.elapsed),
            format_interval(self.remaining),
            self.secs_per_frame,
            self.config.worker_count,
            execution_summary(&self.config),
        )
    }
}

/// Compact device/memory postfix: `cpu` or `accel[ids]@fraction`, followed
/// by the memory ceiling when one is set.
fn execution_summary(config: &ExecutionConfig) -> String {
    let device = if config.accelerator_ids.is_empty() {
        "cpu".to_string()
    } else {
        let ids = config
            .accelerator_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        match config.accelerator_memory_fraction {
            Some(fraction) => format!("accel[{ids}]@{fraction:.2}"),
            None => format!("accel[{ids}]"),
        }
    };
    match config.memory_ceiling_bytes {
        Some(bytes) => format!("{device}, ceiling {:.1} GiB", bytes as f64 / GIB as f64),
        None => device,
    }
}

/// `floor(100 * completed / total)`, with an empty job reporting 0.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed.min(total) * 100 / total) as u8
}

/// Renders a duration as `MM:SS`, growing to `H:MM:SS` past an hour.
pub fn format_interval(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let (hours, mins, secs) = (total_secs / 3600, total_secs % 3600 / 60, total_secs % 60);
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// Aggregates unit-of-work completions for one frame job.
///
/// Completion callbacks arrive concurrently from whichever worker finished;
/// the counter is atomic and the throttle window is mutex-guarded, so
/// callers need no synchronization of their own.
///
/// Emission is throttled to one snapshot per interval to bound status
/// traffic under high completion rates. The final completion is always
/// emitted so observers see a terminal 100% update.
pub struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    started: Instant,
    last_emit: Mutex<Option<Instant>>,
    emit_interval: Duration,
    config: ExecutionConfig,
}

impl ProgressTracker {
    pub fn new(total: usize, config: &ExecutionConfig) -> Self {
        Self::with_emit_interval(
            total,
            config,
            Duration::from_millis(PROGRESS_EMIT_INTERVAL_MS),
        )
    }

    pub fn with_emit_interval(
        total: usize,
        config: &ExecutionConfig,
        emit_interval: Duration,
    ) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            started: Instant::now(),
            last_emit: Mutex::new(None),
            emit_interval,
            config: config.clone(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Record one completed unit of work.
    ///
    /// Returns a snapshot when an emission is due: the throttle interval
    /// has passed, or this completion is the final one.
    pub fn record_completion(&self) -> Option<ProgressSnapshot> {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let is_final = completed == self.total;

        {
            let mut last = self.last_emit.lock().unwrap_or_else(|e| e.into_inner());
            if !is_final {
                if let Some(previous) = *last {
                    if previous.elapsed() < self.emit_interval {
                        return None;
                    }
                }
            }
            *last = Some(Instant::now());
        }

        Some(self.snapshot_at(completed))
    }

    fn snapshot_at(&self, completed: usize) -> ProgressSnapshot {
        let elapsed = self.started.elapsed();
        let (secs_per_frame, remaining) = if completed == 0 {
            (0.0, Duration::ZERO)
        } else {
            let rate = elapsed.as_secs_f64() / completed as f64;
            let left = self.total.saturating_sub(completed);
            (rate, Duration::from_secs_f64(rate * left as f64))
        };

        ProgressSnapshot {
            completed,
            total: self.total,
            percent: percent(completed, self.total),
            elapsed,
            remaining,
            secs_per_frame,
            config: self.config.clone(),
        }
    }
}
