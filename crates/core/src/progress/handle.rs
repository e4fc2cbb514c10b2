use std::sync::Arc;

use crate::progress::status_sink::StatusSink;
use crate::progress::tracker::ProgressTracker;

/// Pairs a job's progress tracker with the registered status sink.
///
/// Cloned into every worker. The scheduler calls [`frame_done`] once per
/// frame; processors may use [`status`] to surface their own scope-tagged
/// messages through the same sink.
///
/// [`frame_done`]: ProgressHandle::frame_done
/// [`status`]: ProgressHandle::status
#[derive(Clone)]
pub struct ProgressHandle {
    tracker: Arc<ProgressTracker>,
    sink: Arc<dyn StatusSink>,
}

impl ProgressHandle {
    pub fn new(tracker: Arc<ProgressTracker>, sink: Arc<dyn StatusSink>) -> Self {
        Self { tracker, sink }
    }

    /// Record one completed unit of work, forwarding a snapshot to the
    /// sink when the tracker decides an emission is due.
    pub fn frame_done(&self) {
        if let Some(snapshot) = self.tracker.record_completion() {
            self.sink.progress(&snapshot);
        }
    }

    pub fn status(&self, scope: &str, message: &str) {
        self.sink.status(scope, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::domain::resource_planner::ExecutionConfig;
    use crate::progress::tracker::ProgressSnapshot;
    use std::sync::Mutex;
    use std::time::Duration;

    struct CollectingSink {
        progress: Mutex<Vec<ProgressSnapshot>>,
        lines: Mutex<Vec<String>>,
    }

    impl CollectingSink {
        fn new() -> Self {
            Self {
                progress: Mutex::new(Vec::new()),
                lines: Mutex::new(Vec::new()),
            }
        }
    }

    impl StatusSink for CollectingSink {
        fn status(&self, scope: &str, message: &str) {
            self.lines.lock().unwrap().push(format!("[{scope}] {message}"));
        }

        fn progress(&self, snapshot: &ProgressSnapshot) {
            self.progress.lock().unwrap().push(snapshot.clone());
        }
    }

    #[test]
    fn test_frame_done_forwards_emitted_snapshots() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = Arc::new(ProgressTracker::with_emit_interval(
            2,
            &ExecutionConfig::cpu_only(),
            Duration::ZERO,
        ));
        let handle = ProgressHandle::new(tracker, sink.clone());

        handle.frame_done();
        handle.frame_done();

        let seen = sink.progress.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].percent, 100);
    }

    #[test]
    fn test_status_is_scope_tagged() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = Arc::new(ProgressTracker::with_emit_interval(
            1,
            &ExecutionConfig::cpu_only(),
            Duration::ZERO,
        ));
        let handle = ProgressHandle::new(tracker, sink.clone());

        handle.status("FACE-SWAPPER", "loaded model");
        assert_eq!(
            sink.lines.lock().unwrap().as_slice(),
            ["[FACE-SWAPPER] loaded model"]
        );
    }
}
