use crate::progress::tracker::ProgressSnapshot;

/// Receives pipeline status on behalf of some presentation surface.
///
/// The pipeline only aggregates; persistence and rendering live behind
/// this port. Scope labels ("BATCH", "SETUP", "PROCESS", "ERROR", or a
/// processor-chosen tag) let the surface group related lines.
pub trait StatusSink: Send + Sync {
    /// A human-readable status line tagged with its originating scope.
    fn status(&self, scope: &str, message: &str);

    /// Structured frame progress for the active job.
    fn progress(&self, snapshot: &ProgressSnapshot);
}

/// Routes status through the `log` facade.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn status(&self, scope: &str, message: &str) {
        log::info!("[{scope}] {message}");
    }

    fn progress(&self, snapshot: &ProgressSnapshot) {
        log::info!("{}", snapshot.message());
    }
}

/// Discards all status. For embedders with their own surface and tests
/// where output is irrelevant.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn status(&self, _scope: &str, _message: &str) {}
    fn progress(&self, _snapshot: &ProgressSnapshot) {}
}
