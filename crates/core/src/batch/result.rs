use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
}

/// Terminal record for one batch entry. Never mutated after append; the
/// results list and the batch status reset together when a new batch
/// starts.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchResult {
    pub source_name: String,
    pub target_name: String,
    pub output: Option<PathBuf>,
    pub outcome: JobOutcome,
}
