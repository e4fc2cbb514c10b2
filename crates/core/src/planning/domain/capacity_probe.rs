use thiserror::Error;

use crate::shared::capacity::CapacitySnapshot;

#[derive(Error, Debug)]
pub enum CapacityError {
    #[error("capacity query failed: {0}")]
    Unavailable(String),
}

/// Queries host capacity (system memory, accelerator memory).
///
/// This is a port: the pipeline consumes snapshots but never implements
/// the introspection itself. A failed query is a degraded mode, not a
/// fatal condition — planning falls back to a CPU-only configuration.
pub trait CapacityProbe: Send + Sync {
    /// Capture a fresh snapshot of host capacity.
    fn snapshot(&self) -> Result<CapacitySnapshot, CapacityError>;
}
