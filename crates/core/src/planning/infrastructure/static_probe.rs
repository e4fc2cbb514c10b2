use crate::planning::domain::capacity_probe::{CapacityError, CapacityProbe};
use crate::shared::capacity::CapacitySnapshot;

/// Returns a fixed snapshot on every query.
///
/// Useful when capacity is supplied from outside (CLI overrides, a hosted
/// environment's known hardware) and in tests.
pub struct StaticCapacityProbe {
    snapshot: CapacitySnapshot,
}

impl StaticCapacityProbe {
    pub fn new(snapshot: CapacitySnapshot) -> Self {
        Self { snapshot }
    }
}

impl CapacityProbe for StaticCapacityProbe {
    fn snapshot(&self) -> Result<CapacitySnapshot, CapacityError> {
        Ok(self.snapshot.clone())
    }
}
