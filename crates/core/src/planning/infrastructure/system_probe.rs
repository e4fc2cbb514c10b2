use sysinfo::System;

use crate::planning::domain::capacity_probe::{CapacityError, CapacityProbe};
use crate::shared::capacity::CapacitySnapshot;

/// Probes system memory and core count through the OS.
///
/// Reports no accelerators: accelerator introspection belongs to the
/// inference subsystem (CUDA/CoreML/DirectML runtimes), which supplies its
/// own probe. On its own this adapter therefore plans CPU-only configs.
pub struct SystemCapacityProbe;

impl CapacityProbe for SystemCapacityProbe {
    fn snapshot(&self) -> Result<CapacitySnapshot, CapacityError> {
        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(CapacityError::Unavailable(
                "system reported zero total memory".to_string(),
            ));
        }

        Ok(CapacitySnapshot {
            system_total_bytes: total,
            system_available_bytes: system.available_memory(),
            physical_cores: num_cpus::get_physical().max(1),
            accelerators: Vec::new(),
        })
    }
}
