/// Memory state of one accelerator at capture time.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceleratorInfo {
    pub id: u32,
    pub name: String,
    pub total_bytes: u64,
    pub allocated_bytes: u64,
    pub reserved_bytes: u64,
    pub free_bytes: u64,
}

/// Point-in-time view of host capacity.
///
/// Immutable once captured. Capacity drifts over the process lifetime
/// (other tenants, allocator churn), so callers take a fresh snapshot
/// before every planning decision instead of caching one.
#[derive(Clone, Debug, PartialEq)]
pub struct CapacitySnapshot {
    pub system_total_bytes: u64,
    pub system_available_bytes: u64,
    pub physical_cores: usize,
    pub accelerators: Vec<AcceleratorInfo>,
}

impl CapacitySnapshot {
    /// The accelerator planning decisions are judged against, if any.
    pub fn primary_accelerator(&self) -> Option<&AcceleratorInfo> {
        self.accelerators.first()
    }
}
