use crate::planning::domain::capacity_probe::CapacityProbe;
use crate::shared::capacity::{AcceleratorInfo, CapacitySnapshot};
use crate::shared::constants::{
    ACCEL_FRACTION_AGGRESSIVE, ACCEL_FRACTION_CONSERVATIVE, ACCEL_FRACTION_HOSTED,
    ACCEL_MEMORY_CUTOFF_BYTES, BATCH_MEMORY_SHARE, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH, GIB,
    LOW_SYSTEM_MEMORY_BYTES, LOW_SYSTEM_MEMORY_CEILING_BYTES, MAX_BATCH_SIZE,
    MAX_MEMORY_CEILING_BYTES, MAX_WORKER_COUNT, SAMPLE_BYTE_WIDTH, SAMPLE_CHANNELS,
    SYSTEM_MEMORY_SHARE,
};

/// Tuned concurrency and memory parameters for one job.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionConfig {
    pub worker_count: usize,
    pub memory_ceiling_bytes: Option<u64>,
    /// Uniform share of each listed accelerator's memory the job may claim.
    /// `None` in CPU-only mode.
    pub accelerator_memory_fraction: Option<f64>,
    pub accelerator_ids: Vec<u32>,
    pub recommended_batch_size: usize,
}

impl ExecutionConfig {
    /// Degraded configuration used when no accelerator capacity is known.
    pub fn cpu_only() -> Self {
        Self {
            worker_count: 1,
            memory_ceiling_bytes: Some(LOW_SYSTEM_MEMORY_CEILING_BYTES),
            accelerator_memory_fraction: None,
            accelerator_ids: Vec::new(),
            recommended_batch_size: 1,
        }
    }
}

/// Caller preferences that bias the plan.
#[derive(Clone, Debug, Default)]
pub struct PlanHints {
    /// Raise the memory ceiling to at least this many GiB.
    pub min_memory_gb: Option<u64>,
    /// Force the conservative accelerator fraction regardless of capacity.
    pub conservative: bool,
    /// Hosted/cloud environment with a dedicated accelerator; permits the
    /// highest memory fraction.
    pub hosted: bool,
}

/// Rough per-sample inference cost, scaled from input geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelComplexity {
    Low,
    #[default]
    Medium,
    High,
}

impl ModelComplexity {
    fn multiplier(self) -> f64 {
        match self {
            ModelComplexity::Low => 0.1,
            ModelComplexity::Medium => 0.3,
            ModelComplexity::High => 0.6,
        }
    }
}

/// Derive an execution configuration from a capacity snapshot.
///
/// Pure function of its inputs: capacity is expected to be re-sampled and
/// `plan` re-run before each job, so it must be safe to call repeatedly.
pub fn plan(capacity: &CapacitySnapshot, hints: &PlanHints) -> ExecutionConfig {
    let worker_count = capacity.physical_cores.clamp(1, MAX_WORKER_COUNT);
    let memory_ceiling_bytes = Some(memory_ceiling(capacity.system_available_bytes, hints));

    match capacity.primary_accelerator() {
        Some(primary) => ExecutionConfig {
            worker_count,
            memory_ceiling_bytes,
            accelerator_memory_fraction: Some(accelerator_fraction(primary, hints)),
            accelerator_ids: capacity.accelerators.iter().map(|a| a.id).collect(),
            recommended_batch_size: recommended_batch_size(
                primary.free_bytes,
                DEFAULT_INPUT_WIDTH,
                DEFAULT_INPUT_HEIGHT,
                ModelComplexity::default(),
            ),
        },
        None => ExecutionConfig {
            worker_count,
            memory_ceiling_bytes,
            ..ExecutionConfig::cpu_only()
        },
    }
}

/// Take a fresh snapshot and plan from it, degrading to CPU-only when the
/// capacity query fails.
pub fn plan_with_probe(probe: &dyn CapacityProbe, hints: &PlanHints) -> ExecutionConfig {
    match probe.snapshot() {
        Ok(capacity) => plan(&capacity, hints),
        Err(e) => {
            log::warn!("capacity query failed, planning CPU-only: {e}");
            ExecutionConfig::cpu_only()
        }
    }
}

fn accelerator_fraction(primary: &AcceleratorInfo, hints: &PlanHints) -> f64 {
    if hints.hosted {
        ACCEL_FRACTION_HOSTED
    } else if hints.conservative || primary.total_bytes < ACCEL_MEMORY_CUTOFF_BYTES {
        ACCEL_FRACTION_CONSERVATIVE
    } else {
        ACCEL_FRACTION_AGGRESSIVE
    }
}

fn memory_ceiling(available_bytes: u64, hints: &PlanHints) -> u64 {
    let ceiling = if available_bytes < LOW_SYSTEM_MEMORY_BYTES {
        LOW_SYSTEM_MEMORY_CEILING_BYTES
    } else {
        let share = (available_bytes as f64 * SYSTEM_MEMORY_SHARE) as u64;
        share.min(MAX_MEMORY_CEILING_BYTES)
    };
    match hints.min_memory_gb {
        Some(gb) => ceiling.max(gb * GIB),
        None => ceiling,
    }
}

/// Batch size that fits a safety share of free accelerator memory, floored
/// at 1 and capped to bound latency variance.
pub fn recommended_batch_size(
    free_accel_bytes: u64,
    input_width: u32,
    input_height: u32,
    complexity: ModelComplexity,
) -> usize {
    let per_sample_bytes = (input_width as u64 * input_height as u64
        * SAMPLE_CHANNELS
        * SAMPLE_BYTE_WIDTH) as f64
        * complexity.multiplier();
    if per_sample_bytes <= 0.0 {
        return 1;
    }
    let fits = (free_accel_bytes as f64 * BATCH_MEMORY_SHARE / per_sample_bytes) as usize;
    fits.clamp(1, MAX_BATCH_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::domain::capacity_probe::CapacityError;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn snapshot_with_accel(total_gib: u64, free_gib: u64) -> CapacitySnapshot {
        CapacitySnapshot {
            system_total_bytes: 32 * GIB,
            system_available_bytes: 16 * GIB,
            physical_cores: 4,
            accelerators: vec![AcceleratorInfo {
                id: 0,
                name: "test-gpu".to_string(),
                total_bytes: total_gib * GIB,
                allocated_bytes: 0,
                reserved_bytes: 0,
                free_bytes: free_gib * GIB,
            }],
        }
    }

    fn cpu_snapshot(available_bytes: u64, cores: usize) -> CapacitySnapshot {
        CapacitySnapshot {
            system_total_bytes: available_bytes * 2,
            system_available_bytes: available_bytes,
            physical_cores: cores,
            accelerators: vec![],
        }
    }

    #[rstest]
    #[case(6, 0.6)]
    #[case(16, 0.8)]
    fn test_fraction_by_accelerator_capacity(#[case] total_gib: u64, #[case] expected: f64) {
        let config = plan(&snapshot_with_accel(total_gib, total_gib), &PlanHints::default());
        assert_relative_eq!(config.accelerator_memory_fraction.unwrap(), expected);
    }

    #[test]
    fn test_hosted_hint_permits_highest_fraction() {
        let hints = PlanHints {
            hosted: true,
            ..PlanHints::default()
        };
        let config = plan(&snapshot_with_accel(16, 12), &hints);
        assert_relative_eq!(config.accelerator_memory_fraction.unwrap(), 0.85);
    }

    #[test]
    fn test_conservative_hint_overrides_capacity() {
        let hints = PlanHints {
            conservative: true,
            ..PlanHints::default()
        };
        let config = plan(&snapshot_with_accel(24, 20), &hints);
        assert_relative_eq!(config.accelerator_memory_fraction.unwrap(), 0.6);
    }

    #[rstest]
    #[case(2, 2)]
    #[case(8, 8)]
    #[case(16, 8)]
    #[case(0, 1)]
    fn test_worker_count_clamped(#[case] cores: usize, #[case] expected: usize) {
        let config = plan(&cpu_snapshot(16 * GIB, cores), &PlanHints::default());
        assert_eq!(config.worker_count, expected);
    }

    #[test]
    fn test_no_accelerator_yields_cpu_only_fields() {
        let config = plan(&cpu_snapshot(16 * GIB, 4), &PlanHints::default());
        assert!(config.accelerator_memory_fraction.is_none());
        assert!(config.accelerator_ids.is_empty());
        assert_eq!(config.recommended_batch_size, 1);
    }

    #[test]
    fn test_low_system_memory_clamps_ceiling() {
        let config = plan(&cpu_snapshot(6 * GIB, 4), &PlanHints::default());
        assert_eq!(config.memory_ceiling_bytes, Some(4 * GIB));
    }

    #[test]
    fn test_healthy_memory_takes_share_up_to_cap() {
        // 70% of 10 GiB = 7 GiB, below the 8 GiB cap.
        let config = plan(&cpu_snapshot(10 * GIB, 4), &PlanHints::default());
        let expected = ((10 * GIB) as f64 * SYSTEM_MEMORY_SHARE) as u64;
        assert_eq!(config.memory_ceiling_bytes, Some(expected));

        // 70% of 64 GiB would exceed the cap.
        let config = plan(&cpu_snapshot(64 * GIB, 4), &PlanHints::default());
        assert_eq!(config.memory_ceiling_bytes, Some(8 * GIB));
    }

    #[test]
    fn test_min_memory_hint_raises_ceiling() {
        let hints = PlanHints {
            min_memory_gb: Some(12),
            ..PlanHints::default()
        };
        let config = plan(&cpu_snapshot(6 * GIB, 4), &hints);
        assert_eq!(config.memory_ceiling_bytes, Some(12 * GIB));
    }

    #[test]
    fn test_batch_size_floor_and_cap() {
        // Effectively no free memory still yields a usable batch of 1.
        assert_eq!(
            recommended_batch_size(1024, 640, 640, ModelComplexity::High),
            1
        );
        // Huge headroom is capped at 8.
        assert_eq!(
            recommended_batch_size(48 * GIB, 640, 640, ModelComplexity::Low),
            8
        );
    }

    #[test]
    fn test_batch_size_scales_with_complexity() {
        let free = 8 * GIB;
        let low = recommended_batch_size(free, 1920, 1080, ModelComplexity::Low);
        let high = recommended_batch_size(free, 1920, 1080, ModelComplexity::High);
        assert!(low >= high);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let snapshot = snapshot_with_accel(16, 12);
        let hints = PlanHints::default();
        assert_eq!(plan(&snapshot, &hints), plan(&snapshot, &hints));
    }

    struct FailingProbe;

    impl CapacityProbe for FailingProbe {
        fn snapshot(&self) -> Result<CapacitySnapshot, CapacityError> {
            Err(CapacityError::Unavailable("nvml not loaded".to_string()))
        }
    }

    #[test]
    fn test_probe_failure_degrades_to_cpu_only() {
        let config = plan_with_probe(&FailingProbe, &PlanHints::default());
        assert_eq!(config, ExecutionConfig::cpu_only());
    }
}
