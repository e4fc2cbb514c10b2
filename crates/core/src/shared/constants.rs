pub const GIB: u64 = 1024 * 1024 * 1024;

/// Hard cap on frame-processing workers to avoid oversubscription.
pub const MAX_WORKER_COUNT: usize = 8;

/// Single cutoff between conservative and aggressive accelerator use.
pub const ACCEL_MEMORY_CUTOFF_BYTES: u64 = 8 * GIB;

pub const ACCEL_FRACTION_CONSERVATIVE: f64 = 0.6;
pub const ACCEL_FRACTION_AGGRESSIVE: f64 = 0.8;
/// Reserved for hosted/cloud environments with dedicated accelerators.
pub const ACCEL_FRACTION_HOSTED: f64 = 0.85;

/// Below this much available system memory the ceiling is clamped hard.
pub const LOW_SYSTEM_MEMORY_BYTES: u64 = 8 * GIB;
pub const LOW_SYSTEM_MEMORY_CEILING_BYTES: u64 = 4 * GIB;
/// Share of available memory the pipeline may claim on a healthy host.
pub const SYSTEM_MEMORY_SHARE: f64 = 0.7;
pub const MAX_MEMORY_CEILING_BYTES: u64 = 8 * GIB;

/// Share of free accelerator memory usable for inference batching.
pub const BATCH_MEMORY_SHARE: f64 = 0.7;
/// Batch sizes above this add latency variance without throughput gain.
pub const MAX_BATCH_SIZE: usize = 8;

/// Default detector input size used for per-sample memory estimates.
pub const DEFAULT_INPUT_WIDTH: u32 = 640;
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;
pub const SAMPLE_CHANNELS: u64 = 3;
pub const SAMPLE_BYTE_WIDTH: u64 = 4;

/// Minimum interval between progress emissions.
pub const PROGRESS_EMIT_INTERVAL_MS: u64 = 500;

/// Bounded status log; oldest entries are evicted first.
pub const STATUS_LOG_CAPACITY: usize = 50;
