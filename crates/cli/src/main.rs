use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use reface_core::batch::orchestrator::{BatchJob, BatchOrchestrator};
use reface_core::batch::status::BatchPhase;
use reface_core::planning::domain::capacity_probe::CapacityProbe;
use reface_core::planning::domain::resource_planner::{plan_with_probe, PlanHints};
use reface_core::planning::infrastructure::static_probe::StaticCapacityProbe;
use reface_core::planning::infrastructure::system_probe::SystemCapacityProbe;
use reface_core::progress::handle::ProgressHandle;
use reface_core::scheduling::domain::frame_processor::{FrameProcessor, ProcessingError};
use reface_core::scheduling::infrastructure::threaded_frame_scheduler::ThreadedFrameScheduler;
use reface_core::shared::capacity::AcceleratorInfo;
use reface_core::shared::constants::GIB;
use reface_core::shared::job::{Capability, FrameId, JobContext, JobOptions};

/// Planning and benchmarking front end for the reface pipeline.
#[derive(Parser)]
#[command(name = "reface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the execution configuration planned for this host.
    Plan {
        /// Simulate an accelerator with this much total memory (GiB).
        #[arg(long)]
        accel_total_gb: Option<u64>,

        /// Free memory of the simulated accelerator (GiB, defaults to total).
        #[arg(long)]
        accel_free_gb: Option<u64>,

        /// Plan for a hosted/cloud environment.
        #[arg(long)]
        hosted: bool,

        /// Force the conservative accelerator memory fraction.
        #[arg(long)]
        conservative: bool,

        /// Raise the memory ceiling to at least this many GiB.
        #[arg(long)]
        min_memory_gb: Option<u64>,
    },
    /// Run a synthetic batch through the full pipeline and poll its status.
    Bench {
        /// Number of jobs in the batch.
        #[arg(long, default_value = "2")]
        jobs: usize,

        /// Frames per job.
        #[arg(long, default_value = "120")]
        frames: usize,

        /// Simulated per-frame processing time.
        #[arg(long, default_value = "5")]
        delay_ms: u64,

        /// Fail this frame index in every job.
        #[arg(long)]
        fail_frame: Option<usize>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Plan {
            accel_total_gb,
            accel_free_gb,
            hosted,
            conservative,
            min_memory_gb,
        } => run_plan(accel_total_gb, accel_free_gb, hosted, conservative, min_memory_gb),
        Command::Bench {
            jobs,
            frames,
            delay_ms,
            fail_frame,
        } => run_bench(jobs, frames, delay_ms, fail_frame),
    }
}

fn run_plan(
    accel_total_gb: Option<u64>,
    accel_free_gb: Option<u64>,
    hosted: bool,
    conservative: bool,
    min_memory_gb: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let probe = build_probe(accel_total_gb, accel_free_gb)?;
    let hints = PlanHints {
        min_memory_gb,
        conservative,
        hosted,
    };
    let config = plan_with_probe(&*probe, &hints);

    println!("worker_count:            {}", config.worker_count);
    match config.memory_ceiling_bytes {
        Some(bytes) => println!("memory_ceiling:          {:.1} GiB", bytes as f64 / GIB as f64),
        None => println!("memory_ceiling:          none"),
    }
    match config.accelerator_memory_fraction {
        Some(fraction) => println!("accelerator_fraction:    {fraction}"),
        None => println!("accelerator_fraction:    none (CPU-only)"),
    }
    println!("accelerator_ids:         {:?}", config.accelerator_ids);
    println!("recommended_batch_size:  {}", config.recommended_batch_size);
    Ok(())
}

fn build_probe(
    accel_total_gb: Option<u64>,
    accel_free_gb: Option<u64>,
) -> Result<Box<dyn CapacityProbe>, Box<dyn std::error::Error>> {
    let Some(total_gb) = accel_total_gb else {
        return Ok(Box::new(SystemCapacityProbe));
    };

    let free_gb = accel_free_gb.unwrap_or(total_gb).min(total_gb);
    let mut snapshot = SystemCapacityProbe.snapshot()?;
    snapshot.accelerators = vec![AcceleratorInfo {
        id: 0,
        name: "simulated".to_string(),
        total_bytes: total_gb * GIB,
        allocated_bytes: 0,
        reserved_bytes: 0,
        free_bytes: free_gb * GIB,
    }];
    Ok(Box::new(StaticCapacityProbe::new(snapshot)))
}

/// Stand-in for the inference subsystem: sleeps per frame, optionally fails
/// one frame index to exercise the failure-isolation paths.
struct SyntheticProcessor {
    delay: Duration,
    fail_frame: Option<usize>,
}

impl FrameProcessor for SyntheticProcessor {
    fn process(
        &self,
        _ctx: &JobContext,
        frames: &[FrameId],
        _progress: &ProgressHandle,
    ) -> Result<(), ProcessingError> {
        thread::sleep(self.delay);
        for frame in frames {
            if let FrameId::Index(index) = frame {
                if Some(*index) == self.fail_frame {
                    return Err(ProcessingError::Frame {
                        frame: frame.clone(),
                        reason: "synthetic failure".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn run_bench(
    jobs: usize,
    frames: usize,
    delay_ms: u64,
    fail_frame: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = BatchOrchestrator::new(
        Arc::new(ThreadedFrameScheduler::new()),
        Arc::new(SystemCapacityProbe),
        Arc::new(SyntheticProcessor {
            delay: Duration::from_millis(delay_ms),
            fail_frame,
        }),
        PlanHints::default(),
    );

    let batch = (0..jobs)
        .map(|i| BatchJob {
            source_path: PathBuf::from("bench_face.jpg"),
            target_path: PathBuf::from(format!("bench_clip_{i}.mp4")),
            output_path: PathBuf::from(format!("bench_output_{i}.mp4")),
            frames: (0..frames).map(FrameId::Index).collect(),
            capabilities: vec![Capability::FaceSwapper],
            options: JobOptions::default(),
        })
        .collect();

    log::info!("starting synthetic batch: {jobs} job(s), {frames} frame(s) each");
    let handle = orchestrator.start(batch)?;

    // Poll the status surface the way an external consumer would.
    let mut last_message = String::new();
    loop {
        let status = orchestrator.status();
        if status.message != last_message {
            println!(
                "[{:3}%] {}",
                status.progress_percent, status.message
            );
            last_message = status.message;
        }
        if matches!(status.phase, BatchPhase::Completed | BatchPhase::Error) {
            break;
        }
        thread::sleep(Duration::from_millis(200));
    }
    handle.wait();

    println!("\nresults:");
    for result in orchestrator.results() {
        println!(
            "  {} + {} -> {:?} ({:?})",
            result.source_name, result.target_name, result.output, result.outcome
        );
    }
    Ok(())
}
