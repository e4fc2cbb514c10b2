use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::scheduling::domain::frame_processor::FrameProcessor;

/// Identifies one unit of work: an extracted frame on disk, or an index
/// into a source the processor resolves itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameId {
    Path(PathBuf),
    Index(usize),
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Path(path) => write!(f, "{}", path.display()),
            FrameId::Index(index) => write!(f, "frame #{index}"),
        }
    }
}

/// Processing capability enabled for a job.
///
/// Jobs carry an explicit capability set chosen at creation time;
/// processors consult it instead of a mutable module registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    FaceSwapper,
    FaceEnhancer,
}

/// Per-run switches that affect how frames and outputs are handled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub keep_fps: bool,
    pub keep_audio: bool,
    pub keep_frames: bool,
    pub many_faces: bool,
}

/// Everything a frame processor needs to know about its job.
///
/// Passed explicitly with each processing call so concurrent jobs never
/// share configuration through process-wide state.
#[derive(Clone, Debug, PartialEq)]
pub struct JobContext {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub output_path: PathBuf,
    pub capabilities: Vec<Capability>,
    pub options: JobOptions,
}

impl JobContext {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// One source+target request decomposed into per-frame units of work.
///
/// Frame order is irrelevant to correctness (frames are independent files
/// written in place) but fixes what "n of total" means for progress.
pub struct FrameJob {
    pub job_id: String,
    pub frames: Vec<FrameId>,
    pub context: JobContext,
    pub processor: Arc<dyn FrameProcessor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_display() {
        assert_eq!(FrameId::Index(42).to_string(), "frame #42");
        assert_eq!(
            FrameId::Path(PathBuf::from("/tmp/f_0001.png")).to_string(),
            "/tmp/f_0001.png"
        );
    }

    #[test]
    fn test_context_capability_lookup() {
        let ctx = JobContext {
            source_path: PathBuf::from("source.jpg"),
            target_path: PathBuf::from("target.mp4"),
            output_path: PathBuf::from("output.mp4"),
            capabilities: vec![Capability::FaceSwapper],
            options: JobOptions::default(),
        };
        assert!(ctx.has_capability(Capability::FaceSwapper));
        assert!(!ctx.has_capability(Capability::FaceEnhancer));
    }
}
