pub mod frame_processor;
pub mod frame_scheduler;
