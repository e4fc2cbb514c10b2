pub mod threaded_frame_scheduler;
