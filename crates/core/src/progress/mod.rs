pub mod handle;
pub mod status_sink;
pub mod tracker;
