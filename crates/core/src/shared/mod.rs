pub mod capacity;
pub mod constants;
pub mod job;
