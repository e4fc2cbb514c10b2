pub mod batch;
pub mod planning;
pub mod progress;
pub mod scheduling;
pub mod shared;
