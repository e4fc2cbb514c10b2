pub mod orchestrator;
pub mod result;
pub mod status;
