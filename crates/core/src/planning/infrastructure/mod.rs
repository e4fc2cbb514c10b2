pub mod static_probe;
pub mod system_probe;
