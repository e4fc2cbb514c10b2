pub mod capacity_probe;
pub mod resource_planner;
