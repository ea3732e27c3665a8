//! Flight simulation for driving the task engine without a device.

pub mod paths;
pub mod scenarios;

pub use paths::{CircularPath, FlightPath, GpsNoise, LinearPath, SegmentedPath};
pub use scenarios::{task_scenario, triangle_scenario, Scenario};
