//! Error types for task construction and configuration.
//!
//! Flight-physics infeasibility is not an error; see [`crate::glide::Solution`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("task has no points")]
    EmptyTask,
    #[error("first task point must be a start")]
    NoStart,
    #[error("last task point must be a finish")]
    NoFinish,
    #[error("index {index} out of range for task of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{role} point not allowed at position {index}")]
    MisplacedRole { index: usize, role: &'static str },
    #[error("zone of point {index} has invalid radius {radius}")]
    InvalidZone { index: usize, radius: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolarError {
    #[error("polar reference speed must be positive, got {0}")]
    InvalidReferenceSpeed(f64),
    #[error("polar must curve upwards with positive sink at zero speed")]
    NotConvex,
    #[error("polar points must have three distinct speeds")]
    DegeneratePoints,
}
