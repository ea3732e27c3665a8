//! Ordered task: points, crossings, and course geometry.

pub mod aat;
pub mod ordered;
pub mod point;
pub mod search;

pub use ordered::OrderedTask;
pub use point::{ActiveState, AreaTarget, PointKind, PointRole, TaskPoint};

use crate::models::Waypoint;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};

/// Something that happened to the task on one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    Entered { index: usize, time: f64 },
    Exited { index: usize, time: f64 },
    ActiveAdvanced { from: usize, to: usize },
    Started { time: f64 },
    Finished { time: f64 },
}

/// One point of a task as supplied by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPointDefinition {
    pub waypoint: Waypoint,
    pub kind: PointKind,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub name: String,
    pub points: Vec<TaskPointDefinition>,
}
