pub mod config;
pub mod error;
pub mod geo;
pub mod glide;
pub mod manager;
pub mod models;
pub mod polar;
pub mod quadratic;
pub mod stats;
pub mod task;
pub mod zero_finder;
pub mod zone;

pub use config::{EngineConfig, FinishHeightRules, GlideConfig, TaskBehaviour};
pub use error::{PolarError, TaskError};
pub use geo::{
    cross_track_error, distance_bearing, intermediate_point, project_distance, GeoPoint,
    GeoVector,
};
pub use glide::{GlideResult, GlideState, MacCready, Solution, SolverMode};
pub use manager::TaskManager;
pub use models::{AircraftState, Waypoint};
pub use polar::{GlidePolar, PolarConfig};
pub use quadratic::Quadratic;
pub use stats::{DistanceStat, ElementStat, TaskStats};
pub use task::{
    ActiveState, AreaTarget, OrderedTask, PointKind, PointRole, TaskDefinition, TaskEvent,
    TaskPoint, TaskPointDefinition,
};
pub use zero_finder::ZeroFinder;
pub use zone::{CylinderZone, LineZone, ObservationZone, SectorZone, Zone, ZoneShape};
