//! Engine configuration.
//!
//! Every struct deserializes with missing fields falling back to defaults, so
//! a configuration file only needs to name what it changes.

use crate::polar::PolarConfig;
use serde::{Deserialize, Serialize};

/// MacCready solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlideConfig {
    /// Expected climb rate in m/s
    pub mc: f64,
    /// Fraction of still-air cruise speed actually achieved
    pub cruise_efficiency: f64,
    /// Lowest airspeed evaluated by the speed scan
    pub v_min: f64,
    /// Highest airspeed evaluated by the speed scan
    pub v_max: f64,
    pub v_step: f64,
    /// Climb rate used to price borrowed height when `mc` is zero
    pub virtual_mc_floor: f64,
    /// Upper bound for the best-MacCready search
    pub mc_max: f64,
}

impl Default for GlideConfig {
    fn default() -> Self {
        Self {
            mc: 0.0,
            cruise_efficiency: 1.0,
            v_min: 1.0,
            v_max: 50.0,
            v_step: 0.5,
            virtual_mc_floor: 0.1,
            mc_max: 10.0,
        }
    }
}

/// Height limits a finish crossing must respect to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishHeightRules {
    /// Crossing above this altitude is ignored
    pub max_height: Option<f64>,
    /// Crossing below this altitude is ignored
    pub min_height: Option<f64>,
}

/// Task-level rules and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskBehaviour {
    /// Height above a point's elevation the glide must arrive with
    pub safety_height_arrival: f64,
    pub finish: FinishHeightRules,
    /// Once started, reject finish crossings more than 1000 m below the
    /// start exit altitude
    pub fai_finish: bool,
    /// Samples averaged by the incremental-speed filter
    pub speed_filter_samples: usize,
    /// Candidate points per ring in the area-target search
    pub isoline_samples: usize,
    /// Where on the isoline range the area target sits: 0 = shortest, 1 = longest
    pub aat_target_range: f64,
    /// Boundary samples per zone for the min/max distance search
    pub boundary_samples: usize,
}

impl Default for TaskBehaviour {
    fn default() -> Self {
        Self {
            safety_height_arrival: 300.0,
            finish: FinishHeightRules::default(),
            fai_finish: true,
            speed_filter_samples: 10,
            isoline_samples: 36,
            aat_target_range: 0.0,
            boundary_samples: 24,
        }
    }
}

/// Everything a [`crate::manager::TaskManager`] needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub polar: PolarConfig,
    pub glide: GlideConfig,
    pub task: TaskBehaviour,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"glide":{"mc":1.5},"task":{"finish":{"max_height":1200.0}}}"#)
                .unwrap();
        assert_eq!(config.glide.mc, 1.5);
        assert_eq!(config.glide.v_max, 50.0);
        assert_eq!(config.task.finish.max_height, Some(1200.0));
        assert_eq!(config.task.safety_height_arrival, 300.0);
        assert!(config.task.fai_finish);
        assert_eq!(config.polar, PolarConfig::default());
    }

    #[test]
    fn measured_polar_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"polar":{"kind":"measured","points":[[22.0,0.6],[30.0,0.8],[45.0,1.6]]}}"#,
        )
        .unwrap();
        assert!(matches!(config.polar, PolarConfig::Measured { .. }));
    }
}
