//! Core data models shared by the task and glide engines.

use crate::geo::{angle_limit_360, GeoPoint};
use serde::{Deserialize, Serialize};

/// A named location from the waypoint database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u32,
    pub name: String,
    pub location: GeoPoint,
    /// Elevation above sea level in meters
    #[serde(default)]
    pub altitude: f64,
}

impl Waypoint {
    pub fn new(id: u32, name: impl Into<String>, location: GeoPoint, altitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            altitude,
        }
    }
}

/// One navigation fix as delivered by the device layer.
///
/// Units are SI: meters, m/s, degrees, seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AircraftState {
    pub location: GeoPoint,
    /// Altitude above sea level
    pub altitude: f64,
    #[serde(default)]
    pub ground_speed: f64,
    #[serde(default)]
    pub true_airspeed: f64,
    /// Ground track in degrees
    #[serde(default)]
    pub track: f64,
    #[serde(default)]
    pub wind_speed: f64,
    /// Direction the wind blows from, degrees
    #[serde(default)]
    pub wind_direction: f64,
    /// Monotonic sample time in seconds
    pub time: f64,
}

impl AircraftState {
    /// Create a state with only position, altitude and time.
    pub fn new(location: GeoPoint, altitude: f64, time: f64) -> Self {
        Self {
            location,
            altitude,
            time,
            ..Self::default()
        }
    }

    pub fn with_wind(mut self, wind_speed: f64, wind_direction: f64) -> Self {
        self.wind_speed = wind_speed;
        self.wind_direction = angle_limit_360(wind_direction);
        self
    }

    pub fn with_velocity(mut self, ground_speed: f64, true_airspeed: f64, track: f64) -> Self {
        self.ground_speed = ground_speed;
        self.true_airspeed = true_airspeed;
        self.track = angle_limit_360(track);
        self
    }

    /// Direction the air mass moves towards.
    pub fn wind_towards(&self) -> f64 {
        angle_limit_360(self.wind_direction + 180.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wind_towards_is_reciprocal() {
        let state = AircraftState::new(GeoPoint::new(0.0, 0.0), 1000.0, 0.0).with_wind(5.0, 270.0);
        assert_eq!(state.wind_towards(), 90.0);
    }

    #[test]
    fn state_defaults_when_deserialized() {
        let state: AircraftState = serde_json::from_str(
            r#"{"location":{"latitude":1.0,"longitude":2.0},"altitude":500.0,"time":12.5}"#,
        )
        .unwrap();
        assert_eq!(state.wind_speed, 0.0);
        assert_eq!(state.location, GeoPoint::new(1.0, 2.0));
    }
}
