//! Pre-defined tasks with a flight through them.

use super::paths::{CircularPath, FlightPath, LinearPath, SegmentedPath};
use soar_core::{AircraftState, GeoPoint, OrderedTask, TaskPoint, Waypoint, Zone};
use std::sync::Arc;

const CRUISE_SPEED: f64 = 30.0;
const CRUISE_SINK: f64 = 0.4;

/// A task plus the flight that is supposed to complete it.
pub struct Scenario {
    pub name: String,
    pub task: OrderedTask,
    pub path: Arc<dyn FlightPath>,
    /// Wind speed (m/s) and the direction it blows from
    pub wind: (f64, f64),
}

impl Scenario {
    pub fn with_wind(mut self, speed: f64, direction: f64) -> Self {
        self.wind = (speed, direction);
        self
    }

    /// Fixes every `step` seconds from the start of the path to its end.
    pub fn samples(&self, step: f64) -> Vec<AircraftState> {
        let duration = self.path.duration();
        let step = step.max(0.1);
        let count = (duration / step).ceil() as usize;
        (0..=count)
            .map(|i| {
                let t = (i as f64 * step).min(duration);
                self.path.state(t).with_wind(self.wind.0, self.wind.1)
            })
            .collect()
    }
}

/// Triangle around `origin`: start cylinder, FAI sector turn 30 km east,
/// a 5 km area 30 km north of the turn and a finish 10 km south of the
/// start. The flight thermals once, just past the turn.
pub fn triangle_scenario(origin: GeoPoint) -> Scenario {
    let turn = origin.destination(90.0, 30_000.0);
    let area = turn.destination(0.0, 30_000.0);
    let finish = origin.destination(180.0, 10_000.0);

    let task = OrderedTask::from_points(vec![
        TaskPoint::start(
            Waypoint::new(1, "Start", origin, 200.0),
            Zone::cylinder(origin, 1000.0),
        ),
        TaskPoint::turn(
            Waypoint::new(2, "Turn", turn, 300.0),
            Zone::fai_sector(turn, 3000.0),
        ),
        TaskPoint::area(
            Waypoint::new(3, "Area", area, 250.0),
            Zone::cylinder(area, 5000.0),
        ),
        TaskPoint::finish(
            Waypoint::new(4, "Finish", finish, 200.0),
            Zone::cylinder(finish, 1000.0),
        ),
    ]);

    // the sector opens to the south-east, away from both legs
    let rounding = turn.destination(135.0, 1000.0);
    let mut path = SegmentedPath::through(&[origin, rounding], 2000.0, CRUISE_SPEED, CRUISE_SINK);

    let radius = 120.0;
    let mut thermal = CircularPath::new(
        rounding.destination(0.0, radius),
        radius,
        path.end_altitude().unwrap_or(2000.0),
        2.5,
        25.0,
        10.0,
    );
    thermal.start_angle = 180.0;
    let top = thermal.position(thermal.duration()).1;
    path.push(Box::new(thermal));

    let mut altitude = top;
    for pair in [rounding, area, finish].windows(2) {
        let leg = LinearPath::new(pair[0], pair[1], altitude, CRUISE_SPEED).with_sink(CRUISE_SINK);
        altitude -= CRUISE_SINK * leg.duration();
        path.push(Box::new(leg));
    }

    Scenario {
        name: "triangle".to_string(),
        task,
        path: Arc::new(path),
        wind: (0.0, 0.0),
    }
}

/// A loaded task flown straight through its planning locations.
pub fn task_scenario(name: impl Into<String>, task: OrderedTask, altitude: f64) -> Scenario {
    let points: Vec<GeoPoint> = task
        .points()
        .iter()
        .map(|p| p.planning_location())
        .collect();
    let path = SegmentedPath::through(&points, altitude, CRUISE_SPEED, CRUISE_SINK);
    Scenario {
        name: name.into(),
        task,
        path: Arc::new(path),
        wind: (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soar_core::{EngineConfig, ObservationZone, TaskEvent, TaskManager};

    #[test]
    fn thermal_starts_where_the_glide_ends() {
        let scenario = triangle_scenario(GeoPoint::new(45.0, 7.0));
        let samples = scenario.samples(5.0);
        for pair in samples.windows(2) {
            assert!(pair[0].location.distance(&pair[1].location) < 200.0);
            assert!((pair[0].altitude - pair[1].altitude).abs() < 20.0);
        }
    }

    #[test]
    fn triangle_flight_finishes_the_task() {
        let scenario = triangle_scenario(GeoPoint::new(45.0, 7.0)).with_wind(5.0, 270.0);
        let mut manager = TaskManager::new(EngineConfig::default()).unwrap();
        manager.set_task(scenario.task.clone()).unwrap();

        let mut events = Vec::new();
        let mut climbed = false;
        let mut last = None;
        for state in scenario.samples(5.0) {
            assert_eq!(state.wind_speed, 5.0);
            let stats = manager.update(&state);
            events.extend(manager.take_events());
            if let Some(prev) = last.replace(state) {
                climbed |= state.altitude > prev.altitude;
            }
            assert!(stats.distance_scored >= 0.0);
        }
        assert!(climbed);
        assert!(events.iter().any(|e| matches!(e, TaskEvent::Finished { .. })));
        assert!(manager.task().is_finished());

        let turn = &manager.task().points()[1];
        assert!(turn.has_entered());
        assert!(turn.zone.contains_point(&turn.location().destination(135.0, 1000.0)));
    }

    #[test]
    fn loaded_task_is_flown_through_its_points() {
        let origin = GeoPoint::new(45.0, 7.0);
        let task = triangle_scenario(origin).task;
        let scenario = task_scenario("loaded", task, 1500.0);
        let samples = scenario.samples(10.0);
        assert!(samples[0].location.is_near(&origin, 1.0));
        let last = samples.last().unwrap();
        assert!(last
            .location
            .is_near(&origin.destination(180.0, 10_000.0), 1.0));
    }
}
