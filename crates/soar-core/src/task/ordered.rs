//! The ordered task: an arena of points linked by index, with one active
//! point and per-sample transition detection.

use super::aat::isoline_target;
use super::point::{ActiveState, PointKind, TaskPoint};
use super::search::{search_layers, Objective};
use super::{TaskDefinition, TaskEvent};
use crate::config::{FinishHeightRules, TaskBehaviour};
use crate::error::TaskError;
use crate::geo::{project_distance, GeoPoint, GeoVector};
use crate::models::AircraftState;
use crate::zone::ObservationZone;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Largest height loss between start and finish a finish crossing may show.
const FAI_FINISH_DROP: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderedTask {
    points: Vec<TaskPoint>,
    active: Option<usize>,
    finished: bool,
}

impl OrderedTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a task without validating roles.
    pub fn from_points(points: Vec<TaskPoint>) -> Self {
        let mut task = Self {
            active: (!points.is_empty()).then_some(0),
            points,
            finished: false,
        };
        task.relink();
        task
    }

    pub fn from_definition(definition: &TaskDefinition) -> Result<Self, TaskError> {
        let mut points = Vec::with_capacity(definition.points.len());
        for (index, def) in definition.points.iter().enumerate() {
            let radius = def.zone.radius();
            if !(radius.is_finite() && radius > 0.0) {
                warn!(task = %definition.name, index, radius, "rejecting zone");
                return Err(TaskError::InvalidZone { index, radius });
            }
            points.push(TaskPoint::new(def.waypoint.clone(), def.zone.clone(), def.kind));
        }

        let task = Self::from_points(points);
        if let Err(err) = task.check_task() {
            warn!(task = %definition.name, error = %err, "task failed validation");
            return Err(err);
        }
        Ok(task)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TaskPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&TaskPoint> {
        self.points.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_point(&self) -> Option<&TaskPoint> {
        self.active.and_then(|index| self.points.get(index))
    }

    pub fn is_started(&self) -> bool {
        self.points
            .first()
            .is_some_and(|p| p.kind() == PointKind::Start && p.has_exited())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time the start was last left.
    pub fn start_time(&self) -> Option<f64> {
        self.points
            .first()
            .filter(|p| p.kind() == PointKind::Start)
            .and_then(|p| p.state_exited())
            .map(|s| s.time)
    }

    pub fn finish_time(&self) -> Option<f64> {
        if !self.finished {
            return None;
        }
        self.points
            .last()
            .and_then(|p| p.state_entered())
            .map(|s| s.time)
    }

    // --- editing ---

    pub fn append(&mut self, point: TaskPoint) {
        self.points.push(point);
        if self.active.is_none() {
            self.active = Some(0);
        }
        self.relink();
    }

    pub fn insert(&mut self, index: usize, point: TaskPoint) -> Result<(), TaskError> {
        if index > self.points.len() {
            return Err(TaskError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.points.insert(index, point);
        self.active = match self.active {
            None => Some(0),
            Some(active) if index <= active => Some(active + 1),
            keep => keep,
        };
        self.relink();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<TaskPoint, TaskError> {
        self.check_index(index)?;
        let removed = self.points.remove(index);
        let len = self.points.len();
        self.active = match self.active {
            _ if len == 0 => None,
            Some(active) if index < active => Some(active - 1),
            Some(active) => Some(active.min(len - 1)),
            None => Some(0),
        };
        self.relink();
        Ok(removed)
    }

    pub fn replace(&mut self, index: usize, point: TaskPoint) -> Result<TaskPoint, TaskError> {
        self.check_index(index)?;
        let old = std::mem::replace(&mut self.points[index], point);
        self.relink();
        Ok(old)
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), TaskError> {
        self.check_index(index)?;
        self.active = Some(index);
        self.scan_active();
        Ok(())
    }

    /// Validate roles: a start first, a finish last, neither in between.
    pub fn check_task(&self) -> Result<(), TaskError> {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return Err(TaskError::EmptyTask);
        };
        if first.kind() != PointKind::Start {
            return Err(TaskError::NoStart);
        }
        if self.points.len() < 2 || last.kind() != PointKind::Finish {
            return Err(TaskError::NoFinish);
        }
        let interior = &self.points[1..self.points.len() - 1];
        for (offset, point) in interior.iter().enumerate() {
            if matches!(point.kind(), PointKind::Start | PointKind::Finish) {
                return Err(TaskError::MisplacedRole {
                    index: offset + 1,
                    role: point.kind().as_str(),
                });
            }
        }
        Ok(())
    }

    /// Clear all crossings and make the first point active again.
    pub fn reset(&mut self) {
        for point in &mut self.points {
            point.reset();
        }
        self.active = (!self.points.is_empty()).then_some(0);
        self.finished = false;
        self.scan_active();
    }

    /// Gate the finish with `rules` unless its zone already has a gate.
    pub fn apply_finish_rules(&mut self, rules: FinishHeightRules) {
        let finish = self
            .points
            .last_mut()
            .filter(|p| p.kind() == PointKind::Finish);
        if let Some(finish) = finish {
            if finish.zone.height_gate.is_none() {
                finish.zone.height_gate = Some(rules);
            }
        }
    }

    /// Raise the finish floor to 1000 m below the start exit altitude once
    /// the task has started.
    pub fn update_finish_floor(&mut self) {
        let floor = self
            .points
            .first()
            .filter(|p| p.kind() == PointKind::Start)
            .and_then(|p| p.state_exited())
            .map(|s| s.altitude - FAI_FINISH_DROP);
        let Some(floor) = floor else {
            return;
        };
        let finish = self
            .points
            .last_mut()
            .filter(|p| p.kind() == PointKind::Finish);
        if let Some(finish) = finish {
            if finish.zone.fai_floor != Some(floor) {
                debug!(floor, "finish floor set from start altitude");
                finish.zone.fai_floor = Some(floor);
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<(), TaskError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(TaskError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    /// Recompute neighbour indices and leg-dependent zone geometry.
    fn relink(&mut self) {
        let locations: Vec<GeoPoint> = self.points.iter().map(|p| p.location()).collect();
        let len = self.points.len();
        for (index, point) in self.points.iter_mut().enumerate() {
            let previous = index.checked_sub(1);
            let next = (index + 1 < len).then_some(index + 1);
            point.set_neighbours(previous, next);
            point.zone.shape.set_legs(
                previous.map(|i| &locations[i]),
                next.map(|i| &locations[i]),
            );
        }
        self.scan_active();
    }

    fn scan_active(&mut self) {
        let active = self.active;
        for (index, point) in self.points.iter_mut().enumerate() {
            let state = match active {
                None => ActiveState::NotFoundActive,
                Some(active) => match index.cmp(&active) {
                    Ordering::Less => ActiveState::BeforeActive,
                    Ordering::Equal => ActiveState::CurrentActive,
                    Ordering::Greater => ActiveState::AfterActive,
                },
            };
            point.set_active_state(state);
        }
    }

    // --- transitions ---

    /// A finish only counts once the point before it has been achieved.
    fn entry_precondition(&self, index: usize) -> bool {
        match self.points[index].kind() {
            PointKind::Finish => index
                .checked_sub(1)
                .and_then(|i| self.points.get(i))
                .map_or(true, TaskPoint::is_achieved),
            _ => true,
        }
    }

    /// Detect crossings between `last` and `now` and advance the active
    /// point at most once.
    ///
    /// Only the active point and the one before it are scanned, so a zone
    /// further along the course is never credited out of order.
    pub fn update_transitions(
        &mut self,
        now: &AircraftState,
        last: &AircraftState,
    ) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        let Some(active) = self.active else {
            return events;
        };
        if self.finished {
            return events;
        }

        let low = active.saturating_sub(1);
        for index in low..=active {
            let entered = self.points[index].transition_enter(now, last)
                && self.entry_precondition(index);
            let exited = self.points[index].transition_exit(now, last);

            let point = &mut self.points[index];
            if entered {
                point.record_entered(now);
                info!(index, name = point.name(), time = now.time, "entered task point");
                events.push(TaskEvent::Entered {
                    index,
                    time: now.time,
                });
                if point.kind() == PointKind::Finish {
                    self.finished = true;
                    info!(time = now.time, "task finished");
                    events.push(TaskEvent::Finished { time: now.time });
                }
            }
            if exited {
                point.record_exited(now);
                info!(index, name = point.name(), time = now.time, "exited task point");
                events.push(TaskEvent::Exited {
                    index,
                    time: now.time,
                });
                let entered_before = point.has_entered();
                if let Some(area) = point.area_target_mut() {
                    if entered_before && !area.locked {
                        area.target = last.location;
                        area.locked = true;
                    }
                }
                if point.kind() == PointKind::Start {
                    info!(time = now.time, "task started");
                    events.push(TaskEvent::Started { time: now.time });
                }
            }
        }

        let current = &self.points[active];
        let advance = current.kind() != PointKind::Finish && current.is_achieved();
        if advance && active + 1 < self.points.len() {
            self.active = Some(active + 1);
            self.scan_active();
            info!(from = active, to = active + 1, "active point advanced");
            events.push(TaskEvent::ActiveAdvanced {
                from: active,
                to: active + 1,
            });
        }
        events
    }

    /// Move unlocked area targets towards the cheapest course.
    pub fn update_area_targets(&mut self, aircraft: &AircraftState, behaviour: &TaskBehaviour) {
        let Some(active) = self.active else {
            return;
        };
        for index in active.saturating_sub(1)..self.points.len() {
            let point = &self.points[index];
            if point.area_target().map_or(true, |area| area.locked) {
                continue;
            }

            let from = match index.checked_sub(1) {
                Some(previous) if index != active => self.points[previous].planning_location(),
                _ => aircraft.location,
            };
            let to = self
                .points
                .get(index + 1)
                .map_or_else(|| point.location(), TaskPoint::planning_location);
            let extra = (index <= active && point.zone.contains(aircraft)).then_some(aircraft.location);

            let Some(target) = isoline_target(
                &point.zone,
                &from,
                &to,
                extra,
                behaviour.isoline_samples,
                behaviour.aat_target_range,
            ) else {
                continue;
            };
            if let Some(area) = self.points[index].area_target_mut() {
                if area.target != target {
                    debug!(index, lat = target.latitude, lon = target.longitude, "area target moved");
                    area.target = target;
                }
            }
        }
    }

    // --- geometry ---

    fn leg_sum(&self, from: usize, to: usize, location: fn(&TaskPoint) -> GeoPoint) -> f64 {
        if to <= from || to > self.points.len() {
            return 0.0;
        }
        self.points[from..to]
            .windows(2)
            .map(|pair| location(&pair[0]).distance(&location(&pair[1])))
            .sum()
    }

    /// Course length through the zone references.
    pub fn distance_nominal(&self) -> f64 {
        self.leg_sum(0, self.points.len(), TaskPoint::location)
    }

    /// Course length through the current planning targets.
    pub fn distance_planned(&self) -> f64 {
        self.leg_sum(0, self.points.len(), TaskPoint::planning_location)
    }

    pub fn vector_remaining(&self, aircraft: &AircraftState) -> GeoVector {
        match self.active_point() {
            Some(point) if !self.finished => {
                GeoVector::between(&aircraft.location, &point.planning_location())
            }
            _ => GeoVector::default(),
        }
    }

    pub fn distance_remaining(&self, aircraft: &AircraftState) -> f64 {
        let Some(active) = self.active else {
            return 0.0;
        };
        if self.finished {
            return 0.0;
        }
        self.vector_remaining(aircraft).distance
            + self.leg_sum(active, self.points.len(), TaskPoint::planning_location)
    }

    /// Leg from the last achieved point to the active one.
    pub fn vector_planned(&self) -> GeoVector {
        match self.active {
            Some(active) if active > 0 => GeoVector::between(
                &self.points[active - 1].planning_location(),
                &self.points[active].planning_location(),
            ),
            _ => GeoVector::default(),
        }
    }

    pub fn vector_travelled(&self, aircraft: &AircraftState) -> GeoVector {
        match self.active {
            Some(active) if active > 0 && self.is_started() && !self.finished => {
                GeoVector::between(&self.points[active - 1].planning_location(), &aircraft.location)
            }
            _ => GeoVector::default(),
        }
    }

    pub fn distance_travelled(&self, aircraft: &AircraftState) -> f64 {
        let Some(active) = self.active else {
            return 0.0;
        };
        if !self.is_started() {
            return 0.0;
        }
        if self.finished {
            return self.distance_planned();
        }
        self.leg_sum(0, active, TaskPoint::planning_location)
            + self.vector_travelled(aircraft).distance
    }

    /// Achieved legs plus progress along the current leg, without credit
    /// for lateral deviation.
    pub fn distance_scored(&self, aircraft: &AircraftState) -> f64 {
        let Some(active) = self.active else {
            return 0.0;
        };
        if !self.is_started() {
            return 0.0;
        }
        let adjustment: f64 = self
            .points
            .iter()
            .filter(|p| p.is_achieved())
            .map(|p| p.zone.score_adjustment())
            .sum();
        if self.finished || active == 0 {
            let achieved = if self.finished {
                self.distance_planned()
            } else {
                0.0
            };
            return (achieved + adjustment).max(0.0);
        }

        let from = self.points[active - 1].planning_location();
        let to = self.points[active].planning_location();
        let leg = from.distance(&to);
        let progress = project_distance(&from, &to, &aircraft.location).clamp(0.0, leg);
        (self.leg_sum(0, active, TaskPoint::planning_location) + progress + adjustment).max(0.0)
    }

    /// Shortest distance from the aircraft through every remaining zone.
    pub fn distance_min(&self, aircraft: &AircraftState, samples: usize) -> f64 {
        let Some(active) = self.active else {
            return 0.0;
        };
        if self.finished {
            return 0.0;
        }
        let mut layers = vec![vec![aircraft.location]];
        for point in &self.points[active..] {
            let mut layer = point.zone.boundary_samples(samples);
            if point.zone.contains(aircraft) {
                layer.push(aircraft.location);
            }
            layers.push(layer);
        }
        search_layers(&layers, Objective::Shortest).map_or(0.0, |path| path.distance)
    }

    /// Longest course through all zones, with achieved points fixed at
    /// their scored location.
    pub fn distance_max(&self, samples: usize) -> f64 {
        let layers: Vec<Vec<GeoPoint>> = self
            .points
            .iter()
            .map(|point| {
                let fixed = point.is_achieved()
                    || point.area_target().is_some_and(|area| area.locked);
                if fixed {
                    vec![point.planning_location()]
                } else {
                    point.zone.boundary_samples(samples)
                }
            })
            .collect();
        search_layers(&layers, Objective::Longest).map_or(0.0, |path| path.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Waypoint;
    use crate::zone::Zone;

    fn wp(id: u32, location: GeoPoint) -> Waypoint {
        Waypoint::new(id, format!("WP{id}"), location, 0.0)
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(-33.0, 147.0)
    }

    /// Start at the origin, turn 20 km east, finish 20 km north of the turn.
    fn task() -> OrderedTask {
        let start = origin();
        let turn = start.destination(90.0, 20_000.0);
        let finish = turn.destination(0.0, 20_000.0);
        OrderedTask::from_points(vec![
            TaskPoint::start(wp(1, start), Zone::cylinder(start, 1000.0)),
            TaskPoint::turn(wp(2, turn), Zone::cylinder(turn, 500.0)),
            TaskPoint::finish(wp(3, finish), Zone::cylinder(finish, 1000.0)),
        ])
    }

    fn at(location: GeoPoint, time: f64) -> AircraftState {
        AircraftState::new(location, 1000.0, time)
    }

    #[test]
    fn validation() {
        assert_eq!(task().check_task(), Ok(()));
        assert_eq!(OrderedTask::new().check_task(), Err(TaskError::EmptyTask));

        let mut bad = task();
        let start = bad.points()[0].clone();
        bad.insert(2, start).unwrap();
        assert_eq!(
            bad.check_task(),
            Err(TaskError::MisplacedRole {
                index: 2,
                role: "start"
            })
        );

        let mut no_finish = task();
        no_finish.remove(2).unwrap();
        assert_eq!(no_finish.check_task(), Err(TaskError::NoFinish));
    }

    #[test]
    fn editing_keeps_active_point() {
        let mut task = task();
        task.set_active(1).unwrap();
        let extra = task.points()[1].clone();
        task.insert(0, extra).unwrap();
        assert_eq!(task.active_index(), Some(2));
        assert_eq!(task.points()[2].active_state(), ActiveState::CurrentActive);
        assert_eq!(task.points()[1].previous(), Some(0));
        assert_eq!(task.points()[1].next(), Some(2));

        task.remove(0).unwrap();
        assert_eq!(task.active_index(), Some(1));
        assert_eq!(
            task.insert(9, task.points()[0].clone()),
            Err(TaskError::IndexOutOfRange { index: 9, len: 3 })
        );

        let mut empty = OrderedTask::new();
        assert_eq!(empty.active_point(), None);
        empty.append(task.points()[0].clone());
        assert_eq!(empty.active_index(), Some(0));
        empty.remove(0).unwrap();
        assert_eq!(empty.active_index(), None);
    }

    #[test]
    fn start_advances_on_exit_turn_on_entry() {
        let mut task = task();
        let turn = task.points()[1].location();

        let inside_start = at(origin(), 0.0);
        let left_start = at(origin().destination(90.0, 1500.0), 10.0);
        let events = task.update_transitions(&left_start, &inside_start);
        assert!(events.contains(&TaskEvent::Started { time: 10.0 }));
        assert_eq!(task.active_index(), Some(1));
        assert!(task.is_started());

        let near_turn = at(turn.destination(270.0, 800.0), 500.0);
        let in_turn = at(turn.destination(270.0, 100.0), 520.0);
        task.update_transitions(&near_turn, &left_start);
        let events = task.update_transitions(&in_turn, &near_turn);
        assert!(events.contains(&TaskEvent::ActiveAdvanced { from: 1, to: 2 }));
        assert_eq!(task.points()[1].state_entered().map(|s| s.time), Some(520.0));
        assert_eq!(task.points()[1].active_state(), ActiveState::BeforeActive);
        assert_eq!(task.points()[2].active_state(), ActiveState::CurrentActive);
    }

    #[test]
    fn finish_requires_the_previous_point() {
        let mut task = task();
        let finish = task.points()[2].location();
        task.set_active(2).unwrap();

        let outside = at(finish.destination(180.0, 2000.0), 0.0);
        let inside = at(finish, 10.0);
        task.update_transitions(&inside, &outside);
        assert!(!task.is_finished());
        assert!(!task.points()[2].has_entered());
    }

    #[test]
    fn distances_on_a_simple_course() {
        let mut task = task();
        assert!((task.distance_nominal() - 40_000.0).abs() < 20.0);
        assert_eq!(task.distance_planned(), task.distance_nominal());

        let before = at(origin(), 0.0);
        assert_eq!(task.distance_travelled(&before), 0.0);
        assert_eq!(task.distance_scored(&before), 0.0);
        assert!((task.distance_remaining(&before) - 40_000.0).abs() < 20.0);

        let left = at(origin().destination(90.0, 1500.0), 60.0);
        task.update_transitions(&left, &before);
        let halfway = at(origin().destination(90.0, 10_000.0).destination(0.0, 2000.0), 600.0);
        assert!((task.distance_scored(&halfway) - 10_000.0).abs() < 50.0);
        assert!(task.distance_travelled(&halfway) > task.distance_scored(&halfway));

        let min = task.distance_min(&halfway, 24);
        assert!(min < task.distance_remaining(&halfway));
        assert!(min > 25_000.0);
        assert!(task.distance_max(24) > task.distance_nominal());
    }
}
