//! Task points: a waypoint, its observation zone, and its crossing history.

use crate::geo::GeoPoint;
use crate::models::{AircraftState, Waypoint};
use crate::zone::{ObservationZone, Zone};
use serde::{Deserialize, Serialize};

/// Position of a point relative to the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActiveState {
    /// Not part of a task, or the task is empty
    #[default]
    NotFoundActive,
    BeforeActive,
    CurrentActive,
    AfterActive,
}

/// Movable target inside an assigned area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaTarget {
    pub target: GeoPoint,
    /// Set once the area is exited; the target then stays put
    pub locked: bool,
}

impl AreaTarget {
    pub fn new(target: GeoPoint) -> Self {
        Self {
            target,
            locked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Start,
    /// Single turnpoint (AST)
    Turn,
    /// Assigned area (AAT)
    Area,
    Finish,
}

impl PointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Start => "start",
            PointKind::Turn => "turn",
            PointKind::Area => "area",
            PointKind::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointRole {
    Start,
    Turn,
    Area(AreaTarget),
    Finish,
}

impl PointRole {
    pub fn kind(&self) -> PointKind {
        match self {
            PointRole::Start => PointKind::Start,
            PointRole::Turn => PointKind::Turn,
            PointRole::Area(_) => PointKind::Area,
            PointRole::Finish => PointKind::Finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPoint {
    pub waypoint: Waypoint,
    pub zone: Zone,
    pub role: PointRole,
    active_state: ActiveState,
    previous: Option<usize>,
    next: Option<usize>,
    state_entered: Option<AircraftState>,
    state_exited: Option<AircraftState>,
}

impl TaskPoint {
    pub fn new(waypoint: Waypoint, zone: Zone, kind: PointKind) -> Self {
        let radius = zone.radius();
        assert!(
            radius.is_finite() && radius > 0.0,
            "zone radius must be positive, got {radius}"
        );
        let role = match kind {
            PointKind::Start => PointRole::Start,
            PointKind::Turn => PointRole::Turn,
            PointKind::Area => PointRole::Area(AreaTarget::new(zone.reference())),
            PointKind::Finish => PointRole::Finish,
        };
        Self {
            waypoint,
            zone,
            role,
            active_state: ActiveState::NotFoundActive,
            previous: None,
            next: None,
            state_entered: None,
            state_exited: None,
        }
    }

    pub fn start(waypoint: Waypoint, zone: Zone) -> Self {
        Self::new(waypoint, zone, PointKind::Start)
    }

    pub fn turn(waypoint: Waypoint, zone: Zone) -> Self {
        Self::new(waypoint, zone, PointKind::Turn)
    }

    pub fn area(waypoint: Waypoint, zone: Zone) -> Self {
        Self::new(waypoint, zone, PointKind::Area)
    }

    pub fn finish(waypoint: Waypoint, zone: Zone) -> Self {
        Self::new(waypoint, zone, PointKind::Finish)
    }

    pub fn kind(&self) -> PointKind {
        self.role.kind()
    }

    pub fn name(&self) -> &str {
        &self.waypoint.name
    }

    pub fn active_state(&self) -> ActiveState {
        self.active_state
    }

    pub(crate) fn set_active_state(&mut self, state: ActiveState) {
        self.active_state = state;
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub(crate) fn set_neighbours(&mut self, previous: Option<usize>, next: Option<usize>) {
        self.previous = previous;
        self.next = next;
    }

    pub fn state_entered(&self) -> Option<&AircraftState> {
        self.state_entered.as_ref()
    }

    pub fn state_exited(&self) -> Option<&AircraftState> {
        self.state_exited.as_ref()
    }

    pub fn has_entered(&self) -> bool {
        self.state_entered.is_some()
    }

    pub fn has_exited(&self) -> bool {
        self.state_exited.is_some()
    }

    /// Whether the point counts as reached: a start once left, any other
    /// point once entered.
    pub fn is_achieved(&self) -> bool {
        match self.role {
            PointRole::Start => self.has_exited(),
            _ => self.has_entered(),
        }
    }

    /// Only the first entry is kept.
    pub(crate) fn record_entered(&mut self, state: &AircraftState) {
        if self.state_entered.is_none() {
            self.state_entered = Some(*state);
        }
    }

    pub(crate) fn record_exited(&mut self, state: &AircraftState) {
        self.state_exited = Some(*state);
    }

    pub fn transition_enter(&self, now: &AircraftState, last: &AircraftState) -> bool {
        !self.zone.contains(last)
            && self.zone.contains(now)
            && self.zone.transition_constraint(now, last)
    }

    pub fn transition_exit(&self, now: &AircraftState, last: &AircraftState) -> bool {
        self.zone.contains(last)
            && !self.zone.contains(now)
            && self.zone.transition_constraint(now, last)
    }

    /// Fixed reference location of the zone.
    pub fn location(&self) -> GeoPoint {
        self.zone.reference()
    }

    /// Location used for planning: the area target, else the reference.
    pub fn planning_location(&self) -> GeoPoint {
        match &self.role {
            PointRole::Area(area) => area.target,
            _ => self.location(),
        }
    }

    pub fn area_target(&self) -> Option<&AreaTarget> {
        match &self.role {
            PointRole::Area(area) => Some(area),
            _ => None,
        }
    }

    pub(crate) fn area_target_mut(&mut self) -> Option<&mut AreaTarget> {
        match &mut self.role {
            PointRole::Area(area) => Some(area),
            _ => None,
        }
    }

    /// Forget crossings and release any locked area target.
    pub fn reset(&mut self) {
        self.state_entered = None;
        self.state_exited = None;
        self.zone.fai_floor = None;
        let reference = self.location();
        if let Some(area) = self.area_target_mut() {
            *area = AreaTarget::new(reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(kind: PointKind) -> TaskPoint {
        let location = GeoPoint::new(47.0, 8.0);
        TaskPoint::new(
            Waypoint::new(1, "Alpha", location, 400.0),
            Zone::cylinder(location, 500.0),
            kind,
        )
    }

    fn state_at(bearing: f64, distance: f64, time: f64) -> AircraftState {
        AircraftState::new(
            GeoPoint::new(47.0, 8.0).destination(bearing, distance),
            1200.0,
            time,
        )
    }

    #[test]
    fn enter_and_exit_are_converse() {
        let tp = point(PointKind::Turn);
        let outside = state_at(90.0, 800.0, 0.0);
        let inside = state_at(90.0, 200.0, 1.0);

        assert!(tp.transition_enter(&inside, &outside));
        assert!(!tp.transition_exit(&inside, &outside));
        assert!(tp.transition_exit(&outside, &inside));
        assert!(!tp.transition_enter(&inside, &inside));
    }

    #[test]
    fn first_entry_is_kept_exit_is_latest() {
        let mut tp = point(PointKind::Turn);
        let first = state_at(0.0, 100.0, 10.0);
        let second = state_at(0.0, 100.0, 20.0);
        tp.record_entered(&first);
        tp.record_entered(&second);
        tp.record_exited(&first);
        tp.record_exited(&second);

        assert_eq!(tp.state_entered().map(|s| s.time), Some(10.0));
        assert_eq!(tp.state_exited().map(|s| s.time), Some(20.0));
    }

    #[test]
    fn start_is_achieved_on_exit() {
        let mut start = point(PointKind::Start);
        start.record_entered(&state_at(0.0, 100.0, 0.0));
        assert!(!start.is_achieved());
        start.record_exited(&state_at(0.0, 900.0, 5.0));
        assert!(start.is_achieved());

        let mut turn = point(PointKind::Turn);
        turn.record_entered(&state_at(0.0, 100.0, 0.0));
        assert!(turn.is_achieved());
    }

    #[test]
    fn area_target_starts_at_reference_and_resets() {
        let mut area = point(PointKind::Area);
        assert_eq!(area.planning_location(), area.location());

        let moved = area.location().destination(45.0, 300.0);
        if let Some(target) = area.area_target_mut() {
            target.target = moved;
            target.locked = true;
        }
        assert_eq!(area.planning_location(), moved);

        area.reset();
        assert_eq!(area.area_target(), Some(&AreaTarget::new(area.location())));
    }
}
