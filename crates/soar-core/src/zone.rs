//! Observation zones: the regions in which a task point counts as reached.
//!
//! Shapes share the [`ObservationZone`] capability. A [`Zone`] wraps a shape
//! together with the optional finish height gate, which is the only
//! temporal constraint on a crossing.

use crate::config::FinishHeightRules;
use crate::geo::{angle_limit_180, angle_limit_360, bearing_in_arc, distance_bearing, GeoPoint};
use crate::models::AircraftState;
use serde::{Deserialize, Serialize};

/// Sample radius used when walking a sector boundary, so the returned point
/// tests as inside.
const BOUNDARY_SHRINK: f64 = 0.999;

pub trait ObservationZone {
    fn reference(&self) -> GeoPoint;

    fn radius(&self) -> f64;

    fn contains_point(&self, location: &GeoPoint) -> bool;

    fn contains(&self, state: &AircraftState) -> bool {
        self.contains_point(&state.location)
    }

    /// Point on the zone boundary for a parameter `t` in [0, 1].
    fn boundary_point(&self, t: f64) -> GeoPoint;

    /// Distance credited (positive) or deducted (negative) when scoring
    /// through this zone.
    fn score_adjustment(&self) -> f64 {
        0.0
    }

    /// Extra condition a crossing between two samples must satisfy.
    fn transition_constraint(&self, _now: &AircraftState, _last: &AircraftState) -> bool {
        true
    }

    fn boundary_samples(&self, count: usize) -> Vec<GeoPoint> {
        let count = count.max(1);
        (0..count)
            .map(|i| self.boundary_point(i as f64 / count as f64))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderZone {
    pub center: GeoPoint,
    pub radius: f64,
}

impl CylinderZone {
    pub fn new(center: GeoPoint, radius: f64) -> Self {
        assert!(
            radius.is_finite() && radius > 0.0,
            "zone radius must be positive, got {radius}"
        );
        Self { center, radius }
    }
}

impl ObservationZone for CylinderZone {
    fn reference(&self) -> GeoPoint {
        self.center
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn contains_point(&self, location: &GeoPoint) -> bool {
        self.center.distance(location) <= self.radius
    }

    fn boundary_point(&self, t: f64) -> GeoPoint {
        self.center.destination(360.0 * t, self.radius)
    }
}

/// Disc segment between two radials, clockwise from `start_radial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorZone {
    pub center: GeoPoint,
    pub radius: f64,
    pub start_radial: f64,
    pub end_radial: f64,
    /// When set, radials follow the task geometry: the sector is centred on
    /// the outward bisector with this half angle.
    #[serde(default)]
    pub auto_half_angle: Option<f64>,
}

impl SectorZone {
    pub fn new(center: GeoPoint, radius: f64, start_radial: f64, end_radial: f64) -> Self {
        assert!(
            radius.is_finite() && radius > 0.0,
            "zone radius must be positive, got {radius}"
        );
        Self {
            center,
            radius,
            start_radial: angle_limit_360(start_radial),
            end_radial: angle_limit_360(end_radial),
            auto_half_angle: None,
        }
    }

    /// Sector oriented from leg geometry, e.g. the 90° FAI sector.
    pub fn symmetric(center: GeoPoint, radius: f64, half_angle: f64) -> Self {
        let mut zone = Self::new(center, radius, 360.0 - half_angle, half_angle);
        zone.auto_half_angle = Some(half_angle);
        zone
    }

    pub fn fai(center: GeoPoint, radius: f64) -> Self {
        Self::symmetric(center, radius, 45.0)
    }

    /// Clockwise angular width in degrees; equal radials span the full circle.
    pub fn span(&self) -> f64 {
        let span = angle_limit_360(self.end_radial - self.start_radial);
        if span <= f64::EPSILON {
            360.0
        } else {
            span
        }
    }

    fn orient(&mut self, outward: f64) {
        if let Some(half_angle) = self.auto_half_angle {
            self.start_radial = angle_limit_360(outward - half_angle);
            self.end_radial = angle_limit_360(outward + half_angle);
        }
    }
}

impl ObservationZone for SectorZone {
    fn reference(&self) -> GeoPoint {
        self.center
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn contains_point(&self, location: &GeoPoint) -> bool {
        let (distance, bearing) = distance_bearing(&self.center, location);
        if distance > self.radius {
            return false;
        }
        // the centre itself has no meaningful bearing
        distance <= f64::EPSILON || bearing_in_arc(bearing, self.start_radial, self.end_radial)
    }

    fn boundary_point(&self, t: f64) -> GeoPoint {
        let radius = self.radius * BOUNDARY_SHRINK;
        let angle = self.start_radial + t.clamp(0.0, 1.0) * self.span();
        for step in 0..360 {
            let candidate = self.center.destination(angle + step as f64, radius);
            if self.contains_point(&candidate) {
                return candidate;
            }
        }
        self.center
    }
}

/// Start or finish gate: a chord of length `2·half_length` through the centre,
/// perpendicular to `orientation`.
///
/// The inside is the half disc on the `orientation` side of the chord, so
/// crossing the chord flips membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineZone {
    pub center: GeoPoint,
    pub half_length: f64,
    /// Bearing of the inside normal
    #[serde(default)]
    pub orientation: f64,
}

impl LineZone {
    pub fn new(center: GeoPoint, half_length: f64) -> Self {
        assert!(
            half_length.is_finite() && half_length > 0.0,
            "line half length must be positive, got {half_length}"
        );
        Self {
            center,
            half_length,
            orientation: 0.0,
        }
    }

    /// The two chord end points.
    pub fn end_points(&self) -> (GeoPoint, GeoPoint) {
        (
            self.center.destination(self.orientation - 90.0, self.half_length),
            self.center.destination(self.orientation + 90.0, self.half_length),
        )
    }
}

impl ObservationZone for LineZone {
    fn reference(&self) -> GeoPoint {
        self.center
    }

    fn radius(&self) -> f64 {
        self.half_length
    }

    fn contains_point(&self, location: &GeoPoint) -> bool {
        let (distance, bearing) = distance_bearing(&self.center, location);
        if distance > self.half_length {
            return false;
        }
        distance <= f64::EPSILON || angle_limit_180(bearing - self.orientation).abs() <= 90.0
    }

    fn boundary_point(&self, t: f64) -> GeoPoint {
        let offset = (2.0 * t.clamp(0.0, 1.0) - 1.0) * self.half_length;
        let along = angle_limit_360(self.orientation + 90.0);
        if offset >= 0.0 {
            self.center.destination(along, offset)
        } else {
            self.center.destination(along + 180.0, -offset)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ZoneShape {
    Cylinder(CylinderZone),
    Sector(SectorZone),
    Line(LineZone),
}

impl ZoneShape {
    fn inner(&self) -> &dyn ObservationZone {
        match self {
            ZoneShape::Cylinder(zone) => zone,
            ZoneShape::Sector(zone) => zone,
            ZoneShape::Line(zone) => zone,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, ZoneShape::Line(_))
    }

    /// Re-orient geometry-dependent shapes for new neighbours.
    pub fn set_legs(&mut self, previous: Option<&GeoPoint>, next: Option<&GeoPoint>) {
        let center = self.reference();
        let Some(outward) = outward_bearing(&center, previous, next) else {
            return;
        };
        match self {
            ZoneShape::Cylinder(_) => {}
            ZoneShape::Sector(zone) => zone.orient(outward),
            ZoneShape::Line(zone) => zone.orientation = outward,
        }
    }
}

/// Direction pointing away from the course at `center`.
fn outward_bearing(
    center: &GeoPoint,
    previous: Option<&GeoPoint>,
    next: Option<&GeoPoint>,
) -> Option<f64> {
    let to_previous = previous.map(|p| center.bearing(p));
    let to_next = next.map(|p| center.bearing(p));
    let inward = match (to_previous, to_next) {
        (Some(b1), Some(b2)) => b1 + angle_limit_180(b2 - b1) * 0.5,
        (Some(b), None) | (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(angle_limit_360(inward + 180.0))
}

impl ObservationZone for ZoneShape {
    fn reference(&self) -> GeoPoint {
        self.inner().reference()
    }

    fn radius(&self) -> f64 {
        self.inner().radius()
    }

    fn contains_point(&self, location: &GeoPoint) -> bool {
        self.inner().contains_point(location)
    }

    fn boundary_point(&self, t: f64) -> GeoPoint {
        self.inner().boundary_point(t)
    }

    fn score_adjustment(&self) -> f64 {
        self.inner().score_adjustment()
    }
}

/// A shape plus the optional height gate applied to finish crossings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(flatten)]
    pub shape: ZoneShape,
    #[serde(default)]
    pub height_gate: Option<FinishHeightRules>,
    /// Floor derived from the start altitude once the task is under way
    #[serde(skip)]
    pub fai_floor: Option<f64>,
}

impl Zone {
    pub fn cylinder(center: GeoPoint, radius: f64) -> Self {
        ZoneShape::Cylinder(CylinderZone::new(center, radius)).into()
    }

    pub fn sector(center: GeoPoint, radius: f64, start_radial: f64, end_radial: f64) -> Self {
        ZoneShape::Sector(SectorZone::new(center, radius, start_radial, end_radial)).into()
    }

    pub fn fai_sector(center: GeoPoint, radius: f64) -> Self {
        ZoneShape::Sector(SectorZone::fai(center, radius)).into()
    }

    pub fn line(center: GeoPoint, half_length: f64) -> Self {
        ZoneShape::Line(LineZone::new(center, half_length)).into()
    }

    pub fn with_height_gate(mut self, rules: FinishHeightRules) -> Self {
        self.height_gate = Some(rules);
        self
    }
}

impl From<ZoneShape> for Zone {
    fn from(shape: ZoneShape) -> Self {
        Self {
            shape,
            height_gate: None,
            fai_floor: None,
        }
    }
}

impl ObservationZone for Zone {
    fn reference(&self) -> GeoPoint {
        self.shape.reference()
    }

    fn radius(&self) -> f64 {
        self.shape.radius()
    }

    fn contains_point(&self, location: &GeoPoint) -> bool {
        self.shape.contains_point(location)
    }

    fn boundary_point(&self, t: f64) -> GeoPoint {
        self.shape.boundary_point(t)
    }

    fn score_adjustment(&self) -> f64 {
        self.shape.score_adjustment()
    }

    fn transition_constraint(&self, now: &AircraftState, _last: &AircraftState) -> bool {
        let above_fai_floor = self.fai_floor.map_or(true, |floor| now.altitude >= floor);
        let Some(gate) = self.height_gate else {
            return above_fai_floor;
        };
        let below_ceiling = gate.max_height.map_or(true, |max| now.altitude <= max);
        let above_floor = gate.min_height.map_or(true, |min| now.altitude >= min);
        below_ceiling && above_floor && above_fai_floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> GeoPoint {
        GeoPoint::new(-35.0, 149.0)
    }

    #[test]
    fn cylinder_membership() {
        let zone = CylinderZone::new(center(), 500.0);
        assert!(zone.contains_point(&center().destination(10.0, 499.0)));
        assert!(!zone.contains_point(&center().destination(10.0, 501.0)));
        assert_eq!(zone.score_adjustment(), 0.0);
    }

    #[test]
    #[should_panic(expected = "zone radius must be positive")]
    fn non_positive_radius_is_a_defect() {
        CylinderZone::new(center(), 0.0);
    }

    #[test]
    fn sector_wraps_through_north() {
        let zone = SectorZone::new(center(), 1000.0, 350.0, 10.0);
        assert!(zone.contains_point(&center().destination(355.0, 500.0)));
        assert!(zone.contains_point(&center().destination(5.0, 500.0)));
        assert!(!zone.contains_point(&center().destination(180.0, 500.0)));
        assert!(!zone.contains_point(&center().destination(5.0, 1500.0)));
        assert_eq!(zone.span(), 20.0);
    }

    #[test]
    fn sector_boundary_points_test_inside() {
        let zone = SectorZone::new(center(), 2000.0, 80.0, 100.0);
        for t in [0.0, 0.25, 0.5, 1.0] {
            let p = zone.boundary_point(t);
            assert!(zone.contains_point(&p), "t={t}");
            assert!((center().distance(&p) - 1998.0).abs() < 0.5);
        }
    }

    #[test]
    fn fai_sector_faces_outside_of_turn() {
        // previous leg arrives from the west, next leg leaves to the north
        let mut shape = ZoneShape::Sector(SectorZone::fai(center(), 10_000.0));
        let previous = center().destination(270.0, 50_000.0);
        let next = center().destination(0.0, 50_000.0);
        shape.set_legs(Some(&previous), Some(&next));

        assert!(shape.contains_point(&center().destination(135.0, 5000.0)));
        assert!(!shape.contains_point(&center().destination(315.0, 5000.0)));
    }

    #[test]
    fn start_line_inside_is_behind_the_gate() {
        let mut shape = ZoneShape::Line(LineZone::new(center(), 1000.0));
        let next = center().destination(90.0, 40_000.0);
        shape.set_legs(None, Some(&next));

        assert!(shape.contains_point(&center().destination(270.0, 200.0)));
        assert!(!shape.contains_point(&center().destination(90.0, 200.0)));

        let left = shape.boundary_point(0.0);
        let right = shape.boundary_point(1.0);
        assert!((left.distance(&right) - 2000.0).abs() < 1.0);
    }

    #[test]
    fn finish_gate_rejects_high_crossing() {
        let zone = Zone::cylinder(center(), 1000.0).with_height_gate(FinishHeightRules {
            max_height: Some(1000.0),
            min_height: Some(200.0),
        });
        let last = AircraftState::new(center().destination(0.0, 2000.0), 900.0, 0.0);
        let low = AircraftState::new(center(), 900.0, 1.0);
        let high = AircraftState::new(center(), 1100.0, 1.0);
        let too_low = AircraftState::new(center(), 150.0, 1.0);

        assert!(zone.transition_constraint(&low, &last));
        assert!(!zone.transition_constraint(&high, &last));
        assert!(!zone.transition_constraint(&too_low, &last));
    }

    #[test]
    fn fai_floor_rejects_low_crossing() {
        let mut zone = Zone::cylinder(center(), 1000.0);
        let last = AircraftState::new(center().destination(0.0, 2000.0), 900.0, 0.0);
        let low = AircraftState::new(center(), 600.0, 1.0);
        assert!(zone.transition_constraint(&low, &last));

        zone.fai_floor = Some(1000.0);
        assert!(!zone.transition_constraint(&low, &last));
        assert!(zone.transition_constraint(&AircraftState::new(center(), 1000.0, 1.0), &last));

        let json = serde_json::to_string(&zone).unwrap();
        assert!(!json.contains("fai_floor"));
    }

    #[test]
    fn zone_round_trips_through_json() {
        let zone = Zone::sector(center(), 3000.0, 10.0, 80.0);
        let json = serde_json::to_string(&zone).unwrap();
        assert!(json.contains(r#""shape":"sector""#));
        let back: Zone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
    }
}
