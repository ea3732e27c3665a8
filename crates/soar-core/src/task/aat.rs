//! Target selection inside assigned areas.

use crate::geo::GeoPoint;
use crate::zone::{ObservationZone, Zone};

/// Pick a target inside `zone` for a course running `from` → target → `to`.
///
/// Candidates are `samples` boundary points plus `extra` (typically the
/// aircraft while inside the area). Each is costed by the length of the
/// two legs through it; `range` places the wanted cost between the
/// cheapest (0) and the dearest (1) candidate.
pub fn isoline_target(
    zone: &Zone,
    from: &GeoPoint,
    to: &GeoPoint,
    extra: Option<GeoPoint>,
    samples: usize,
    range: f64,
) -> Option<GeoPoint> {
    let costed: Vec<(GeoPoint, f64)> = zone
        .boundary_samples(samples)
        .into_iter()
        .chain(extra)
        .map(|candidate| (candidate, from.distance(&candidate) + candidate.distance(to)))
        .collect();

    let min = costed.iter().map(|(_, cost)| *cost).fold(f64::INFINITY, f64::min);
    let max = costed
        .iter()
        .map(|(_, cost)| *cost)
        .fold(f64::NEG_INFINITY, f64::max);
    let goal = min + range.clamp(0.0, 1.0) * (max - min);

    costed
        .into_iter()
        .min_by(|a, b| (a.1 - goal).abs().total_cmp(&(b.1 - goal).abs()))
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Zone, GeoPoint, GeoPoint) {
        let center = GeoPoint::new(46.0, 10.0);
        let zone = Zone::cylinder(center, 10_000.0);
        // course runs west to east, 50 km either side of the area
        let from = center.destination(270.0, 50_000.0);
        let to = center.destination(90.0, 50_000.0);
        (zone, from, to)
    }

    #[test]
    fn shortest_target_sits_on_the_near_edge() {
        let (zone, from, to) = setup();
        let target = isoline_target(&zone, &from, &to, None, 36, 0.0).unwrap();
        let cost = from.distance(&target) + target.distance(&to);
        // boundary points on the course line cost exactly the straight leg
        assert!((cost - 100_000.0).abs() < 50.0, "cost {cost}");
    }

    #[test]
    fn longest_target_bulges_out() {
        let (zone, from, to) = setup();
        let short = isoline_target(&zone, &from, &to, None, 36, 0.0).unwrap();
        let long = isoline_target(&zone, &from, &to, None, 36, 1.0).unwrap();
        let cost = |p: GeoPoint| from.distance(&p) + p.distance(&to);
        assert!(cost(long) > cost(short) + 1000.0);
        assert!(zone.reference().distance(&long) > 9_900.0);
    }

    #[test]
    fn aircraft_inside_can_be_the_target() {
        let (zone, _, _) = setup();
        let aircraft = zone.reference();
        // course line through the aircraft misses every 45° boundary sample
        let from = aircraft.destination(20.0, 50_000.0);
        let to = aircraft.destination(200.0, 50_000.0);
        let target = isoline_target(&zone, &from, &to, Some(aircraft), 8, 0.0).unwrap();
        assert_eq!(target, aircraft);
    }
}
