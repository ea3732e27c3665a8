//! MacCready glide and cruise solver.
//!
//! A leg is described by a [`GlideState`]; the solver answers with a
//! [`GlideResult`] carrying a [`Solution`] verdict. Infeasible legs are
//! results, not errors.

use crate::config::GlideConfig;
use crate::geo::{angle_limit_180, angle_limit_360, GeoPoint, GeoVector, NEAR_ZERO};
use crate::models::AircraftState;
use crate::polar::GlidePolar;
use crate::quadratic::Quadratic;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome kind, ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solution {
    Ok,
    /// Only part of the leg can be flown with the height available
    Partial,
    /// The aircraft cannot make progress against the wind
    WindExceeds,
    /// Progress is possible but the climb rate cannot close the height gap
    MacCreadyInsufficient,
    NoSolution,
}

impl Solution {
    pub fn is_ok(self) -> bool {
        self == Solution::Ok
    }

    /// Whether some progress along the leg is possible.
    pub fn is_achievable(self) -> bool {
        matches!(self, Solution::Ok | Solution::Partial)
    }
}

/// Which equations the solver applies to a candidate airspeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// Pure height deficit with no horizontal distance
    Vertical,
    /// Unpowered glide with no climbing
    Glide,
    /// Alternating cruise and climb at the MacCready rate
    Cruise,
}

/// A single leg query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlideState {
    pub vector: GeoVector,
    /// Altitude the aircraft must still have on arrival
    pub min_height: f64,
    pub mc: f64,
}

impl GlideState {
    pub fn new(vector: GeoVector, min_height: f64, mc: f64) -> Self {
        Self {
            vector,
            min_height,
            mc,
        }
    }

    /// Leg from the aircraft straight to `destination`.
    pub fn to_point(
        aircraft: &AircraftState,
        destination: &GeoPoint,
        min_height: f64,
        mc: f64,
    ) -> Self {
        Self::new(
            GeoVector::between(&aircraft.location, destination),
            min_height,
            mc,
        )
    }

    pub fn distance(&self) -> f64 {
        self.vector.distance
    }

    pub fn bearing(&self) -> f64 {
        self.vector.bearing
    }

    fn height_deficit(&self, aircraft: &AircraftState) -> f64 {
        self.min_height - aircraft.altitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlideResult {
    pub solution: Solution,
    /// Distance that can be covered, in meters
    pub distance: f64,
    /// Track bearing of the leg
    pub bearing: f64,
    /// Heading to fly so the track holds in the crosswind
    pub cruise_track_bearing: f64,
    /// Selected airspeed
    pub v_opt: f64,
    pub height_climb: f64,
    pub height_glide: f64,
    pub time_elapsed: f64,
    /// Climb time needed to repay height borrowed from the altitude reserve
    pub time_virtual: f64,
    /// Arrival altitude above the required minimum
    pub altitude_difference: f64,
    pub effective_wind_speed: f64,
    /// Angle between the wind's downwind direction and the track, degrees
    pub effective_wind_angle: f64,
    pub min_height: f64,
}

impl Default for GlideResult {
    fn default() -> Self {
        Self {
            solution: Solution::NoSolution,
            distance: 0.0,
            bearing: 0.0,
            cruise_track_bearing: 0.0,
            v_opt: 0.0,
            height_climb: 0.0,
            height_glide: 0.0,
            time_elapsed: 0.0,
            time_virtual: 0.0,
            altitude_difference: 0.0,
            effective_wind_speed: 0.0,
            effective_wind_angle: 0.0,
            min_height: 0.0,
        }
    }
}

impl GlideResult {
    fn unsolved(aircraft: &AircraftState, task: &GlideState) -> Self {
        Self {
            bearing: task.bearing(),
            cruise_track_bearing: task.bearing(),
            effective_wind_speed: aircraft.wind_speed,
            effective_wind_angle: wind_angle(aircraft, task.bearing()),
            min_height: task.min_height,
            altitude_difference: aircraft.altitude - task.min_height,
            ..Self::default()
        }
    }

    fn with_solution(mut self, solution: Solution) -> Self {
        self.solution = solution;
        self
    }

    pub fn time_total(&self) -> f64 {
        self.time_elapsed + self.time_virtual
    }

    pub fn arrival_altitude(&self, altitude: f64) -> f64 {
        altitude + self.height_climb - self.height_glide
    }

    /// Mean ground speed over the leg, if any time is spent.
    pub fn average_speed(&self) -> Option<f64> {
        (self.time_elapsed > NEAR_ZERO).then(|| self.distance / self.time_elapsed)
    }

    /// Whether `self` ranks strictly better than `other`.
    pub fn superior(&self, other: &GlideResult) -> bool {
        if self.solution != other.solution {
            return self.solution < other.solution;
        }
        if !self.solution.is_achievable() {
            return false;
        }
        if self.distance > 0.0 {
            let own = self.distance / self.time_total();
            let theirs = if other.time_total() > 0.0 {
                other.distance / other.time_total()
            } else {
                0.0
            };
            own > theirs
        } else {
            self.time_total() < other.time_total()
        }
    }

    /// Append a cruise result that continues where this glide ends.
    pub fn merged(&self, cruise: &GlideResult) -> GlideResult {
        let altitude_difference =
            if self.altitude_difference > 0.0 && cruise.altitude_difference > 0.0 {
                self.altitude_difference.max(cruise.altitude_difference)
            } else {
                cruise.altitude_difference + self.altitude_difference.min(0.0)
            };

        GlideResult {
            distance: self.distance + cruise.distance,
            bearing: self.bearing,
            height_climb: self.height_climb + cruise.height_climb,
            height_glide: self.height_glide + cruise.height_glide,
            time_elapsed: self.time_elapsed + cruise.time_elapsed,
            time_virtual: self.time_virtual + cruise.time_virtual,
            altitude_difference,
            min_height: self.min_height,
            ..*cruise
        }
    }

    fn finish(mut self, aircraft: &AircraftState, airspeed: f64, virtual_mc: f64) -> Self {
        self.altitude_difference = self.arrival_altitude(aircraft.altitude) - self.min_height;
        self.time_virtual = (self.height_glide - self.height_climb).max(0.0) / virtual_mc;
        self.cruise_track_bearing = cruise_track_bearing(
            self.bearing,
            self.effective_wind_speed,
            self.effective_wind_angle,
            airspeed,
        );
        self
    }
}

fn wind_angle(aircraft: &AircraftState, bearing: f64) -> f64 {
    angle_limit_180(aircraft.wind_towards() - bearing)
}

/// Heading that holds `track` with a crosswind component.
pub fn cruise_track_bearing(track: f64, wind_speed: f64, wind_angle: f64, airspeed: f64) -> f64 {
    if airspeed <= NEAR_ZERO || wind_speed <= NEAR_ZERO {
        return angle_limit_360(track);
    }
    let ratio = (wind_speed * wind_angle.to_radians().sin() / airspeed).clamp(-1.0, 1.0);
    angle_limit_360(track - ratio.asin().to_degrees())
}

/// Ground speed along the track for airspeed `v` in wind `w` at angle `theta`.
fn ground_speed(v: f64, w: f64, theta: f64) -> Option<f64> {
    Quadratic::monic(-2.0 * w * theta.to_radians().cos(), w * w - v * v).solution_max()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacCready {
    polar: GlidePolar,
    config: GlideConfig,
}

impl MacCready {
    pub fn new(polar: GlidePolar, config: GlideConfig) -> Self {
        Self { polar, config }
    }

    pub fn polar(&self) -> &GlidePolar {
        &self.polar
    }

    pub fn config(&self) -> &GlideConfig {
        &self.config
    }

    pub fn cruise_efficiency(&self) -> f64 {
        self.config.cruise_efficiency
    }

    /// Copy of this solver flying at a different cruise efficiency.
    pub fn with_cruise_efficiency(&self, cruise_efficiency: f64) -> Self {
        let mut solver = self.clone();
        solver.config.cruise_efficiency = cruise_efficiency;
        solver
    }

    fn virtual_mc(&self, mc: f64) -> f64 {
        mc.max(self.config.virtual_mc_floor)
    }

    /// Full solve: glide if possible, otherwise glide then cruise.
    pub fn solve(&self, aircraft: &AircraftState, task: &GlideState) -> GlideResult {
        if task.distance() <= NEAR_ZERO {
            return self.optimise(aircraft, task, SolverMode::Vertical);
        }

        let glide = self.optimise(aircraft, task, SolverMode::Glide);
        if task.mc <= 0.0 || glide.solution.is_ok() {
            return glide;
        }

        let remaining = GlideState::new(
            GeoVector::new((task.distance() - glide.distance).max(0.0), task.bearing()),
            task.min_height + glide.height_glide,
            task.mc,
        );
        let mode = if remaining.distance() <= NEAR_ZERO {
            SolverMode::Vertical
        } else {
            SolverMode::Cruise
        };
        let cruise = self.optimise(aircraft, &remaining, mode);
        debug!(
            glide = ?glide.solution,
            cruise = ?cruise.solution,
            glide_distance = glide.distance,
            "glide short of target, adding cruise segment"
        );
        glide.merged(&cruise)
    }

    /// Best result over the airspeed scan for one mode.
    pub fn optimise(
        &self,
        aircraft: &AircraftState,
        task: &GlideState,
        mode: SolverMode,
    ) -> GlideResult {
        let mut best = GlideResult::unsolved(aircraft, task);
        for v in self.speed_scan() {
            let candidate = self.solve_mode(aircraft, task, mode, v);
            if candidate.superior(&best) {
                best = candidate;
            }
        }
        best
    }

    /// Airspeed giving the best glide score for `task.mc`, ignoring whether
    /// the height suffices.
    pub fn speed_to_fly(&self, aircraft: &AircraftState, task: &GlideState) -> Option<f64> {
        let theta = wind_angle(aircraft, task.bearing());
        let virtual_mc = self.virtual_mc(task.mc);
        let mut best: Option<(f64, f64)> = None;
        for v in self.speed_scan() {
            let airspeed = v * self.config.cruise_efficiency;
            let Some(vn) = ground_speed(airspeed, aircraft.wind_speed, theta) else {
                continue;
            };
            if vn <= NEAR_ZERO {
                continue;
            }
            let score = vn / (1.0 + self.polar.sink_rate(v) / virtual_mc);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((v, score));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Height left over on arrival when gliding the whole leg at the speed
    /// to fly; negative when the glide falls short.
    pub fn glide_margin(&self, aircraft: &AircraftState, task: &GlideState) -> Option<f64> {
        let available = aircraft.altitude - task.min_height;
        if task.distance() <= NEAR_ZERO {
            return Some(available);
        }
        let v = self.speed_to_fly(aircraft, task)?;
        let theta = wind_angle(aircraft, task.bearing());
        let vn = ground_speed(v * self.config.cruise_efficiency, aircraft.wind_speed, theta)?;
        Some(available - self.polar.sink_rate(v) * task.distance() / vn)
    }

    fn speed_scan(&self) -> impl Iterator<Item = f64> {
        let GlideConfig {
            v_min,
            v_max,
            v_step,
            ..
        } = self.config;
        let steps = if v_step > 0.0 && v_max >= v_min {
            ((v_max - v_min) / v_step).round() as usize
        } else {
            0
        };
        (0..=steps).map(move |i| v_min + i as f64 * v_step)
    }

    pub fn solve_mode(
        &self,
        aircraft: &AircraftState,
        task: &GlideState,
        mode: SolverMode,
        v: f64,
    ) -> GlideResult {
        match mode {
            SolverMode::Vertical => self.solve_vertical(aircraft, task, v),
            SolverMode::Glide => self.solve_glide(aircraft, task, v),
            SolverMode::Cruise => self.solve_cruise(aircraft, task, v),
        }
    }

    /// Climb in place until the height deficit is repaid, flying back
    /// upwind to cancel the drift.
    pub fn solve_vertical(&self, aircraft: &AircraftState, task: &GlideState, v: f64) -> GlideResult {
        let mut result = GlideResult::unsolved(aircraft, task);
        let dh = task.height_deficit(aircraft);
        if dh <= 0.0 {
            result.v_opt = v;
            return result.with_solution(Solution::Ok);
        }

        let airspeed = v * self.config.cruise_efficiency;
        let sink = self.polar.sink_rate(v);
        let wind = aircraft.wind_speed;

        let denom1 = airspeed - wind;
        if denom1 <= 0.0 {
            return result.with_solution(Solution::WindExceeds);
        }
        let denom2 = task.mc * denom1 - sink * wind;
        if denom2 <= 0.0 {
            return result.with_solution(Solution::MacCreadyInsufficient);
        }

        let t_climb = dh * denom1 / denom2;
        let t_cruise = wind * t_climb / denom1;

        result.v_opt = v;
        result.time_elapsed = t_climb + t_cruise;
        result.height_climb = task.mc * t_climb;
        result.height_glide = sink * t_cruise;
        result
            .with_solution(Solution::Ok)
            .finish(aircraft, airspeed, self.virtual_mc(task.mc))
    }

    pub fn solve_glide(&self, aircraft: &AircraftState, task: &GlideState, v: f64) -> GlideResult {
        self.glide_with_sink(aircraft, task, v, self.polar.sink_rate(v))
    }

    /// Glide at the airspeed the glide scan selects, descending at
    /// `sink_rate` instead of the polar sink.
    pub fn solve_sink(
        &self,
        aircraft: &AircraftState,
        task: &GlideState,
        sink_rate: f64,
    ) -> GlideResult {
        let best = self.optimise(aircraft, task, SolverMode::Glide);
        if best.v_opt <= 0.0 {
            return best;
        }
        self.glide_with_sink(aircraft, task, best.v_opt, sink_rate)
    }

    fn glide_with_sink(
        &self,
        aircraft: &AircraftState,
        task: &GlideState,
        v: f64,
        sink: f64,
    ) -> GlideResult {
        let mut result = GlideResult::unsolved(aircraft, task);
        let airspeed = v * self.config.cruise_efficiency;

        let Some(vn) = ground_speed(airspeed, aircraft.wind_speed, result.effective_wind_angle)
        else {
            return result.with_solution(Solution::WindExceeds);
        };
        if vn <= NEAR_ZERO {
            return result.with_solution(Solution::WindExceeds);
        }

        let dh = task.height_deficit(aircraft);
        let distance = task.distance();
        result.v_opt = v;

        let solution = if vn * dh + sink * distance > 0.0 {
            if dh >= 0.0 || sink <= 0.0 {
                return result
                    .with_solution(Solution::MacCreadyInsufficient)
                    .finish(aircraft, airspeed, self.virtual_mc(task.mc));
            }
            result.distance = -vn * dh / sink;
            Solution::Partial
        } else {
            result.distance = distance;
            Solution::Ok
        };

        result.time_elapsed = result.distance / vn;
        result.height_glide = sink * result.time_elapsed;
        result
            .with_solution(solution)
            .finish(aircraft, airspeed, self.virtual_mc(task.mc))
    }

    pub fn solve_cruise(&self, aircraft: &AircraftState, task: &GlideState, v: f64) -> GlideResult {
        let mut result = GlideResult::unsolved(aircraft, task);
        if task.mc <= 0.0 {
            return result.with_solution(Solution::MacCreadyInsufficient);
        }

        let airspeed = v * self.config.cruise_efficiency;
        let sink = self.polar.sink_rate(v);
        let wind = aircraft.wind_speed;

        // initial climb repays any deficit while drifting downwind
        let t_climb_initial = task.height_deficit(aircraft).max(0.0) / task.mc;
        let leg = drift_corrected(
            &task.vector,
            wind * t_climb_initial,
            aircraft.wind_towards(),
        );
        let theta = wind_angle(aircraft, leg.bearing);

        let rho = sink / task.mc;
        let Some(vn) = ground_speed(airspeed / (1.0 + rho), wind, theta) else {
            return result.with_solution(Solution::WindExceeds);
        };
        if vn <= NEAR_ZERO {
            return result.with_solution(Solution::MacCreadyInsufficient);
        }

        let t_cycle = leg.distance / vn;
        let t_cruise = t_cycle / (1.0 + rho);
        let t_climb = rho * t_cruise;

        result.v_opt = v;
        result.distance = task.distance();
        result.effective_wind_angle = theta;
        result.time_elapsed = t_climb_initial + t_cycle;
        result.height_climb = task.mc * (t_climb + t_climb_initial);
        result.height_glide = sink * t_cruise;
        result
            .with_solution(Solution::Ok)
            .finish(aircraft, airspeed, self.virtual_mc(task.mc))
    }
}

/// Leg vector after the start point has drifted by `drift` meters towards
/// `drift_bearing`. Flat-earth approximation, fine at thermal drift scales.
fn drift_corrected(leg: &GeoVector, drift: f64, drift_bearing: f64) -> GeoVector {
    if drift <= NEAR_ZERO {
        return *leg;
    }
    let (sin_l, cos_l) = leg.bearing.to_radians().sin_cos();
    let (sin_d, cos_d) = drift_bearing.to_radians().sin_cos();
    let east = leg.distance * sin_l - drift * sin_d;
    let north = leg.distance * cos_l - drift * cos_d;
    GeoVector::new(
        east.hypot(north),
        angle_limit_360(east.atan2(north).to_degrees()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> MacCready {
        MacCready::new(GlidePolar::default(), GlideConfig::default())
    }

    fn aircraft(altitude: f64) -> AircraftState {
        AircraftState::new(GeoPoint::new(45.0, 7.0), altitude, 0.0)
    }

    fn north_leg(distance: f64, min_height: f64, mc: f64) -> GlideState {
        GlideState::new(GeoVector::new(distance, 0.0), min_height, mc)
    }

    #[test]
    fn glide_only_zero_wind() {
        let solver = solver();
        let result = solver.solve(&aircraft(1500.0), &north_leg(10_000.0, 0.0, 0.0));

        assert_eq!(result.solution, Solution::Ok);
        assert!(
            (18.0..=26.0).contains(&result.v_opt),
            "v_opt {}",
            result.v_opt
        );
        assert!((result.distance - 10_000.0).abs() < 1e-6);
        let expected = solver.polar().sink_rate(result.v_opt) * result.time_elapsed;
        assert!((result.height_glide - expected).abs() < 1e-6);
        assert!(result.altitude_difference > 0.0);
        assert_eq!(result.height_climb, 0.0);
    }

    #[test]
    fn headwind_at_reference_speed_with_height_deficit() {
        // wind from the north at 20 m/s straight down the track
        let state = aircraft(400.0).with_wind(20.0, 0.0);
        let result = solver().solve(&state, &north_leg(10_000.0, 600.0, 0.0));
        assert_eq!(result.solution, Solution::WindExceeds);
    }

    #[test]
    fn headwind_with_some_height_is_partial() {
        let state = aircraft(1000.0).with_wind(20.0, 0.0);
        let result = solver().solve(&state, &north_leg(100_000.0, 0.0, 0.0));
        assert_eq!(result.solution, Solution::Partial);
        assert!(result.distance > 0.0 && result.distance < 100_000.0);
        assert!(result.v_opt > 20.0);
        assert!(result.altitude_difference.abs() < 1e-6);
    }

    #[test]
    fn crosswind_beyond_airspeed_has_no_root() {
        let state = aircraft(1000.0).with_wind(30.0, 270.0);
        let result = solver().solve_glide(&state, &north_leg(5_000.0, 0.0, 0.0), 20.0);
        assert_eq!(result.solution, Solution::WindExceeds);
    }

    #[test]
    fn vertical_mode() {
        let solver = solver();
        let above = solver.solve(&aircraft(800.0), &north_leg(0.0, 500.0, 2.0));
        assert_eq!(above.solution, Solution::Ok);
        assert_eq!(above.time_elapsed, 0.0);

        let below = solver.solve(&aircraft(300.0), &north_leg(0.0, 500.0, 2.0));
        assert_eq!(below.solution, Solution::Ok);
        assert!((below.time_elapsed - 100.0).abs() < 1e-9);
        assert!((below.height_climb - 200.0).abs() < 1e-9);

        let no_lift = solver.solve(&aircraft(300.0), &north_leg(0.0, 500.0, 0.0));
        assert_eq!(no_lift.solution, Solution::MacCreadyInsufficient);
    }

    #[test]
    fn vertical_mode_flies_back_upwind() {
        let state = aircraft(300.0).with_wind(5.0, 90.0);
        let result = solver().solve(&state, &north_leg(0.0, 500.0, 2.0));
        assert_eq!(result.solution, Solution::Ok);
        assert!(result.height_glide > 0.0);
        assert!((result.arrival_altitude(300.0) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn cruise_climbs_what_it_glides() {
        let result = solver().solve(&aircraft(500.0), &north_leg(50_000.0, 300.0, 2.0));
        assert_eq!(result.solution, Solution::Ok);
        assert!((result.distance - 50_000.0).abs() < 1e-6);
        assert!(result.height_climb > 0.0);
        assert!(result.altitude_difference.abs() < 1e-6);
        assert!(result.time_elapsed > 50_000.0 / 50.0);
    }

    #[test]
    fn higher_mc_never_loses_distance() {
        let solver = solver();
        let state = aircraft(1000.0).with_wind(5.0, 200.0);
        let task = north_leg(100_000.0, 0.0, 0.0);

        let mut previous = solver.solve(&state, &task);
        assert_eq!(previous.solution, Solution::Partial);
        for mc in [0.5, 1.0, 2.0, 3.0, 4.0] {
            let result = solver.solve(&state, &GlideState { mc, ..task });
            assert!(result.distance >= previous.distance - 1e-6, "mc {mc}");
            if previous.solution.is_ok() {
                assert_ne!(result.solution, Solution::WindExceeds);
            }
            previous = result;
        }
        assert!(previous.solution.is_ok());
    }

    #[test]
    fn ranking_prefers_kind_then_speed() {
        let ok_slow = GlideResult {
            solution: Solution::Ok,
            distance: 1000.0,
            time_elapsed: 100.0,
            ..GlideResult::default()
        };
        let ok_fast = GlideResult {
            time_elapsed: 50.0,
            ..ok_slow
        };
        let partial = GlideResult {
            solution: Solution::Partial,
            time_elapsed: 10.0,
            ..ok_slow
        };

        assert!(ok_fast.superior(&ok_slow));
        assert!(!ok_slow.superior(&ok_fast));
        assert!(ok_slow.superior(&partial));
        assert!(partial.superior(&GlideResult::default()));
        assert!(Solution::WindExceeds < Solution::MacCreadyInsufficient);
    }

    #[test]
    fn merge_accumulates_and_combines_margins() {
        let glide = GlideResult {
            solution: Solution::Partial,
            distance: 2000.0,
            time_elapsed: 100.0,
            height_glide: 150.0,
            altitude_difference: -20.0,
            min_height: 300.0,
            ..GlideResult::default()
        };
        let cruise = GlideResult {
            solution: Solution::Ok,
            distance: 3000.0,
            time_elapsed: 200.0,
            height_climb: 300.0,
            height_glide: 100.0,
            altitude_difference: 50.0,
            min_height: 450.0,
            v_opt: 30.0,
            ..GlideResult::default()
        };
        let merged = glide.merged(&cruise);
        assert_eq!(merged.solution, Solution::Ok);
        assert_eq!(merged.distance, 5000.0);
        assert_eq!(merged.time_elapsed, 300.0);
        assert_eq!(merged.height_glide, 250.0);
        assert_eq!(merged.altitude_difference, 30.0);
        assert_eq!(merged.min_height, 300.0);
        assert_eq!(merged.v_opt, 30.0);

        let both_high = GlideResult {
            altitude_difference: 80.0,
            ..glide
        };
        assert_eq!(both_high.merged(&cruise).altitude_difference, 80.0);
    }

    #[test]
    fn speed_to_fly_rises_with_mc() {
        let solver = solver();
        let state = aircraft(1500.0);
        let slow = solver.speed_to_fly(&state, &north_leg(30_000.0, 0.0, 0.0)).unwrap();
        let fast = solver.speed_to_fly(&state, &north_leg(30_000.0, 0.0, 4.0)).unwrap();
        assert!(fast > slow);

        let lazy = solver.glide_margin(&state, &north_leg(30_000.0, 0.0, 0.0)).unwrap();
        let eager = solver.glide_margin(&state, &north_leg(30_000.0, 0.0, 4.0)).unwrap();
        assert!(lazy > eager);
        assert!(eager < 0.0);
    }

    #[test]
    fn crosswind_heading_points_into_wind() {
        // wind from the west pushes east; hold a northerly track
        let heading = cruise_track_bearing(0.0, 5.0, 90.0, 25.0);
        assert!(heading > 270.0 && heading < 360.0, "heading {heading}");
    }

    #[test]
    fn sink_override_changes_height_only() {
        let solver = solver();
        let task = north_leg(10_000.0, 0.0, 0.0);
        let normal = solver.optimise(&aircraft(1500.0), &task, SolverMode::Glide);
        let sinking = solver.solve_sink(&aircraft(1500.0), &task, 2.0);
        assert_eq!(sinking.v_opt, normal.v_opt);
        assert!(sinking.height_glide > normal.height_glide);
        assert!((sinking.time_elapsed - normal.time_elapsed).abs() < 1e-9);
    }
}
