//! Per-sample task statistics and the task-level glide searches.

use crate::config::TaskBehaviour;
use crate::geo::{GeoVector, NEAR_ZERO};
use crate::glide::{GlideResult, GlideState, MacCready, Solution};
use crate::models::AircraftState;
use crate::task::OrderedTask;
use crate::zero_finder::ZeroFinder;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceStat {
    pub distance: f64,
    /// Distance over the relevant elapsed or estimated time
    pub speed: f64,
    /// Moving average of the per-sample rate of change
    pub speed_incremental: f64,
}

impl DistanceStat {
    fn set(&mut self, distance: f64, time: f64) {
        self.distance = distance;
        self.speed = if time > NEAR_ZERO { distance / time } else { 0.0 };
    }
}

/// Short moving average over per-sample distance rates, smoothing GPS noise.
#[derive(Debug, Clone)]
pub struct SpeedFilter {
    window: VecDeque<f64>,
    capacity: usize,
    last: Option<(f64, f64)>,
}

impl SpeedFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            last: None,
        }
    }

    /// Feed `distance` at `time`; `sign` is -1 for quantities that shrink
    /// as the aircraft progresses.
    pub fn update(&mut self, time: f64, distance: f64, sign: f64) -> f64 {
        if let Some((last_time, last_distance)) = self.last {
            let dt = time - last_time;
            if dt > NEAR_ZERO {
                if self.window.len() == self.capacity {
                    self.window.pop_front();
                }
                self.window.push_back(sign * (distance - last_distance) / dt);
            }
        }
        self.last = Some((time, distance));
        self.value()
    }

    pub fn value(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.window.iter().sum::<f64>() / self.window.len() as f64
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStat {
    pub remaining: DistanceStat,
    pub planned: DistanceStat,
    pub travelled: DistanceStat,
    pub time_elapsed: f64,
    pub time_remaining: f64,
    pub time_planned: f64,
    pub solution_remaining: GlideResult,
    pub solution_planned: GlideResult,
}

/// Whole-task snapshot emitted once per sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub time: f64,
    pub total: ElementStat,
    pub current_leg: ElementStat,
    pub distance_nominal: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub distance_scored: f64,
    /// Height over distance still available to the binding task point
    pub glide_required: f64,
    pub cruise_efficiency: f64,
    pub mc_best: f64,
    pub task_started: bool,
    pub task_finished: bool,
    pub active_index: Option<usize>,
}

/// Filters feeding the incremental speeds of one element.
#[derive(Debug, Clone)]
pub struct ElementFilters {
    pub remaining: SpeedFilter,
    pub travelled: SpeedFilter,
}

impl ElementFilters {
    pub fn new(samples: usize) -> Self {
        Self {
            remaining: SpeedFilter::new(samples),
            travelled: SpeedFilter::new(samples),
        }
    }

    pub fn apply(&mut self, stat: &mut ElementStat, time: f64) {
        stat.remaining.speed_incremental =
            self.remaining.update(time, stat.remaining.distance, -1.0);
        stat.travelled.speed_incremental =
            self.travelled.update(time, stat.travelled.distance, 1.0);
        stat.planned.speed_incremental = stat.travelled.speed_incremental;
    }

    pub fn reset(&mut self) {
        self.remaining.reset();
        self.travelled.reset();
    }
}

impl ElementStat {
    pub fn fill(
        &mut self,
        remaining: f64,
        travelled: f64,
        planned: f64,
        time_elapsed: f64,
        solution_remaining: GlideResult,
        solution_planned: GlideResult,
    ) {
        self.time_elapsed = time_elapsed;
        self.time_remaining = solution_remaining.time_elapsed;
        self.time_planned = time_elapsed + self.time_remaining;
        self.solution_remaining = solution_remaining;
        self.solution_planned = solution_planned;
        self.remaining.set(remaining, self.time_remaining);
        self.travelled.set(travelled, time_elapsed);
        self.planned.set(planned, self.time_planned);
    }
}

/// Sum one more leg into a running total. The verdict is the worst leg's
/// and the margin is the tightest leg's.
fn accumulate(total: &mut GlideResult, leg: &GlideResult) {
    total.solution = total.solution.max(leg.solution);
    total.distance += leg.distance;
    total.height_climb += leg.height_climb;
    total.height_glide += leg.height_glide;
    total.time_elapsed += leg.time_elapsed;
    total.time_virtual += leg.time_virtual;
    total.altitude_difference = total.altitude_difference.min(leg.altitude_difference);
}

/// Chain solves through the remaining points starting from `origin`.
pub fn solve_sequence(
    solver: &MacCready,
    task: &OrderedTask,
    origin: &AircraftState,
    from_index: usize,
    mc: f64,
    behaviour: &TaskBehaviour,
) -> GlideResult {
    let mut state = *origin;
    let mut total: Option<GlideResult> = None;
    for point in task.points().iter().skip(from_index) {
        let destination = point.planning_location();
        let min_height = point.waypoint.altitude + behaviour.safety_height_arrival;
        let leg = GlideState::to_point(&state, &destination, min_height, mc);
        let result = solver.solve(&state, &leg);

        match total.as_mut() {
            None => total = Some(result),
            Some(sum) => accumulate(sum, &result),
        }
        state.altitude = result.arrival_altitude(state.altitude);
        state.location = destination;
    }
    total.unwrap_or_else(|| GlideResult {
        solution: Solution::Ok,
        altitude_difference: origin.altitude,
        ..GlideResult::default()
    })
}

/// Glide over the rest of the task from the aircraft.
pub fn solve_remaining(
    solver: &MacCready,
    task: &OrderedTask,
    aircraft: &AircraftState,
    mc: f64,
    behaviour: &TaskBehaviour,
) -> GlideResult {
    if task.is_finished() {
        return GlideResult {
            solution: Solution::Ok,
            ..GlideResult::default()
        };
    }
    let from = task.active_index().unwrap_or(0);
    solve_sequence(solver, task, aircraft, from, mc, behaviour)
}

/// Glide over the rest of the task from the start of the current leg, at
/// the aircraft's altitude.
pub fn solve_planned(
    solver: &MacCready,
    task: &OrderedTask,
    aircraft: &AircraftState,
    mc: f64,
    behaviour: &TaskBehaviour,
) -> GlideResult {
    let Some(active) = task.active_index() else {
        return GlideResult::default();
    };
    if active == 0 || task.is_finished() {
        return solve_remaining(solver, task, aircraft, mc, behaviour);
    }
    let mut origin = *aircraft;
    origin.location = task.points()[active - 1].planning_location();
    solve_sequence(solver, task, &origin, active, mc, behaviour)
}

/// Smallest ratio of height available to distance still to fly, over the
/// remaining points.
pub fn calc_gradient(task: &OrderedTask, aircraft: &AircraftState) -> f64 {
    let Some(active) = task.active_index() else {
        return 0.0;
    };
    if task.is_finished() {
        return 0.0;
    }

    let mut from = aircraft.location;
    let mut distance = 0.0;
    let mut gradient: Option<f64> = None;
    for point in &task.points()[active..] {
        let to = point.planning_location();
        distance += from.distance(&to);
        from = to;
        if distance <= NEAR_ZERO {
            continue;
        }
        let g = (aircraft.altitude - point.waypoint.altitude) / distance;
        gradient = Some(gradient.map_or(g, |current: f64| current.min(g)));
    }
    gradient.unwrap_or(0.0)
}

/// Tightest arrival margin over the remaining points when every leg is
/// glided at the speed to fly for `mc`.
pub fn final_glide_margin(
    solver: &MacCready,
    task: &OrderedTask,
    aircraft: &AircraftState,
    mc: f64,
    behaviour: &TaskBehaviour,
) -> Option<f64> {
    let active = task.active_index()?;
    let mut state = *aircraft;
    let mut margin: Option<f64> = None;
    for point in &task.points()[active..] {
        let destination = point.planning_location();
        let min_height = point.waypoint.altitude + behaviour.safety_height_arrival;
        let leg = GlideState::to_point(&state, &destination, min_height, mc);
        let leg_margin = solver.glide_margin(&state, &leg)?;
        margin = Some(margin.map_or(leg_margin, |m: f64| m.min(leg_margin)));
        state.altitude = min_height + leg_margin;
        state.location = destination;
    }
    margin
}

/// MacCready setting at which the remaining task is flown arriving with no
/// spare height.
pub fn calc_mc_best(
    solver: &MacCready,
    task: &OrderedTask,
    aircraft: &AircraftState,
    behaviour: &TaskBehaviour,
) -> f64 {
    // stands in for legs the wind makes impossible
    const UNREACHABLE: f64 = -1.0e6;

    if task.is_finished() {
        return 0.0;
    }
    let mc_max = solver.config().mc_max;
    let margin = |mc: f64| {
        final_glide_margin(solver, task, aircraft, mc, behaviour).unwrap_or(UNREACHABLE)
    };

    if margin(0.0) <= 0.0 {
        return 0.0;
    }
    if margin(mc_max) >= 0.0 {
        return mc_max;
    }
    ZeroFinder::new(0.0, mc_max, 0.01)
        .find_zero(margin)
        .unwrap_or(0.0)
}

/// Cruise efficiency that makes the planned time for the distance flown
/// since the start match the time actually taken.
pub fn calc_cruise_efficiency(
    solver: &MacCready,
    task: &OrderedTask,
    aircraft: &AircraftState,
    mc: f64,
) -> f64 {
    const MIN: f64 = 0.1;
    const MAX: f64 = 2.0;

    let Some(start) = task.points().first().and_then(|p| p.state_exited()) else {
        return 1.0;
    };
    let elapsed = aircraft.time - start.time;
    let travelled = task.distance_travelled(aircraft);
    if !task.is_started() || elapsed <= NEAR_ZERO || travelled <= NEAR_ZERO {
        return 1.0;
    }

    let mut origin = *start;
    origin.wind_speed = aircraft.wind_speed;
    origin.wind_direction = aircraft.wind_direction;
    let bearing = start.location.bearing(&aircraft.location);
    let leg = GlideState::new(GeoVector::new(travelled, bearing), aircraft.altitude, mc);

    let time_error = |efficiency: f64| {
        let result = solver.with_cruise_efficiency(efficiency).solve(&origin, &leg);
        if result.solution.is_ok() {
            result.time_elapsed - elapsed
        } else {
            f64::INFINITY
        }
    };

    let low = time_error(MIN);
    let high = time_error(MAX);
    if !low.is_finite() && !high.is_finite() {
        return 1.0;
    }
    if low <= 0.0 {
        return MIN;
    }
    if high >= 0.0 {
        return MAX;
    }
    ZeroFinder::new(MIN, MAX, 0.001)
        .find_zero(time_error)
        .unwrap_or(1.0)
}
