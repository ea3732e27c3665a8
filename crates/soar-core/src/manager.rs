//! Task manager: owns the task and the solver, consumes one aircraft sample
//! at a time and hands back an owned [`TaskStats`] snapshot.

use crate::config::{EngineConfig, TaskBehaviour};
use crate::error::{PolarError, TaskError};
use crate::glide::{GlideResult, GlideState, MacCready};
use crate::models::AircraftState;
use crate::polar::GlidePolar;
use crate::stats::{
    calc_cruise_efficiency, calc_gradient, calc_mc_best, solve_planned, solve_remaining,
    ElementFilters, TaskStats,
};
use crate::task::{OrderedTask, PointKind, TaskEvent};
use tracing::{debug, info, warn};

pub struct TaskManager {
    task: OrderedTask,
    solver: MacCready,
    behaviour: TaskBehaviour,
    mc: f64,
    last_state: Option<AircraftState>,
    stats: TaskStats,
    events: Vec<TaskEvent>,
    total_filters: ElementFilters,
    leg_filters: ElementFilters,
}

impl TaskManager {
    pub fn new(config: EngineConfig) -> Result<Self, PolarError> {
        let polar = GlidePolar::from_config(&config.polar)?;
        let samples = config.task.speed_filter_samples;
        Ok(Self {
            task: OrderedTask::new(),
            mc: config.glide.mc,
            solver: MacCready::new(polar, config.glide),
            behaviour: config.task,
            last_state: None,
            stats: TaskStats::default(),
            events: Vec::new(),
            total_filters: ElementFilters::new(samples),
            leg_filters: ElementFilters::new(samples),
        })
    }

    pub fn task(&self) -> &OrderedTask {
        &self.task
    }

    pub fn solver(&self) -> &MacCready {
        &self.solver
    }

    pub fn behaviour(&self) -> &TaskBehaviour {
        &self.behaviour
    }

    pub fn mc(&self) -> f64 {
        self.mc
    }

    pub fn set_mc(&mut self, mc: f64) {
        let mc = mc.max(0.0);
        debug!(mc, "MacCready changed");
        self.mc = mc;
    }

    /// Replace the task after validating it. Finish height rules from the
    /// configuration apply unless the finish zone carries its own.
    pub fn set_task(&mut self, mut task: OrderedTask) -> Result<(), TaskError> {
        if let Err(err) = task.check_task() {
            warn!(error = %err, "rejecting task");
            return Err(err);
        }

        let rules = self.behaviour.finish;
        if rules.max_height.is_some() || rules.min_height.is_some() {
            task.apply_finish_rules(rules);
        }
        task.reset();

        info!(
            points = task.len(),
            distance_nominal = task.distance_nominal(),
            "task loaded"
        );
        self.task = task;
        self.last_state = None;
        self.stats = TaskStats::default();
        self.events.clear();
        self.total_filters.reset();
        self.leg_filters.reset();
        Ok(())
    }

    /// Forget all progress on the current task.
    pub fn reset(&mut self) {
        self.task.reset();
        self.last_state = None;
        self.stats = TaskStats::default();
        self.total_filters.reset();
        self.leg_filters.reset();
    }

    /// Events gathered since the last call.
    pub fn take_events(&mut self) -> Vec<TaskEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Direct solve to the active point, from the latest sample.
    pub fn glide_to_active(&self) -> Option<GlideResult> {
        let state = self.last_state?;
        let point = self.task.active_point()?;
        let leg = GlideState::to_point(
            &state,
            &point.planning_location(),
            point.waypoint.altitude + self.behaviour.safety_height_arrival,
            self.mc,
        );
        Some(self.solver.solve(&state, &leg))
    }

    /// Process one sample. Samples must arrive in time order; one that
    /// goes back in time is ignored.
    pub fn update(&mut self, state: &AircraftState) -> TaskStats {
        if let Some(last) = self.last_state {
            if state.time < last.time {
                warn!(
                    time = state.time,
                    last = last.time,
                    "sample out of order, ignoring"
                );
                return self.stats.clone();
            }
            let events = self.task.update_transitions(state, &last);
            self.events.extend(events);
            if self.behaviour.fai_finish {
                self.task.update_finish_floor();
            }
        }
        self.task.update_area_targets(state, &self.behaviour);
        self.compute_stats(state);
        self.last_state = Some(*state);
        self.stats.clone()
    }

    fn compute_stats(&mut self, state: &AircraftState) {
        let task = &self.task;
        let solver = &self.solver;
        let behaviour = &self.behaviour;
        let stats = &mut self.stats;

        stats.time = state.time;
        stats.active_index = task.active_index();
        stats.task_started = task.is_started();
        stats.task_finished = task.is_finished();

        stats.distance_nominal = task.distance_nominal();
        stats.distance_scored = task.distance_scored(state);
        stats.distance_min = task.distance_min(state, behaviour.boundary_samples);
        stats.distance_max = task.distance_max(behaviour.boundary_samples);

        let time_elapsed = match (task.start_time(), task.finish_time()) {
            (Some(start), Some(finish)) => finish - start,
            (Some(start), None) => state.time - start,
            _ => 0.0,
        };

        let remaining = solve_remaining(solver, task, state, self.mc, behaviour);
        let planned = solve_planned(solver, task, state, self.mc, behaviour);
        stats.total.fill(
            task.distance_remaining(state),
            task.distance_travelled(state),
            task.distance_planned(),
            time_elapsed,
            remaining,
            planned,
        );
        self.total_filters.apply(&mut stats.total, state.time);

        let leg_remaining = self.glide_leg(state);
        let leg_elapsed = self.leg_elapsed(state);
        let stats = &mut self.stats;
        stats.current_leg.fill(
            self.task.vector_remaining(state).distance,
            self.task.vector_travelled(state).distance,
            self.task.vector_planned().distance,
            leg_elapsed,
            leg_remaining,
            leg_remaining,
        );
        self.leg_filters.apply(&mut stats.current_leg, state.time);

        stats.glide_required = calc_gradient(&self.task, state);
        stats.mc_best = calc_mc_best(&self.solver, &self.task, state, &self.behaviour);
        stats.cruise_efficiency = calc_cruise_efficiency(&self.solver, &self.task, state, self.mc);
    }

    fn glide_leg(&self, state: &AircraftState) -> GlideResult {
        if self.task.is_finished() {
            return GlideResult::default();
        }
        let Some(point) = self.task.active_point() else {
            return GlideResult::default();
        };
        let leg = GlideState::to_point(
            state,
            &point.planning_location(),
            point.waypoint.altitude + self.behaviour.safety_height_arrival,
            self.mc,
        );
        self.solver.solve(state, &leg)
    }

    /// Time since the previous point was achieved.
    fn leg_elapsed(&self, state: &AircraftState) -> f64 {
        let Some(active) = self.task.active_index() else {
            return 0.0;
        };
        let Some(previous) = active.checked_sub(1).and_then(|i| self.task.point(i)) else {
            return 0.0;
        };
        let achieved_at = match previous.kind() {
            PointKind::Start => previous.state_exited(),
            _ => previous.state_entered(),
        };
        achieved_at.map_or(0.0, |s| (state.time - s.time).max(0.0))
    }
}
