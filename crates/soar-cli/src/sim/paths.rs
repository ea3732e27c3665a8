//! Synthetic flight paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use soar_core::{intermediate_point, AircraftState, GeoPoint};
use std::f64::consts::PI;

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Position and altitude at `t` seconds from the path start.
    fn position(&self, t: f64) -> (GeoPoint, f64);

    /// True airspeed in m/s.
    fn airspeed(&self) -> f64;

    /// Seconds until the path ends.
    fn duration(&self) -> f64;

    /// Ground track at `t`, estimated from the position change by default.
    fn track(&self, t: f64) -> f64 {
        let (a, _) = self.position(t);
        let (b, _) = self.position(t + 0.5);
        if a.is_near(&b, 1e-3) {
            return 0.0;
        }
        a.bearing(&b)
    }

    /// Full navigation state at `t`, with airspeed and track filled in.
    fn state(&self, t: f64) -> AircraftState {
        let (location, altitude) = self.position(t);
        let (ahead, _) = self.position(t + 1.0);
        let ground_speed = location.distance(&ahead);
        AircraftState::new(location, altitude, t).with_velocity(
            ground_speed,
            self.airspeed(),
            self.track(t),
        )
    }
}

/// Thermal circle around a fixed center, climbing at a constant rate.
pub struct CircularPath {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub base_altitude: f64,
    pub climb_rate: f64,
    pub speed_mps: f64,
    pub start_angle: f64,
    pub clockwise: bool,
    pub turns: f64,
    period: f64,
}

impl CircularPath {
    pub fn new(
        center: GeoPoint,
        radius_m: f64,
        base_altitude: f64,
        climb_rate: f64,
        speed_mps: f64,
        turns: f64,
    ) -> Self {
        let period = 2.0 * PI * radius_m / speed_mps;
        Self {
            center,
            radius_m,
            base_altitude,
            climb_rate,
            speed_mps,
            start_angle: 0.0,
            clockwise: false,
            turns,
            period,
        }
    }

    pub fn clockwise(mut self) -> Self {
        self.clockwise = true;
        self
    }

    pub fn period(&self) -> f64 {
        self.period
    }
}

impl FlightPath for CircularPath {
    fn position(&self, t: f64) -> (GeoPoint, f64) {
        let t = t.clamp(0.0, self.duration());
        let mut angle = self.start_angle + 360.0 * t / self.period;
        if self.clockwise {
            angle = -angle;
        }
        (
            self.center.destination(angle, self.radius_m),
            self.base_altitude + self.climb_rate * t,
        )
    }

    fn airspeed(&self) -> f64 {
        self.speed_mps
    }

    fn duration(&self) -> f64 {
        self.turns * self.period
    }
}

/// Straight glide between two points with a constant sink rate.
pub struct LinearPath {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub altitude: f64,
    pub sink_rate: f64,
    pub speed_mps: f64,
    pub distance_m: f64,
    track: f64,
}

impl LinearPath {
    pub fn new(start: GeoPoint, end: GeoPoint, altitude: f64, speed_mps: f64) -> Self {
        Self {
            start,
            end,
            altitude,
            sink_rate: 0.0,
            speed_mps,
            distance_m: start.distance(&end),
            track: start.bearing(&end),
        }
    }

    pub fn with_sink(mut self, sink_rate: f64) -> Self {
        self.sink_rate = sink_rate;
        self
    }
}

impl FlightPath for LinearPath {
    fn position(&self, t: f64) -> (GeoPoint, f64) {
        let t = t.clamp(0.0, self.duration());
        let location = intermediate_point(&self.start, &self.end, self.speed_mps * t);
        (location, self.altitude - self.sink_rate * t)
    }

    fn airspeed(&self) -> f64 {
        self.speed_mps
    }

    fn duration(&self) -> f64 {
        if self.speed_mps > 0.0 {
            self.distance_m / self.speed_mps
        } else {
            0.0
        }
    }

    fn track(&self, _t: f64) -> f64 {
        self.track
    }
}

/// Segments flown back to back.
pub struct SegmentedPath {
    segments: Vec<Box<dyn FlightPath>>,
}

impl SegmentedPath {
    pub fn new(segments: Vec<Box<dyn FlightPath>>) -> Self {
        Self { segments }
    }

    /// Glides at `speed_mps` through `points`, starting at `altitude` and
    /// losing `sink_rate` m/s on the way.
    pub fn through(points: &[GeoPoint], altitude: f64, speed_mps: f64, sink_rate: f64) -> Self {
        let mut segments: Vec<Box<dyn FlightPath>> = Vec::new();
        let mut altitude = altitude;
        for pair in points.windows(2) {
            let leg = LinearPath::new(pair[0], pair[1], altitude, speed_mps).with_sink(sink_rate);
            altitude -= sink_rate * leg.duration();
            segments.push(Box::new(leg));
        }
        Self { segments }
    }

    pub fn push(&mut self, segment: Box<dyn FlightPath>) {
        self.segments.push(segment);
    }

    /// Altitude where the last segment ends.
    pub fn end_altitude(&self) -> Option<f64> {
        self.segments
            .last()
            .map(|s| s.position(s.duration()).1)
    }

    pub fn end_point(&self) -> Option<GeoPoint> {
        self.segments
            .last()
            .map(|s| s.position(s.duration()).0)
    }

    fn segment_at(&self, t: f64) -> Option<(&dyn FlightPath, f64)> {
        let mut offset = 0.0;
        for (i, segment) in self.segments.iter().enumerate() {
            let duration = segment.duration();
            if t < offset + duration || i + 1 == self.segments.len() {
                return Some((segment.as_ref(), t - offset));
            }
            offset += duration;
        }
        None
    }
}

impl FlightPath for SegmentedPath {
    fn position(&self, t: f64) -> (GeoPoint, f64) {
        match self.segment_at(t) {
            Some((segment, local)) => segment.position(local),
            None => (GeoPoint::default(), 0.0),
        }
    }

    fn airspeed(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.airspeed())
    }

    fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration()).sum()
    }

    fn track(&self, t: f64) -> f64 {
        match self.segment_at(t) {
            Some((segment, local)) => segment.track(local),
            None => 0.0,
        }
    }

    fn state(&self, t: f64) -> AircraftState {
        match self.segment_at(t) {
            Some((segment, local)) => {
                let mut state = segment.state(local);
                state.time = t;
                state
            }
            None => AircraftState::default(),
        }
    }
}

/// Horizontal GPS error, uniform in bearing with a Gaussian-ish radius.
pub struct GpsNoise {
    sigma_m: f64,
    rng: StdRng,
}

impl GpsNoise {
    pub fn new(sigma_m: f64) -> Self {
        Self {
            sigma_m,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(sigma_m: f64, seed: u64) -> Self {
        Self {
            sigma_m,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn apply(&mut self, mut state: AircraftState) -> AircraftState {
        if self.sigma_m <= 0.0 {
            return state;
        }
        // sum of three uniforms, close enough to normal for a fix jitter
        let offset: f64 = (0..3)
            .map(|_| self.rng.random_range(-1.0..1.0))
            .sum::<f64>()
            * self.sigma_m;
        let bearing = self.rng.random_range(0.0..360.0);
        state.location = state.location.destination(bearing, offset.abs());
        state
    }
}
