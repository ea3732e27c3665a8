//! Sink-rate polars.
//!
//! Every polar is stored as `sink(V) = a·V² + b·V + c` (m/s, positive down).

use crate::error::PolarError;
use serde::{Deserialize, Serialize};

/// How the polar is specified in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolarConfig {
    /// `sink(V) = sink_min + curvature·((V − v_ref)/v_ref)²`
    Parabolic {
        v_ref: f64,
        sink_min: f64,
        curvature: f64,
    },
    /// Three measured (speed, sink) pairs, fitted exactly.
    Measured { points: [(f64, f64); 3] },
}

impl Default for PolarConfig {
    fn default() -> Self {
        PolarConfig::Parabolic {
            v_ref: 20.0,
            sink_min: 1.0,
            curvature: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlidePolar {
    a: f64,
    b: f64,
    c: f64,
}

impl GlidePolar {
    pub fn from_config(config: &PolarConfig) -> Result<Self, PolarError> {
        match *config {
            PolarConfig::Parabolic {
                v_ref,
                sink_min,
                curvature,
            } => Self::parabolic(v_ref, sink_min, curvature),
            PolarConfig::Measured { points } => Self::from_points(points),
        }
    }

    pub fn parabolic(v_ref: f64, sink_min: f64, curvature: f64) -> Result<Self, PolarError> {
        if !(v_ref.is_finite() && v_ref > 0.0) {
            return Err(PolarError::InvalidReferenceSpeed(v_ref));
        }
        if !(curvature.is_finite() && curvature > 0.0) {
            return Err(PolarError::NotConvex);
        }
        let k = curvature / (v_ref * v_ref);
        Ok(Self {
            a: k,
            b: -2.0 * k * v_ref,
            c: sink_min + curvature,
        })
    }

    /// Exact parabola through three (speed, sink) points.
    pub fn from_points(points: [(f64, f64); 3]) -> Result<Self, PolarError> {
        let [(v1, w1), (v2, w2), (v3, w3)] = points;
        let d = (v1 - v2) * (v1 - v3) * (v2 - v3);
        if d.abs() < 1e-9 {
            return Err(PolarError::DegeneratePoints);
        }

        let a = (v3 * (w2 - w1) + v2 * (w1 - w3) + v1 * (w3 - w2)) / d;
        let b = (v3 * v3 * (w1 - w2) + v2 * v2 * (w3 - w1) + v1 * v1 * (w2 - w3)) / d;
        let c = (v2 * v3 * (v2 - v3) * w1 + v3 * v1 * (v3 - v1) * w2 + v1 * v2 * (v1 - v2) * w3)
            / d;

        if a <= 0.0 || c <= 0.0 {
            return Err(PolarError::NotConvex);
        }
        Ok(Self { a, b, c })
    }

    pub fn sink_rate(&self, v: f64) -> f64 {
        (self.a * v + self.b) * v + self.c
    }

    /// Speed of minimum sink.
    pub fn min_sink_speed(&self) -> f64 {
        -self.b / (2.0 * self.a)
    }

    pub fn min_sink(&self) -> f64 {
        self.sink_rate(self.min_sink_speed())
    }

    /// Speed of best still-air glide ratio (tangent from the origin).
    pub fn best_ld_speed(&self) -> f64 {
        (self.c / self.a).sqrt()
    }

    pub fn best_ld(&self) -> f64 {
        let v = self.best_ld_speed();
        v / self.sink_rate(v)
    }
}

impl Default for GlidePolar {
    fn default() -> Self {
        // reference polar: v_ref 20 m/s, 1 m/s minimum sink, curvature 4
        Self {
            a: 0.01,
            b: -0.4,
            c: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn reference_parabola() {
        let polar = GlidePolar::from_config(&PolarConfig::default()).unwrap();
        assert_close(polar.sink_rate(20.0), 1.0, 1e-12);
        assert_close(polar.sink_rate(40.0), 5.0, 1e-12);
        assert_close(polar.sink_rate(10.0), 2.0, 1e-12);
        assert_close(polar.min_sink_speed(), 20.0, 1e-12);
    }

    #[test]
    fn best_glide_is_faster_than_min_sink() {
        let polar = GlidePolar::default();
        let v = polar.best_ld_speed();
        assert_close(v, 20.0 * 1.25f64.sqrt(), 1e-9);
        assert!(polar.sink_rate(v) / v <= polar.sink_rate(v - 1.0) / (v - 1.0));
        assert!(polar.sink_rate(v) / v <= polar.sink_rate(v + 1.0) / (v + 1.0));
    }

    #[test]
    fn measured_points_are_reproduced() {
        let points = [(22.0, 0.6), (30.0, 0.8), (45.0, 1.6)];
        let polar = GlidePolar::from_points(points).unwrap();
        for (v, w) in points {
            assert_close(polar.sink_rate(v), w, 1e-9);
        }
        assert!(polar.best_ld() > 30.0);
    }

    #[test]
    fn rejects_degenerate_points() {
        let err = GlidePolar::from_points([(20.0, 1.0), (20.0, 1.1), (30.0, 2.0)]);
        assert_eq!(err, Err(PolarError::DegeneratePoints));
    }

    #[test]
    fn rejects_bad_reference_speed() {
        assert_eq!(
            GlidePolar::parabolic(0.0, 1.0, 4.0),
            Err(PolarError::InvalidReferenceSpeed(0.0))
        );
    }
}
