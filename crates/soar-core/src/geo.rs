//! Spherical-earth geometry for task legs and observation zones.
//!
//! Angles are degrees at the API boundary (0 = north, clockwise) and are
//! converted to radians internally. Distances are meters on a sphere of
//! radius [`EARTH_RADIUS_M`].

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Intermediate results closer to zero than this are snapped to zero before
/// they reach `asin`/`acos`, so round-off cannot push an argument outside
/// [-1, 1] or flip the sign of a vanishing cross-track term.
pub const NEAR_ZERO: f64 = 1e-7;

/// A location on the sphere.
///
/// Constructed values are normalized: latitude in [-90, 90], longitude in
/// (-180, 180], deserialized ones included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawGeoPoint")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl From<RawGeoPoint> for GeoPoint {
    fn from(raw: RawGeoPoint) -> Self {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
        .normalized()
    }

    /// Fold latitude back over the poles and wrap longitude.
    pub fn normalized(self) -> Self {
        let mut latitude = angle_limit_180(self.latitude);
        let mut longitude = self.longitude;
        if latitude > 90.0 {
            latitude = 180.0 - latitude;
            longitude += 180.0;
        } else if latitude < -90.0 {
            latitude = -180.0 - latitude;
            longitude += 180.0;
        }
        Self {
            latitude,
            longitude: angle_limit_180(longitude),
        }
    }

    pub fn distance(&self, other: &GeoPoint) -> f64 {
        distance_bearing(self, other).0
    }

    pub fn bearing(&self, other: &GeoPoint) -> f64 {
        distance_bearing(self, other).1
    }

    /// Point reached after travelling `distance_m` along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        if distance_m.abs() <= f64::EPSILON {
            return *self;
        }

        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let bearing = bearing_deg.to_radians();
        let angular_distance = distance_m / EARTH_RADIUS_M;

        let (sin_lat1, cos_lat1) = lat1.sin_cos();
        let (sin_ad, cos_ad) = angular_distance.sin_cos();

        let sin_lat2 = (sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing.cos()).clamp(-1.0, 1.0);
        let lat2 = sin_lat2.asin();

        let y = bearing.sin() * sin_ad * cos_lat1;
        let x = cos_ad - sin_lat1 * sin_lat2;
        let lon2 = lon1 + y.atan2(x);

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }

    /// True when the two points are within `tolerance_m` of each other.
    pub fn is_near(&self, other: &GeoPoint, tolerance_m: f64) -> bool {
        self.distance(other) <= tolerance_m
    }
}

/// A leg expressed as great-circle distance and initial bearing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoVector {
    pub distance: f64,
    pub bearing: f64,
}

impl GeoVector {
    pub fn new(distance: f64, bearing: f64) -> Self {
        Self {
            distance,
            bearing: angle_limit_360(bearing),
        }
    }

    pub fn between(from: &GeoPoint, to: &GeoPoint) -> Self {
        let (distance, bearing) = distance_bearing(from, to);
        Self { distance, bearing }
    }

    pub fn end_point(&self, origin: &GeoPoint) -> GeoPoint {
        origin.destination(self.bearing, self.distance)
    }
}

/// Great-circle distance (m) and initial bearing (deg, [0, 360)) from `a` to `b`.
///
/// Distance uses the half-angle (haversine) form, which stays accurate for
/// short legs; bearing is zero when the points coincide.
pub fn distance_bearing(a: &GeoPoint, b: &GeoPoint) -> (f64, f64) {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_lat2, cos_lat2) = lat2.sin_cos();

    let s1 = ((lat2 - lat1) * 0.5).sin();
    let s2 = (dlon * 0.5).sin();
    let h = (s1 * s1 + cos_lat1 * cos_lat2 * s2 * s2).clamp(0.0, 1.0);
    let distance = (2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())).max(0.0);

    let (sin_dlon, cos_dlon) = dlon.sin_cos();
    let y = sin_dlon * cos_lat2;
    let x = cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dlon;
    let bearing = if x.abs() <= f64::EPSILON && y.abs() <= f64::EPSILON {
        0.0
    } else {
        angle_limit_360(y.atan2(x).to_degrees())
    };

    (distance, bearing)
}

/// Point at great-circle distance `d` from `a` towards `b`.
///
/// `d` at or beyond the total leg length returns `b` exactly, and `d <= 0`
/// returns `a`.
pub fn intermediate_point(a: &GeoPoint, b: &GeoPoint, d: f64) -> GeoPoint {
    let (total, bearing) = distance_bearing(a, b);
    if d >= total {
        return *b;
    }
    if d <= 0.0 || total <= 0.0 {
        return *a;
    }

    let delta = total / EARTH_RADIUS_M;
    let sin_delta = delta.sin();
    if sin_delta.abs() < NEAR_ZERO {
        // near-antipodal: the interpolation plane is undefined
        return a.destination(bearing, d);
    }

    let f = d / total;
    let inv_sin = 1.0 / sin_delta;
    let wa = ((1.0 - f) * delta).sin() * inv_sin;
    let wb = (f * delta).sin() * inv_sin;

    let (sin_lat1, cos_lat1) = a.latitude.to_radians().sin_cos();
    let (sin_lat2, cos_lat2) = b.latitude.to_radians().sin_cos();
    let (sin_lon1, cos_lon1) = a.longitude.to_radians().sin_cos();
    let (sin_lon2, cos_lon2) = b.longitude.to_radians().sin_cos();

    let x = wa * cos_lat1 * cos_lon1 + wb * cos_lat2 * cos_lon2;
    let y = wa * cos_lat1 * sin_lon1 + wb * cos_lat2 * sin_lon2;
    let z = wa * sin_lat1 + wb * sin_lat2;

    GeoPoint::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        y.atan2(x).to_degrees(),
    )
}

/// Angular cross-track and along-track distances (radians) of `p` relative
/// to the great circle through `a` towards `b`.
fn track_components(a: &GeoPoint, b: &GeoPoint, p: &GeoPoint) -> (f64, f64, f64) {
    let (dist_ap, crs_ap) = distance_bearing(a, p);
    let (_, crs_ab) = distance_bearing(a, b);

    let dist_ap = dist_ap / EARTH_RADIUS_M;
    let dcrs = (crs_ap - crs_ab).to_radians();

    let sin_xtd = snap_zero(dist_ap.sin() * dcrs.sin()).clamp(-1.0, 1.0);
    let xtd = sin_xtd.asin();

    let cos_xtd = xtd.cos();
    let atd = if cos_xtd.abs() < NEAR_ZERO {
        0.0
    } else {
        let ratio = snap_zero(dist_ap.cos() / cos_xtd).clamp(-1.0, 1.0);
        let magnitude = ratio.acos();
        if snap_zero(dcrs.cos()) < 0.0 {
            -magnitude
        } else {
            magnitude
        }
    };

    (xtd, atd, crs_ab)
}

/// Signed perpendicular distance (m, positive right of track) from `p` to the
/// path `a`→`b`, and the foot of the perpendicular on that great circle.
pub fn cross_track_error(a: &GeoPoint, b: &GeoPoint, p: &GeoPoint) -> (f64, GeoPoint) {
    let (xtd, atd, crs_ab) = track_components(a, b, p);
    let foot = a.destination(crs_ab, atd * EARTH_RADIUS_M);
    (xtd * EARTH_RADIUS_M, foot)
}

/// Along-track distance (m) from `a` to the projection of `p` on `a`→`b`.
///
/// Negative when the projection lies behind `a`; lateral deviation earns no
/// progress.
pub fn project_distance(a: &GeoPoint, b: &GeoPoint, p: &GeoPoint) -> f64 {
    let (_, atd, _) = track_components(a, b, p);
    atd * EARTH_RADIUS_M
}

/// Normalize an angle to [0, 360).
pub fn angle_limit_360(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalize an angle to (-180, 180].
pub fn angle_limit_180(angle: f64) -> f64 {
    let wrapped = angle_limit_360(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Whether `bearing` lies on the clockwise arc from `start` to `end`.
///
/// `start > end` means the arc crosses north; equal radials cover the full
/// circle.
pub fn bearing_in_arc(bearing: f64, start: f64, end: f64) -> bool {
    let b = angle_limit_360(bearing);
    let s = angle_limit_360(start);
    let e = angle_limit_360(end);
    if (s - e).abs() <= f64::EPSILON {
        true
    } else if s < e {
        b >= s && b <= e
    } else {
        b >= s || b <= e
    }
}

pub(crate) fn snap_zero(value: f64) -> f64 {
    if value.abs() < NEAR_ZERO {
        0.0
    } else {
        value
    }
}
