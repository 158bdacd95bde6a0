//! Route post-processing.
//!
//! Converts the jagged, grid-aligned search output into a visually natural
//! curve in three stages: near-collinear simplification, Catmull-Rom
//! spline interpolation, and one Chaikin corner-cutting pass. The first
//! and last points of the output always exactly equal the input's, and
//! this stage never fails: degenerate inputs pass through unchanged.

use saferoute_geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// Tuning for the post-processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingConfig {
    /// Direction changes below this many degrees collapse into a straight
    /// run during simplification.
    pub angle_threshold_deg: f64,
    /// Interpolated points generated per control-point segment by the
    /// spline stage.
    pub samples_per_segment: usize,
    /// Number of corner-cutting passes after the spline.
    pub chaikin_passes: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            angle_threshold_deg: 5.0,
            samples_per_segment: 8,
            chaikin_passes: 1,
        }
    }
}

/// Runs all three stages over a raw point sequence.
///
/// Inputs with fewer than 3 points pass through unchanged. For 3 or more
/// points the output is never shorter than the input and its endpoints
/// are pinned to the input's exact endpoints.
#[must_use]
pub fn process(points: &[GeoPoint], config: &SmoothingConfig) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let simplified = simplify(points, config.angle_threshold_deg);
    let splined = catmull_rom(&simplified, config.samples_per_segment.max(1));

    let mut polished = splined;
    for _ in 0..config.chaikin_passes {
        polished = chaikin(&polished);
    }

    // A long straight run can simplify down to its two endpoints and come
    // back sparser than it went in; the original points already describe
    // that line at full density.
    if polished.len() < points.len() {
        return points.to_vec();
    }

    // Float interpolation at t=0/t=1 should already land on the inputs,
    // but the endpoint guarantee is exact equality, so pin explicitly.
    if let Some(first) = polished.first_mut() {
        *first = points[0];
    }
    if let Some(last) = polished.last_mut() {
        *last = points[points.len() - 1];
    }

    polished
}

/// Drops interior points whose incoming/outgoing direction change is below
/// the angular threshold, collapsing near-collinear runs. The first and
/// last points are always retained.
#[must_use]
pub fn simplify(points: &[GeoPoint], angle_threshold_deg: f64) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![points[0]];

    for i in 1..points.len() - 1 {
        let prev = kept[kept.len() - 1];
        let turn = turn_angle_deg(prev, points[i], points[i + 1]);
        if turn.abs() >= angle_threshold_deg {
            kept.push(points[i]);
        }
    }

    kept.push(points[points.len() - 1]);
    kept
}

/// Uniform Catmull-Rom spline through the control points, sampling
/// `samples_per_segment` points per segment. Endpoint tangents use
/// clamped phantom points, so the curve passes through every control
/// point including both ends. A 2-point input samples its single segment,
/// so even a fully simplified straight run comes back densified.
#[must_use]
pub fn catmull_rom(points: &[GeoPoint], samples_per_segment: usize) -> Vec<GeoPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut out = vec![points[0]];

    for i in 0..points.len() - 1 {
        let p0 = if i == 0 { points[0] } else { points[i - 1] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 < points.len() {
            points[i + 2]
        } else {
            points[points.len() - 1]
        };

        for s in 1..=samples_per_segment {
            #[allow(clippy::cast_precision_loss)]
            let t = s as f64 / samples_per_segment as f64;
            out.push(GeoPoint::new(
                catmull_axis(p0.lat, p1.lat, p2.lat, p3.lat, t),
                catmull_axis(p0.lng, p1.lng, p2.lng, p3.lng, t),
            ));
        }
    }

    out
}

/// One Chaikin corner-cutting pass: each edge is replaced by points at 1/4
/// and 3/4 along it, with the original endpoints kept.
#[must_use]
pub fn chaikin(points: &[GeoPoint]) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);

    for pair in points.windows(2) {
        out.push(lerp(pair[0], pair[1], 0.25));
        out.push(lerp(pair[0], pair[1], 0.75));
    }

    out.push(points[points.len() - 1]);
    out
}

/// Signed direction change in degrees at `b` when walking `a -> b -> c`.
fn turn_angle_deg(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    let mut diff = heading_deg(b, c) - heading_deg(a, b);
    while diff > 180.0 {
        diff -= 360.0;
    }
    while diff < -180.0 {
        diff += 360.0;
    }
    diff
}

/// Compass-style heading from `a` to `b` in degrees, using a local planar
/// approximation (adequate at walking scale).
fn heading_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let mid_lat = f64::midpoint(a.lat, b.lat).to_radians();
    let de = (b.lng - a.lng) * mid_lat.cos();
    let dn = b.lat - a.lat;
    de.atan2(dn).to_degrees()
}

fn catmull_axis(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(
        (b.lat - a.lat).mul_add(t, a.lat),
        (b.lng - a.lng).mul_add(t, a.lng),
    )
}
