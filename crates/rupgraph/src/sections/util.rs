//! Planar trace helpers (km frame).

use nalgebra::Vector2;

pub(crate) fn trace_length(trace: &[Vector2<f64>]) -> f64 {
    trace.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Point at fraction `frac` (0..=1) of the trace length.
pub(crate) fn point_along(trace: &[Vector2<f64>], frac: f64) -> Vector2<f64> {
    let total = trace_length(trace);
    if total <= 0.0 {
        return trace[0];
    }
    let mut remaining = total * frac.clamp(0.0, 1.0);
    for w in trace.windows(2) {
        let seg = (w[1] - w[0]).norm();
        if remaining <= seg && seg > 0.0 {
            return w[0] + (w[1] - w[0]) * (remaining / seg);
        }
        remaining -= seg;
    }
    trace[trace.len() - 1]
}

/// Azimuth of `to` seen from `from`, degrees clockwise from north in [0, 360).
pub fn azimuth_deg(from: Vector2<f64>, to: Vector2<f64>) -> f64 {
    let d = to - from;
    if d.x == 0.0 && d.y == 0.0 {
        return 0.0;
    }
    let az = d.x.atan2(d.y).to_degrees();
    if az < 0.0 {
        az + 360.0
    } else {
        az
    }
}

/// Absolute difference between two azimuths, in [0, 180].
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

#[inline]
fn cross(o: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let u = a - o;
    let v = b - o;
    u.x * v.y - u.y * v.x
}

fn point_segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (a + ab * t - p).norm()
}

fn segments_cross(p1: Vector2<f64>, p2: Vector2<f64>, q1: Vector2<f64>, q2: Vector2<f64>) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn segment_distance(p1: Vector2<f64>, p2: Vector2<f64>, q1: Vector2<f64>, q2: Vector2<f64>) -> f64 {
    if segments_cross(p1, p2, q1, q2) {
        return 0.0;
    }
    point_segment_distance(p1, q1, q2)
        .min(point_segment_distance(p2, q1, q2))
        .min(point_segment_distance(q1, p1, p2))
        .min(point_segment_distance(q2, p1, p2))
}

/// Minimum distance between two polylines (0 when they touch or cross).
pub(crate) fn polyline_distance(a: &[Vector2<f64>], b: &[Vector2<f64>]) -> f64 {
    let mut best = f64::INFINITY;
    for wa in a.windows(2) {
        for wb in b.windows(2) {
            best = best.min(segment_distance(wa[0], wa[1], wb[0], wb[1]));
            if best == 0.0 {
                return 0.0;
            }
        }
    }
    best
}
