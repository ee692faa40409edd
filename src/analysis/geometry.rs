// src/analysis/geometry.rs - Per-point heading, turn, arc length and curvature
//
// Degenerate input (zero-length steps, colinear triplets) yields NaN fields,
// never an error. Curvature and turn angle are informational; labeling only
// reads the heading and elevation angles.

use mpal_preprocess::Point3;
use serde::Serialize;

/// Geometry of one trajectory point.
///
/// `heading` and `elevation` describe the step from this point to the next and
/// are NaN on the last point. `turn_angle`, `radius` and `curvature` need both
/// neighbours and are NaN on the first and last points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometryRecord {
    /// Horizontal-plane heading, degrees in (-180, 180].
    pub heading: f64,
    /// Elevation above the horizontal plane, degrees.
    pub elevation: f64,
    /// Angle between the incoming (reversed) and outgoing steps, degrees.
    pub turn_angle: f64,
    pub arc_length: f64,
    /// Circumradius of the circle through the previous, current and next point.
    pub radius: f64,
    /// Offset to the circumcentre scaled by 1/R².
    pub curvature: [f64; 3],
}

impl GeometryRecord {
    pub const COLUMNS: usize = 9;

    fn empty() -> Self {
        Self {
            heading: f64::NAN,
            elevation: f64::NAN,
            turn_angle: f64::NAN,
            arc_length: f64::NAN,
            radius: f64::NAN,
            curvature: [f64::NAN; 3],
        }
    }

    /// Flat export row: X global angle, Y global angle (both the horizontal
    /// heading), Z global angle, turn angle, arc length, radius, curvature x/y/z.
    pub fn to_row(&self) -> [f64; Self::COLUMNS] {
        [
            self.heading,
            self.heading,
            self.elevation,
            self.turn_angle,
            self.arc_length,
            self.radius,
            self.curvature[0],
            self.curvature[1],
            self.curvature[2],
        ]
    }
}

/// Circle through three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    pub radius: f64,
    pub center: Point3,
    pub curvature: [f64; 3],
}

/// Compute the geometry record of every point.
pub fn compute(points: &[Point3]) -> Vec<GeometryRecord> {
    let n = points.len();
    let mut records = vec![GeometryRecord::empty(); n];

    for i in 0..n.saturating_sub(1) {
        let (heading, elevation) = step_angles(&points[i], &points[i + 1]);
        records[i].heading = heading;
        records[i].elevation = elevation;
    }

    let mut degenerate = 0usize;
    for i in 1..n.saturating_sub(1) {
        records[i].turn_angle = turn_angle(&points[i - 1], &points[i], &points[i + 1]);
        let circle = circumcircle(&points[i], &points[i - 1], &points[i + 1]);
        records[i].radius = circle.radius;
        records[i].curvature = circle.curvature;
        if circle.radius.is_nan() || records[i].turn_angle.is_nan() {
            degenerate += 1;
        }
    }

    for (record, length) in records.iter_mut().zip(arc_lengths(points)) {
        record.arc_length = length;
    }

    if degenerate > 0 {
        tracing::debug!("{} of {} interior points have degenerate geometry", degenerate, n.saturating_sub(2));
    }
    records
}

/// Heading (atan2 of y over x) and elevation of the step `from -> to`, in degrees.
pub fn step_angles(from: &Point3, to: &Point3) -> (f64, f64) {
    let d = sub(to, from);
    let heading = d[1].atan2(d[0]).to_degrees();
    let elevation = d[2].atan2((d[0] * d[0] + d[1] * d[1]).sqrt()).to_degrees();
    (heading, elevation)
}

/// Angle at `at` between the directions to `next` and to `prev`, in degrees.
/// A straight continuation gives 180. NaN if either step has zero length.
pub fn turn_angle(prev: &Point3, at: &Point3, next: &Point3) -> f64 {
    let (Some(n1), Some(n2)) = (unit(&sub(next, at)), unit(&sub(prev, at))) else {
        return f64::NAN;
    };
    norm(&cross(&n1, &n2)).atan2(dot(&n1, &n2)).to_degrees()
}

/// Circumcircle through `a`, `b`, `c`, expressed relative to `a`.
///
/// Colinear points give NaN everywhere. A zero radius keeps the raw offset as
/// the curvature vector instead of dividing by zero.
pub fn circumcircle(a: &Point3, b: &Point3, c: &Point3) -> Circumcircle {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let d = cross(&ab, &ac);
    let denom = dot(&d, &d);
    if denom == 0.0 {
        return Circumcircle {
            radius: f64::NAN,
            center: [f64::NAN; 3],
            curvature: [f64::NAN; 3],
        };
    }

    let b_len2 = dot(&ac, &ac);
    let c_len2 = dot(&ab, &ab);
    let e = cross(&d, &ab);
    let f = cross(&d, &ac);
    let g = [
        (b_len2 * e[0] - c_len2 * f[0]) / denom / 2.0,
        (b_len2 * e[1] - c_len2 * f[1]) / denom / 2.0,
        (b_len2 * e[2] - c_len2 * f[2]) / denom / 2.0,
    ];
    Circumcircle {
        radius: norm(&g),
        center: [a[0] + g[0], a[1] + g[1], a[2] + g[2]],
        curvature: curvature_from_offset(g),
    }
}

/// Curvature vector `g / |g|^2` from the offset to the circumcentre. A zero
/// offset is returned unchanged.
fn curvature_from_offset(g: [f64; 3]) -> [f64; 3] {
    let r2 = dot(&g, &g);
    if r2 == 0.0 {
        g
    } else {
        [g[0] / r2, g[1] / r2, g[2] / r2]
    }
}

/// Cumulative arc length per point.
///
/// The last entry counts the previous cumulative length twice:
/// `L[n-1] = L[n-2] + L[n-2] + |P[n-1] - P[n-2]|`. Downstream consumers of
/// exported parameter tables depend on this value as-is.
pub fn arc_lengths(points: &[Point3]) -> Vec<f64> {
    let n = points.len();
    let mut lengths = vec![0.0; n];
    if n < 2 {
        return lengths;
    }
    for i in 1..n - 1 {
        lengths[i] = lengths[i - 1] + norm(&sub(&points[i], &points[i - 1]));
    }
    let last = n - 1;
    lengths[last] = lengths[last - 1] + lengths[last - 1] + norm(&sub(&points[last], &points[last - 1]));
    lengths
}

fn sub(a: &Point3, b: &Point3) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn unit(a: &[f64; 3]) -> Option<[f64; 3]> {
    let length = norm(a);
    if length > 0.0 {
        Some([a[0] / length, a[1] / length, a[2] / length])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_step_angles() {
        let origin = [0.0, 0.0, 0.0];
        assert_eq!(step_angles(&origin, &[1.0, 0.0, 0.0]), (0.0, 0.0));
        let (heading, _) = step_angles(&origin, &[0.0, 1.0, 0.0]);
        assert!(close(heading, 90.0));
        let (heading, _) = step_angles(&origin, &[-1.0, 0.0, 0.0]);
        assert!(close(heading, 180.0));
        let (_, elevation) = step_angles(&origin, &[0.0, 0.0, -2.0]);
        assert!(close(elevation, -90.0));
    }

    #[test]
    fn test_turn_angle_straight_and_right_angle() {
        let straight = turn_angle(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert!(close(straight, 180.0));
        let corner = turn_angle(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[1.0, 1.0, 0.0]);
        assert!(close(corner, 90.0));
        let stalled = turn_angle(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert!(stalled.is_nan());
    }

    #[test]
    fn test_circumcircle_of_unit_circle_points() {
        let circle = circumcircle(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, -1.0, 0.0]);
        assert!(close(circle.radius, 1.0));
        for (got, want) in circle.center.iter().zip([0.0, 0.0, 0.0]) {
            assert!(close(*got, want));
        }
        // Curvature points from `a` toward the centre with magnitude 1/R
        assert!(close(circle.curvature[0], -1.0));
    }

    #[test]
    fn test_circumcircle_colinear_is_nan() {
        let circle = circumcircle(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert!(circle.radius.is_nan());
        assert!(circle.curvature.iter().all(|k| k.is_nan()));
    }

    #[test]
    fn test_zero_offset_keeps_raw_curvature() {
        assert_eq!(curvature_from_offset([0.0; 3]), [0.0; 3]);
        let k = curvature_from_offset([0.0, 2.0, 0.0]);
        assert!(close(k[1], 0.5));
        assert_eq!(k[0], 0.0);
    }

    #[test]
    fn test_arc_length_doubles_previous_on_last_point() {
        let points: Vec<Point3> = (0..4).map(|i| [i as f64, 0.0, 0.0]).collect();
        // L = [0, 1, 2, 2 + 2 + 1]
        assert_eq!(arc_lengths(&points), vec![0.0, 1.0, 2.0, 5.0]);
        let pair = vec![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]];
        assert_eq!(arc_lengths(&pair), vec![0.0, 5.0]);
    }

    #[test]
    fn test_boundary_records_are_nan() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        let records = compute(&points);
        assert_eq!(records.len(), 3);
        assert!(records[0].turn_angle.is_nan() && records[0].radius.is_nan());
        assert!(records[2].heading.is_nan() && records[2].radius.is_nan());
        assert!(close(records[1].turn_angle, 90.0));
        assert!(close(records[1].radius, (0.5f64).sqrt()));
        assert_eq!(records[1].to_row()[0], records[1].to_row()[1]);
    }
}
