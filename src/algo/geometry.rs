//! Small geometric primitives shared by the force library.

use nalgebra::{Point3, Vector3};

/// Closest points between two infinite lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoints {
    /// Closest point on the first line.
    pub on_a: Point3<f64>,
    /// Closest point on the second line.
    pub on_b: Point3<f64>,
    /// Whether the lines were parallel and an arbitrary pair was chosen.
    pub parallel: bool,
}

impl ClosestPoints {
    /// Vector from the point on the first line to the point on the second.
    #[inline]
    pub fn gap(&self) -> Vector3<f64> {
        self.on_b - self.on_a
    }

    /// Distance between the two lines.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.gap().norm()
    }
}

/// Closest points between the line through `a0, a1` and the line through `b0, b1`.
///
/// For parallel lines the point `a0` is paired with its projection onto the
/// second line.
pub fn line_line_closest_points(
    a0: &Point3<f64>,
    a1: &Point3<f64>,
    b0: &Point3<f64>,
    b1: &Point3<f64>,
) -> ClosestPoints {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let r = a0 - b0;

    let a = d1.dot(&d1);
    let b = d1.dot(&d2);
    let c = d2.dot(&d2);
    let d = d1.dot(&r);
    let e = d2.dot(&r);

    let denom = a * c - b * b;
    let eps = 1e-12 * (a * c).max(f64::MIN_POSITIVE);

    let (s, t, parallel) = if denom.abs() <= eps {
        let t = if c > 0.0 { e / c } else { 0.0 };
        (0.0, t, true)
    } else {
        ((b * e - c * d) / denom, (a * e - b * d) / denom, false)
    };

    ClosestPoints {
        on_a: a0 + d1 * s,
        on_b: b0 + d2 * t,
        parallel,
    }
}

/// Signed distance from `p` to the plane through `origin` with unit `normal`.
#[inline]
pub fn point_plane_distance(p: &Point3<f64>, origin: &Point3<f64>, normal: &Vector3<f64>) -> f64 {
    (p - origin).dot(normal)
}

/// Angle in radians at `apex` between the rays towards `a` and `b`.
///
/// Zero when either ray has zero length.
pub fn corner_angle(apex: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    match (
        (a - apex).try_normalize(f64::EPSILON),
        (b - apex).try_normalize(f64::EPSILON),
    ) {
        (Some(u), Some(w)) => u.dot(&w).clamp(-1.0, 1.0).acos(),
        _ => 0.0,
    }
}

/// `-1`, `0` or `1` depending on the sign of `x`.
#[inline]
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    fn assert_close(p: &Point3<f64>, expected: [f64; 3]) {
        for i in 0..3 {
            assert_relative_eq!(p[i], expected[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_skew_diagonals() {
        let cp = line_line_closest_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(1.0, 0.0, 1.0),
            &Point3::new(0.0, 1.0, 1.0),
        );
        assert!(!cp.parallel);
        assert_close(&cp.on_a, [0.5, 0.5, 0.0]);
        assert_close(&cp.on_b, [0.5, 0.5, 1.0]);
        assert_relative_eq!(cp.distance(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_lines() {
        let cp = line_line_closest_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(3.0, 2.0, 0.0),
            &Point3::new(4.0, 2.0, 0.0),
        );
        assert!(cp.parallel);
        assert_close(&cp.on_a, [0.0, 0.0, 0.0]);
        assert_close(&cp.on_b, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_point_plane_distance() {
        let d = point_plane_distance(
            &Point3::new(1.0, 2.0, -3.0),
            &Point3::origin(),
            &Vector3::z(),
        );
        assert_relative_eq!(d, -3.0);
    }

    #[test]
    fn test_corner_angle() {
        let apex = Point3::origin();
        let a = Point3::new(2.0, 0.0, 0.0);
        let b = Point3::new(0.0, 5.0, 0.0);
        assert_relative_eq!(corner_angle(&apex, &a, &b), FRAC_PI_2);
        assert_eq!(corner_angle(&apex, &apex, &b), 0.0);
        assert_eq!(sign(-0.5), -1.0);
    }
}
