#![warn(missing_docs)]

//! Math types for the lensedge planning and simulation crates.
//!
//! Thin wrappers around nalgebra providing the domain-specific pieces the
//! edging pipeline needs: planar points, axis rotation, uniform angular
//! sampling, and evenly spaced value grids.

use nalgebra::{Vector2, Vector3};
use std::f64::consts::TAU;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in the lens plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the lens plane.
pub type Vec2 = Vector2<f64>;

/// Geometric tolerance for millimetre-scale comparisons.
pub const MM_EPS: f64 = 1e-9;

/// The angle (radians) of sample `i` out of `n` uniform samples on a circle.
pub fn sample_angle(i: usize, n: usize) -> f64 {
    i as f64 * TAU / n as f64
}

/// All `n` uniform sample angles, `[0, 2π)`, endpoint excluded.
pub fn sample_angles(n: usize) -> Vec<f64> {
    (0..n).map(|i| sample_angle(i, n)).collect()
}

/// `n` evenly spaced values from `start` to `stop`, endpoints included.
///
/// `n == 0` yields an empty vector, `n == 1` yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Convert polar coordinates to a point in the lens plane.
pub fn polar_point(radius: f64, angle: f64) -> Point2 {
    Point2::new(radius * angle.cos(), radius * angle.sin())
}

/// Rotate a 3D vector about the Z axis by `angle` radians.
pub fn rotate_z(v: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_sample_angles() {
        let angles = sample_angles(4);
        assert_eq!(angles.len(), 4);
        assert_relative_eq!(angles[0], 0.0);
        assert_relative_eq!(angles[1], FRAC_PI_2);
        assert_relative_eq!(angles[3], 3.0 * FRAC_PI_2);
    }

    #[test]
    fn test_linspace() {
        let vals = linspace(0.0, 10.0, 5);
        assert_eq!(vals, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn test_rotate_z_preserves_z() {
        let v = rotate_z(Vec3::new(1.0, 2.0, 3.0), PI);
        assert_relative_eq!(v.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 3.0);
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2);
        assert_relative_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
    }
}
