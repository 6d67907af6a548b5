//! Collision-based kinematics inversion for a tilted rotary wheel.
//!
//! The "max-projection" method: the wheel's cross-section in the cutting
//! plane is an ellipse with semi-axes `a = cutting radius` and
//! `b = a·cos(tilt)`. For each machine rotation angle the whole contour is
//! rotated into the wheel frame and every reachable point demands a wheel
//! centre offset that keeps the ellipse tangent through it; the largest
//! demand wins, so the wheel clears every point. Slower than an analytic
//! inversion but robust against sharp corners and noisy contours.

use lensedge_contour::PolarContour;
use lensedge_math::sample_angles;
use rayon::prelude::*;

/// Safe-retract margin added to the cutting radius when no contour point is
/// reachable at some rotation angle.
pub const RETRACT_MARGIN_MM: f64 = 100.0;

/// Machine-axis samples tracing one contour: one entry per rotation step.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsSolution {
    /// Machine rotation angle per sample (degrees).
    pub theta_deg: Vec<f64>,
    /// Tool-axis (machine X) position per sample (mm).
    pub x_mm: Vec<f64>,
    /// Axial (machine Z) position per sample (mm).
    pub z_mm: Vec<f64>,
}

impl KinematicsSolution {
    /// Number of rotation samples.
    pub fn len(&self) -> usize {
        self.theta_deg.len()
    }

    /// True when the solution carries no samples.
    pub fn is_empty(&self) -> bool {
        self.theta_deg.is_empty()
    }
}

/// Solve machine X/Z/theta for one contour on a wheel of `cutting_radius_mm`
/// tilted by `tilt_deg`.
///
/// `axial_zero_offset_mm` shifts the Z datum (wheel cutting-edge zero).
/// The rotation resolution equals the contour resolution. Never fails: a
/// rotation angle with no reachable point emits the finite retract sentinel
/// `(cutting_radius + RETRACT_MARGIN_MM, axial_zero_offset)` instead.
pub fn solve(
    contour: &PolarContour,
    cutting_radius_mm: f64,
    tilt_deg: f64,
    axial_zero_offset_mm: f64,
) -> KinematicsSolution {
    let n = contour.len();
    if n == 0 {
        return KinematicsSolution {
            theta_deg: Vec::new(),
            x_mm: Vec::new(),
            z_mm: Vec::new(),
        };
    }

    let points: Vec<(f64, f64)> = contour
        .cartesian_points()
        .iter()
        .map(|p| (p.x, p.y))
        .collect();
    let heights = contour.heights();

    let a = cutting_radius_mm;
    let b = cutting_radius_mm * tilt_deg.to_radians().cos();
    let tan_tilt = tilt_deg.to_radians().tan();

    let theta = sample_angles(n);
    // Rotation steps are independent; order of evaluation cannot change the
    // per-step maximum.
    let solved: Vec<(f64, f64)> = theta
        .par_iter()
        .map(|&theta_m| solve_at_angle(&points, heights, a, b, tan_tilt, axial_zero_offset_mm, theta_m))
        .collect();

    KinematicsSolution {
        theta_deg: theta.iter().map(|t| t.to_degrees()).collect(),
        x_mm: solved.iter().map(|s| s.0).collect(),
        z_mm: solved.iter().map(|s| s.1).collect(),
    }
}

/// One rotation step of the max-projection search.
fn solve_at_angle(
    points: &[(f64, f64)],
    heights: &[f64],
    a: f64,
    b: f64,
    tan_tilt: f64,
    axial_zero_offset_mm: f64,
    theta_m: f64,
) -> (f64, f64) {
    // The machine rotates clockwise relative to the lens.
    let (sin_t, cos_t) = (-theta_m).sin_cos();

    let mut best_x = f64::NEG_INFINITY;
    let mut contact: Option<(f64, f64)> = None; // (x_rot, height) of the governing point

    for (i, &(x, y)) in points.iter().enumerate() {
        let x_rot = x * cos_t - y * sin_t;
        let y_rot = x * sin_t + y * cos_t;

        // Points further off-axis than the major semi-axis pass over or
        // under the wheel and cannot be touched at this angle.
        if y_rot.abs() >= a {
            continue;
        }

        let radicand = (1.0 - (y_rot * y_rot) / (a * a)).max(0.0);
        let x_center = x_rot + b * radicand.sqrt();
        if x_center > best_x {
            best_x = x_center;
            contact = Some((x_rot, heights[i]));
        }
    }

    match contact {
        Some((x_rot, height)) => {
            // Tangency correction for Z on the tilted wheel.
            let tilt_z = (best_x - x_rot) * tan_tilt;
            (best_x, axial_zero_offset_mm - height - tilt_z)
        }
        None => (a + RETRACT_MARGIN_MM, axial_zero_offset_mm),
    }
}
