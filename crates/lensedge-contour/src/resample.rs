//! Contour offsetting and decentration resampling.

use std::f64::consts::TAU;

use lensedge_math::{sample_angles, wrap_angle};

use crate::{PolarContour, Result};

/// Offset a contour along its local outward normal.
///
/// `r_new = r + offset · sqrt(r² + (dr/dφ)²) / r`, the exact polar form of a
/// constant-distance offset.
pub fn offset_normal(contour: &PolarContour, offset_mm: f64) -> Result<PolarContour> {
    let r = contour.radii();
    let n = r.len();
    let d_phi = TAU / n as f64;

    let radii: Vec<f64> = (0..n)
        .map(|i| {
            let next = r[(i + 1) % n];
            let prev = r[(i + n - 1) % n];
            let dr_dphi = (next - prev) / (2.0 * d_phi);
            let hypotenuse = (r[i] * r[i] + dr_dphi * dr_dphi).sqrt();
            let safe_r = r[i].max(1e-6);
            r[i] + offset_mm * hypotenuse / safe_r
        })
        .collect();

    PolarContour::new(radii, contour.heights().to_vec())
}

/// Shift a contour by `(dx, dy)` in the lens plane and resample it back to
/// uniform angles.
///
/// The shifted points land on a non-uniform angle grid, so radii and heights
/// are sorted by their new angle, padded across the 2π seam, and linearly
/// interpolated onto the uniform output grid.
pub fn recentre(contour: &PolarContour, dx: f64, dy: f64) -> Result<PolarContour> {
    let n = contour.len();
    let points = contour.cartesian_points();

    let mut samples: Vec<(f64, f64, f64)> = points
        .iter()
        .zip(contour.heights().iter())
        .map(|(p, &h)| {
            let x = p.x + dx;
            let y = p.y + dy;
            (wrap_angle(y.atan2(x)), x.hypot(y), h)
        })
        .collect();
    samples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    // Pad one sample past each end of the seam so interpolation wraps.
    let first = samples[0];
    let last = samples[n - 1];
    let mut angles = Vec::with_capacity(n + 2);
    let mut radii = Vec::with_capacity(n + 2);
    let mut heights = Vec::with_capacity(n + 2);
    angles.push(last.0 - TAU);
    radii.push(last.1);
    heights.push(last.2);
    for &(a, r, h) in &samples {
        angles.push(a);
        radii.push(r);
        heights.push(h);
    }
    angles.push(first.0 + TAU);
    radii.push(first.1);
    heights.push(first.2);

    let out_angles = sample_angles(n);
    let out_radii: Vec<f64> = out_angles.iter().map(|&a| interp(a, &angles, &radii)).collect();
    let out_heights: Vec<f64> = out_angles
        .iter()
        .map(|&a| interp(a, &angles, &heights))
        .collect();

    PolarContour::new(out_radii, out_heights)
}

/// Linear interpolation of `ys` over ascending `xs`, clamped at the ends.
fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    match xs.iter().position(|&v| v >= x) {
        Some(0) => ys[0],
        Some(i) => {
            let span = xs[i] - xs[i - 1];
            if span.abs() < f64::EPSILON {
                ys[i]
            } else {
                let t = (x - xs[i - 1]) / span;
                ys[i - 1] + t * (ys[i] - ys[i - 1])
            }
        }
        None => *ys.last().expect("interp tables are non-empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_offset_normal_on_circle() {
        let c = PolarContour::circular(90, 10.0);
        let off = offset_normal(&c, 2.0).unwrap();
        for &r in off.radii() {
            assert_relative_eq!(r, 12.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_recentre_circle() {
        let c = PolarContour::circular(360, 10.0);
        let shifted = recentre(&c, 2.0, 0.0).unwrap();
        // Radius toward +x grows by the shift, away from it shrinks.
        assert_relative_eq!(shifted.radii()[0], 12.0, epsilon = 1e-2);
        assert_relative_eq!(shifted.radii()[180], 8.0, epsilon = 1e-2);
        assert_eq!(shifted.len(), 360);
    }

    #[test]
    fn test_recentre_carries_heights() {
        let heights: Vec<f64> = (0..36).map(|i| (i as f64).sin()).collect();
        let c = PolarContour::new(vec![20.0; 36], heights).unwrap();
        let shifted = recentre(&c, 0.0, 0.0).unwrap();
        // Zero shift must be an identity within interpolation error.
        for (a, b) in c.heights().iter().zip(shifted.heights()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}
