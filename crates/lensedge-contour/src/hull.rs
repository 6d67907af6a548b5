//! Convex-hull machinability wrap.
//!
//! A contour proposed by the roughing generator (`max` of target and a
//! shrinking circle) can have concave pockets a convex grinding sweep cannot
//! produce. The wrap replaces the contour by its convex hull, resampled back
//! to N uniform angles by exact ray/edge intersection so that non-convex
//! input does not get distorted by naive radius-by-angle interpolation.

use lensedge_math::{sample_angle, Point2, Vec2, MM_EPS};

use crate::PolarContour;

/// Replace a contour's radii by their convex-hull wrap, resampled to the
/// same uniform angles. Heights are carried through unchanged.
///
/// Degenerate point sets (fewer than three hull vertices) fall back to the
/// input contour.
pub fn wrap_machinable(contour: &PolarContour) -> PolarContour {
    let points = contour.cartesian_points();
    let hull = convex_hull(&points);
    if hull.len() < 3 {
        return contour.clone();
    }

    let n = contour.len();
    let radii: Vec<f64> = (0..n)
        .map(|i| {
            let angle = sample_angle(i, n);
            ray_hull_radius(&hull, angle).unwrap_or(contour.radii()[i])
        })
        .collect();

    // Radii came from hull intersections, so the invariants hold.
    PolarContour::new(radii, contour.heights().to_vec())
        .unwrap_or_else(|_| contour.clone())
}

/// Monotone-chain convex hull, counter-clockwise, no duplicate endpoint.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted: Vec<Point2> = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| (a.x - b.x).abs() < MM_EPS && (a.y - b.y).abs() < MM_EPS);
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Distance from the origin to the hull boundary along the ray at `angle`.
///
/// Every hull edge is tested, including the closing edge from the last
/// vertex back to the first, so an edge spanning the 2π→0 seam needs no
/// special casing. Returns `None` when the ray misses the hull entirely
/// (origin outside the hull).
fn ray_hull_radius(hull: &[Point2], angle: f64) -> Option<f64> {
    let dir = Vec2::new(angle.cos(), angle.sin());
    let mut best: Option<f64> = None;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        if let Some(t) = ray_segment_intersection(dir, a, b) {
            best = Some(best.map_or(t, |prev: f64| prev.max(t)));
        }
    }
    best
}

/// Intersect the ray `t * dir` (t > 0) with the segment `a`→`b`.
///
/// Returns the ray parameter `t` (the radius) on hit.
fn ray_segment_intersection(dir: Vec2, a: Point2, b: Point2) -> Option<f64> {
    let edge = b - a;
    let denom = dir.x * edge.y - dir.y * edge.x;
    if denom.abs() < MM_EPS {
        return None;
    }

    let t = (a.x * edge.y - a.y * edge.x) / denom;
    let u = (a.x * dir.y - a.y * dir.x) / denom;
    if t > 0.0 && (-MM_EPS..=1.0 + MM_EPS).contains(&u) {
        Some(t)
    } else {
        None
    }
}

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}
