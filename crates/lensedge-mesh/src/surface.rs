//! Lens surface construction from a polar contour.

use lensedge_contour::PolarContour;

use crate::SurfaceMesh;

/// Blank geometry: two spherical surfaces and a centre thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensBlank {
    /// Front surface radius of curvature (mm), convex toward the machine.
    pub front_curve_mm: f64,
    /// Back surface radius of curvature (mm).
    pub back_curve_mm: f64,
    /// Centre thickness (mm).
    pub center_thickness_mm: f64,
}

impl LensBlank {
    /// Axial position of the front surface at radial distance `r`.
    ///
    /// Sphere apex sits at z = 0; z grows toward the back surface.
    pub fn front_z(&self, r: f64) -> f64 {
        let safe_r = r.min(self.front_curve_mm);
        self.front_curve_mm - (self.front_curve_mm.powi(2) - safe_r * safe_r).sqrt()
    }

    /// Axial position of the back surface at radial distance `r`.
    pub fn back_z(&self, r: f64) -> f64 {
        let safe_r = r.min(self.back_curve_mm);
        self.back_curve_mm + self.center_thickness_mm
            - (self.back_curve_mm.powi(2) - safe_r * safe_r).sqrt()
    }
}

/// Number of concentric rings approximating each surface's curvature.
const RADIAL_SEGMENTS: usize = 10;

/// Build the closed triangulated surface of a lens bounded by `contour`.
///
/// Front and back are built as triangle fans around a centre vertex plus
/// quad rings out to the contour edge; a side wall stitches the two outer
/// rings. The result is a closed 2-manifold by construction, so
/// [`SurfaceMesh::enclosed_volume`] accepts it.
pub fn lens_surface(contour: &PolarContour, blank: &LensBlank) -> SurfaceMesh {
    let n = contour.len();
    let radii = contour.radii();
    let angles: Vec<(f64, f64)> = (0..n).map(|i| contour.angle(i).sin_cos()).collect();

    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut triangles: Vec<[u32; 3]> = Vec::new();

    // One cap per surface: centre vertex, then RADIAL_SEGMENTS rings.
    let mut build_cap = |z_of: &dyn Fn(f64) -> f64, flip: bool| -> Vec<u32> {
        let center = positions.len() as u32;
        positions.push([0.0, 0.0, z_of(0.0)]);

        let mut ring_starts: Vec<u32> = Vec::with_capacity(RADIAL_SEGMENTS);
        for j in 1..=RADIAL_SEGMENTS {
            let factor = j as f64 / RADIAL_SEGMENTS as f64;
            ring_starts.push(positions.len() as u32);
            for i in 0..n {
                let r = radii[i] * factor;
                let (sin_a, cos_a) = angles[i];
                positions.push([r * cos_a, r * sin_a, z_of(r)]);
            }
        }

        // Fan from the centre to the innermost ring.
        let inner = ring_starts[0];
        for i in 0..n as u32 {
            let next = (i + 1) % n as u32;
            let tri = [center, inner + i, inner + next];
            triangles.push(orient(tri, flip));
        }

        // Quad strips between consecutive rings.
        for w in ring_starts.windows(2) {
            let (curr, next_ring) = (w[0], w[1]);
            for i in 0..n as u32 {
                let next = (i + 1) % n as u32;
                triangles.push(orient([curr + i, next_ring + i, next_ring + next], flip));
                triangles.push(orient([curr + i, next_ring + next, curr + next], flip));
            }
        }

        ring_starts
    };

    let front_rings = build_cap(&|r| blank.front_z(r), true);
    let back_rings = build_cap(&|r| blank.back_z(r), false);

    // Side wall between the two outer rings, wound outward to match the caps.
    let front_edge = front_rings[RADIAL_SEGMENTS - 1];
    let back_edge = back_rings[RADIAL_SEGMENTS - 1];
    for i in 0..n as u32 {
        let next = (i + 1) % n as u32;
        triangles.push([front_edge + i, back_edge + next, back_edge + i]);
        triangles.push([front_edge + i, front_edge + next, back_edge + next]);
    }

    SurfaceMesh {
        positions,
        triangles,
    }
}

fn orient(tri: [u32; 3], flip: bool) -> [u32; 3] {
    if flip {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}
