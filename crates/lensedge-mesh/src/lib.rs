#![warn(missing_docs)]

//! Closed lens surfaces and exact volume bookkeeping.
//!
//! The roughing generator only needs one thing from lens geometry: the exact
//! volume enclosed by a contour once it is extruded between the blank's front
//! and back spherical surfaces. This crate builds that closed triangulated
//! surface and integrates its volume with the divergence theorem. A surface
//! that fails the closed-manifold check is the one loud error in the
//! pipeline: silently returning 0 would corrupt every downstream
//! removal-rate figure.
//!
//! # Example
//!
//! ```
//! use lensedge_contour::PolarContour;
//! use lensedge_mesh::{lens_surface, LensBlank};
//!
//! let blank = LensBlank { front_curve_mm: 200.0, back_curve_mm: 200.0, center_thickness_mm: 5.0 };
//! let contour = PolarContour::circular(360, 30.0);
//! let volume = lens_surface(&contour, &blank).enclosed_volume().unwrap();
//! assert!(volume > 0.0);
//! ```

mod bevel;
mod surface;

pub use bevel::{bevel_track, BevelTrack};
pub use surface::{lens_surface, LensBlank};

use std::collections::HashMap;
use thiserror::Error;

/// Errors from surface construction and volume integration.
#[derive(Debug, Clone, Error)]
pub enum MeshError {
    /// The surface is not a closed 2-manifold.
    #[error("surface is not closed: {open_edges} edge(s) not shared by exactly two triangles")]
    NotClosed {
        /// Number of offending edges.
        open_edges: usize,
    },

    /// A parameter is outside its allowed range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

/// A triangulated surface.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    /// Vertex positions in mm.
    pub positions: Vec<[f64; 3]>,
    /// Triangles as vertex-index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    /// Volume enclosed by the surface, in mm³.
    ///
    /// Integrates the signed tetrahedron volumes against the origin; the
    /// result is independent of the origin only when the surface is closed,
    /// so non-closed input is rejected (and logged) rather than estimated.
    pub fn enclosed_volume(&self) -> Result<f64> {
        let open_edges = self.open_edge_count();
        if open_edges > 0 {
            tracing::error!(
                open_edges,
                triangles = self.triangles.len(),
                "volume requested for a non-closed surface"
            );
            return Err(MeshError::NotClosed { open_edges });
        }

        let mut six_volume = 0.0;
        for tri in &self.triangles {
            let a = self.positions[tri[0] as usize];
            let b = self.positions[tri[1] as usize];
            let c = self.positions[tri[2] as usize];
            six_volume += a[0] * (b[1] * c[2] - b[2] * c[1])
                - a[1] * (b[0] * c[2] - b[2] * c[0])
                + a[2] * (b[0] * c[1] - b[1] * c[0]);
        }
        Ok((six_volume / 6.0).abs())
    }

    /// Number of undirected edges not shared by exactly two triangles.
    fn open_edge_count(&self) -> usize {
        let mut edge_uses: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in &self.triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_uses.entry(key).or_insert(0) += 1;
            }
        }
        edge_uses.values().filter(|&&uses| uses != 2).count()
    }
}
