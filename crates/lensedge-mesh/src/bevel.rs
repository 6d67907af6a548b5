//! Bevel-apex placement along the lens edge.

use lensedge_contour::PolarContour;

use crate::{LensBlank, MeshError, Result};

/// The bevel apex path along the lens edge, with per-sample fit checks.
#[derive(Debug, Clone)]
pub struct BevelTrack {
    /// Apex positions `[x, y, z]` per angular sample.
    pub points: Vec<[f64; 3]>,
    /// Apex axial height per sample (the height map for the bevel pass).
    pub heights: Vec<f64>,
    /// Per-sample flag: false where the bevel pokes through a surface or the
    /// edge is thinner than the bevel itself.
    pub valid: Vec<bool>,
}

impl BevelTrack {
    /// True when the bevel fits the edge at every sample.
    pub fn fits(&self) -> bool {
        self.valid.iter().all(|&v| v)
    }
}

/// Place the bevel apex between the front and back surfaces.
///
/// `position` maps 0.0 to the front surface and 1.0 to the back surface;
/// `bevel_width_mm` is the margin the apex must keep from either surface.
/// The apex follows the contour's height map, shifted so the whole track
/// stays between the surfaces, then each sample is clamped into its locally
/// valid range and flagged when clamping was needed.
pub fn bevel_track(
    contour: &PolarContour,
    blank: &LensBlank,
    position: f64,
    bevel_width_mm: f64,
) -> Result<BevelTrack> {
    if !(0.0..=1.0).contains(&position) {
        return Err(MeshError::InvalidParameter(format!(
            "bevel position {position} outside 0..=1"
        )));
    }

    let n = contour.len();
    let radii = contour.radii();
    let z_map = contour.heights();
    let margin = bevel_width_mm / 2.0;

    // Track-wide offsets keeping the apex curve inside both surfaces.
    let mut min_offset = f64::NEG_INFINITY;
    let mut max_offset = f64::INFINITY;
    for i in 0..n {
        min_offset = min_offset.max(blank.front_z(radii[i]) - z_map[i]);
        max_offset = max_offset.min(blank.back_z(radii[i]) - z_map[i]);
    }

    let mut points = Vec::with_capacity(n);
    let mut heights = Vec::with_capacity(n);
    let mut valid = Vec::with_capacity(n);

    for i in 0..n {
        let r = radii[i];
        let z_front = blank.front_z(r);
        let z_back = blank.back_z(r);
        let z_valid_min = z_front + margin;
        let z_valid_max = z_back - margin;

        let mut z = z_map[i] + min_offset + position * (max_offset - min_offset);
        // Edge thinner than the bevel leaves no valid range at all.
        let mut ok = z_valid_max >= z_valid_min;
        if z < z_valid_min {
            z = z_valid_min;
            ok = false;
        } else if z > z_valid_max {
            z = z_valid_max;
            ok = false;
        }

        let angle = contour.angle(i);
        points.push([r * angle.cos(), r * angle.sin(), z]);
        heights.push(z);
        valid.push(ok);
    }

    Ok(BevelTrack {
        points,
        heights,
        valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> LensBlank {
        LensBlank {
            front_curve_mm: 120.0,
            back_curve_mm: 120.0,
            center_thickness_mm: 6.0,
        }
    }

    #[test]
    fn test_track_fits_thick_edge() {
        let contour = PolarContour::circular(90, 30.0);
        let track = bevel_track(&contour, &blank(), 0.5, 1.0).unwrap();
        assert_eq!(track.points.len(), 90);
        assert!(track.fits());
    }

    #[test]
    fn test_track_flags_thin_edge() {
        // Bevel wider than the 6 mm edge cannot fit anywhere.
        let contour = PolarContour::circular(90, 30.0);
        let track = bevel_track(&contour, &blank(), 0.5, 20.0).unwrap();
        assert!(!track.fits());
    }

    #[test]
    fn test_position_out_of_range() {
        let contour = PolarContour::circular(8, 30.0);
        assert!(bevel_track(&contour, &blank(), 1.5, 1.0).is_err());
    }

    #[test]
    fn test_apex_between_surfaces() {
        let b = blank();
        let contour = PolarContour::circular(90, 30.0);
        let track = bevel_track(&contour, &b, 0.5, 1.0).unwrap();
        for (i, &h) in track.heights.iter().enumerate() {
            let r = contour.radii()[i];
            assert!(h >= b.front_z(r) && h <= b.back_z(r));
        }
    }
}
