//! Blank-volume initialization.
//!
//! The uncut blank is the signed-distance intersection of three primitives:
//! the front sphere, the (inverted) back sphere, and the rim cylinder.
//! Thresholding the combined distance onto the death-frame scale marks
//! material as "never cut" (ceiling) and surrounding air as frame 0.

use lensedge_mesh::LensBlank;

use crate::{Result, SimSettings, VoxelGrid};

/// Build the voxel grid for an uncut blank of `diameter_mm`.
///
/// The grid spans the blank diameter plus a 1 mm skirt in X/Y and the back
/// sag plus centre thickness plus 1 mm in Z, with the lens axis through the
/// grid centre. `smoothing_band_mm` widens the material/air transition;
/// zero gives a hard threshold.
pub fn generate_blank(
    blank: &LensBlank,
    diameter_mm: f64,
    resolution_mm: f64,
    smoothing_band_mm: f64,
    settings: &SimSettings,
) -> Result<VoxelGrid> {
    let radius = diameter_mm / 2.0;
    let back_r = blank.back_curve_mm;

    let xy_span = diameter_mm + 1.0;
    let back_sag = back_r - (back_r * back_r - radius * radius).max(0.0).sqrt();
    let z_span = back_sag + blank.center_thickness_mm + 1.0;

    let xy_dim = (xy_span / resolution_mm).ceil() as usize;
    let z_dim = (z_span / resolution_mm).ceil() as usize;

    let origin = [
        -(xy_dim as f64 * resolution_mm) / 2.0,
        -(xy_dim as f64 * resolution_mm) / 2.0,
        0.0,
    ];
    let mut grid = VoxelGrid::new([xy_dim, xy_dim, z_dim], resolution_mm, origin, 0.0)?;

    let ceiling = settings.ceiling;
    let front_center_z = blank.front_curve_mm;
    let back_center_z = blank.center_thickness_mm + back_r;

    for i in 0..grid.len() {
        let [x, y, z] = grid.position(i);
        let r_sq = x * x + y * y;

        let dist_cyl = r_sq.sqrt() - radius;
        let dist_front = (r_sq + (z - front_center_z).powi(2)).sqrt() - blank.front_curve_mm;
        let dist_back = back_r - (r_sq + (z - back_center_z).powi(2)).sqrt();

        // Intersection of the three half-spaces: the largest distance wins.
        let d = dist_cyl.max(dist_front).max(dist_back);

        let value = if smoothing_band_mm > 0.0 {
            if d < -smoothing_band_mm {
                ceiling
            } else if d > smoothing_band_mm {
                0.0
            } else {
                ceiling * (1.0 - ((d + smoothing_band_mm) / (2.0 * smoothing_band_mm)) as f32)
            }
        } else if d < 0.0 {
            ceiling
        } else {
            0.0
        };
        grid.values_mut()[i] = value;
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> LensBlank {
        LensBlank {
            front_curve_mm: 86.0,
            back_curve_mm: 86.0,
            center_thickness_mm: 6.0,
        }
    }

    #[test]
    fn test_blank_marks_center_as_material() {
        let settings = SimSettings::default();
        let grid = generate_blank(&blank(), 60.0, 1.0, 0.0, &settings).unwrap();
        let [nx, ny, _] = grid.dims();
        // Mid-thickness on the axis is solidly inside the blank.
        let mid_z = ((blank().center_thickness_mm / 2.0) / grid.spacing_mm()) as usize;
        assert_eq!(grid.value(nx / 2, ny / 2, mid_z), settings.ceiling);
    }

    #[test]
    fn test_blank_marks_rim_as_air() {
        let settings = SimSettings::default();
        let grid = generate_blank(&blank(), 60.0, 1.0, 0.0, &settings).unwrap();
        let [_, ny, nz] = grid.dims();
        // The grid corner lies outside the rim cylinder.
        assert_eq!(grid.value(0, ny - 1, nz - 1), 0.0);
    }

    #[test]
    fn test_material_volume_close_to_analytic() {
        // Equal curves cancel the sag: the blank is a 6 mm thick disk.
        let settings = SimSettings::default();
        let grid = generate_blank(&blank(), 60.0, 0.5, 0.0, &settings).unwrap();
        let material = grid
            .values()
            .iter()
            .filter(|&&v| v == settings.ceiling)
            .count() as f64
            * grid.voxel_volume_mm3();
        let analytic = std::f64::consts::PI * 30.0 * 30.0 * 6.0;
        assert!((material - analytic).abs() / analytic < 0.05);
    }

    #[test]
    fn test_smoothing_band_adds_partial_values() {
        let settings = SimSettings::default();
        let grid = generate_blank(&blank(), 60.0, 0.5, 0.5, &settings).unwrap();
        let partial = grid
            .values()
            .iter()
            .filter(|&&v| v > 0.0 && v < settings.ceiling)
            .count();
        assert!(partial > 0);
    }
}
