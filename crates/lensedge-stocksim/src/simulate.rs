//! Death-frame computation along a movement path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lensedge_cam::{MachineConfig, MovementPath, OperationKind, BEVEL_WHEEL, ROUGHING_WHEEL};
use lensedge_math::{rotate_z, Vec3};
use rayon::prelude::*;

use crate::{Result, SimSettings, StockSimError, VoxelGrid};

/// Shared cancellation flag for a running simulation.
///
/// Set it from another thread (or a timeout) to abort between frames; the
/// simulation returns [`StockSimError::Cancelled`] and leaves the grid in
/// its partially carved state.
pub type CancelFlag = Arc<AtomicBool>;

/// Simulate material removal along `path`, lowering each voxel's value to
/// the frame at which the active wheel first reaches it.
///
/// Every `frame_stride`-th frame inside a roughing or beveling segment is
/// processed; frames outside any cutting segment are skipped. Voxel updates
/// use a `min` reduction, so the result does not depend on the order the
/// voxels are visited in.
pub fn simulate(
    grid: &mut VoxelGrid,
    path: &MovementPath,
    machine: &MachineConfig,
    settings: &SimSettings,
    cancel: Option<&CancelFlag>,
) -> Result<()> {
    let num_frames = path.total_frames();
    if num_frames == 0 || grid.is_empty() {
        return Ok(());
    }

    let tilt = machine.tilt_deg.to_radians();
    let rest_axis = Vec3::new(-tilt.sin(), 0.0, tilt.cos());
    let base = machine.base_position;
    let stride = settings.frame_stride.max(1);
    let band = settings.cut_band_mm;
    let ceiling = settings.ceiling;

    let [nx, ny, _] = grid.dims();
    let origin = grid.origin();
    let spacing = grid.spacing_mm();

    let mut frame = 0;
    while frame < num_frames {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                tracing::info!(frame, "removal simulation cancelled");
                return Err(StockSimError::Cancelled);
            }
        }

        let Some(segment) = path.segment_at(frame) else {
            frame += stride;
            continue;
        };
        let wheel_index = match segment.kind {
            OperationKind::Roughing => ROUGHING_WHEEL,
            OperationKind::Beveling => BEVEL_WHEEL,
            _ => {
                frame += stride;
                continue;
            }
        };
        let wheel = machine
            .wheels
            .get(wheel_index)
            .ok_or(StockSimError::MissingWheel(wheel_index))?;

        // Tool pose in the lens frame: the lens spins by -theta, so the
        // wheel is carried to +theta around the lens axis.
        let theta = path.theta()[frame].to_radians();
        let radial = base[0] - path.x()[frame];
        let axial = base[2] - path.z()[frame];
        let (sin_t, cos_t) = theta.sin_cos();
        let tool_pos = [radial * cos_t, radial * sin_t, axial];
        let axis = rotate_z(rest_axis, theta);

        let cutting_axial = wheel.cutting_axial_mm();
        let cutting_radius = wheel.cutting_radius_mm;
        let profile = &wheel.profile;
        let frame_value = (num_frames - frame) as f64 + 0.5;

        grid.values_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, value)| {
                let p = [
                    origin[0] + (i % nx) as f64 * spacing,
                    origin[1] + ((i / nx) % ny) as f64 * spacing,
                    origin[2] + (i / (nx * ny)) as f64 * spacing,
                ];
                let v = [p[0] - tool_pos[0], p[1] - tool_pos[1], p[2] - tool_pos[2]];
                let h = v[0] * axis.x + v[1] * axis.y + v[2] * axis.z;
                let dist_sq = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
                let d = (dist_sq - h * h).max(0.0).sqrt();

                let surface_radius =
                    cutting_radius + profile.radial_offset_at(h - cutting_axial);

                // Banded cut metric: 1 fully inside the wheel surface,
                // 0 outside, linear across the +/- band.
                let depth = if band > 0.0 {
                    let m = (d - surface_radius).clamp(-band, band);
                    (1.0 - m / band) / 2.0
                } else if d < surface_radius {
                    1.0
                } else {
                    0.0
                };
                if depth <= 0.0 {
                    return;
                }

                let mapped =
                    ceiling * (1.0 - (depth * frame_value / num_frames as f64) as f32);
                if mapped < *value {
                    *value = mapped;
                }
            });

        frame += stride;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lensedge_cam::{
        plan_movement_path, MachineConfig, PathSettings, RoughingPass,
    };
    use lensedge_contour::PolarContour;
    use lensedge_mesh::LensBlank;

    fn lens_blank() -> LensBlank {
        LensBlank {
            front_curve_mm: 86.0,
            back_curve_mm: 86.0,
            center_thickness_mm: 6.0,
        }
    }

    fn small_job() -> (VoxelGrid, MovementPath, MachineConfig) {
        let machine = MachineConfig::default_machine();
        let settings = SimSettings::default();
        let grid =
            crate::generate_blank(&lens_blank(), 40.0, 2.0, 0.0, &settings).unwrap();
        let passes = vec![RoughingPass {
            pass_index: 1,
            contour: PolarContour::circular(60, 15.0),
            removed_volume_mm3: 0.0,
            duration_sec: 15.0,
            max_volume_rate_mm3_per_sec: None,
        }];
        let path =
            plan_movement_path(&machine, PathSettings::default(), &passes, None).unwrap();
        (grid, path, machine)
    }

    #[test]
    fn test_simulation_removes_rim_material() {
        let (mut grid, path, machine) = small_job();
        let settings = SimSettings {
            frame_stride: 1,
            ..SimSettings::default()
        };
        let before = grid.count_below(settings.ceiling);
        simulate(&mut grid, &path, &machine, &settings, None).unwrap();
        let after = grid.count_below(settings.ceiling);
        // Cutting a 15 mm contour out of a 20 mm blank must kill rim voxels.
        assert!(after > before);
    }

    #[test]
    fn test_death_frames_only_decrease_and_runs_are_deterministic() {
        let (mut grid, path, machine) = small_job();
        let settings = SimSettings {
            frame_stride: 2,
            ..SimSettings::default()
        };
        let initial = grid.clone();
        simulate(&mut grid, &path, &machine, &settings, None).unwrap();
        for (&v, &v0) in grid.values().iter().zip(initial.values()) {
            assert!(v <= v0);
        }

        let mut second = initial.clone();
        simulate(&mut second, &path, &machine, &settings, None).unwrap();
        assert_eq!(grid, second);
    }

    #[test]
    fn test_resimulating_is_idempotent() {
        let (mut grid, path, machine) = small_job();
        let settings = SimSettings::default();
        simulate(&mut grid, &path, &machine, &settings, None).unwrap();
        let once = grid.clone();
        simulate(&mut grid, &path, &machine, &settings, None).unwrap();
        assert_eq!(grid, once);
    }

    #[test]
    fn test_cancel_flag_aborts() {
        let (mut grid, path, machine) = small_job();
        let cancel: CancelFlag = Arc::new(AtomicBool::new(true));
        let err = simulate(
            &mut grid,
            &path,
            &machine,
            &SimSettings::default(),
            Some(&cancel),
        )
        .unwrap_err();
        assert!(matches!(err, StockSimError::Cancelled));
    }

    #[test]
    fn test_empty_path_is_a_noop() {
        let (mut grid, _, machine) = small_job();
        let before = grid.clone();
        simulate(
            &mut grid,
            &MovementPath::empty(),
            &machine,
            &SimSettings::default(),
            None,
        )
        .unwrap();
        assert_eq!(grid, before);
    }
}
