//! Roughing sequence generation.
//!
//! Bridges the circular blank down to the target contour through a sequence
//! of intermediate contours, each guaranteed machinable by a convex wheel
//! sweep, with exact removed-volume bookkeeping per pass.

use lensedge_contour::{wrap_machinable, PolarContour};
use lensedge_mesh::{lens_surface, LensBlank};
use serde::{Deserialize, Serialize};

use crate::{CamError, Result};

/// Tolerance below which the last generated contour counts as on-target.
pub const TARGET_TOLERANCE_MM: f64 = 0.001;

/// How successive roughing contours approach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoughingMethod {
    /// Shrink a virtual circle and clamp it onto the target.
    Concentric,
    /// Move every sample linearly toward the target by a fraction set from
    /// the gap at the 12 o'clock reference sample.
    Interpolation,
}

/// Operator-facing parameters for one roughing pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoughingPassParam {
    /// Radial step from the previous contour (mm).
    pub step_mm: f64,
    /// Spindle speed for the pass (seconds per revolution).
    pub speed_sec_per_rev: f64,
    /// Optional removal-rate cap for the pass (mm³/s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_rate_mm3_per_sec: Option<f64>,
}

/// One planned roughing pass: its contour and its physics bookkeeping.
#[derive(Debug, Clone)]
pub struct RoughingPass {
    /// 1-based pass number.
    pub pass_index: usize,
    /// The contour this pass leaves behind.
    pub contour: PolarContour,
    /// Material removed by this pass (mm³), never negative.
    pub removed_volume_mm3: f64,
    /// Planned duration (the pass's seconds-per-revolution setting).
    pub duration_sec: f64,
    /// Removal-rate cap inherited from the pass parameters.
    pub max_volume_rate_mm3_per_sec: Option<f64>,
}

/// Generate the ordered roughing sequence from a circular blank to `target`.
///
/// Every configured pass produces one hull-wrapped contour; if the sequence
/// does not land within [`TARGET_TOLERANCE_MM`] of the target, one extra
/// finishing pass with the exact target contour (no wrap) is appended, so
/// the result always terminates at the target.
///
/// Intermediate contours carry zero heights (the roughing wheel cuts at the
/// blank datum); the appended finishing pass reuses the target's height map.
pub fn generate_roughing_passes(
    target: &PolarContour,
    blank_radius_mm: f64,
    blank: &LensBlank,
    method: RoughingMethod,
    params: &[RoughingPassParam],
) -> Result<Vec<RoughingPass>> {
    if target.is_empty() {
        return Ok(Vec::new());
    }
    for (i, p) in params.iter().enumerate() {
        if p.step_mm <= 0.0 {
            return Err(CamError::InvalidPass(format!(
                "pass {}: step must be > 0, got {}",
                i + 1,
                p.step_mm
            )));
        }
        if p.speed_sec_per_rev <= 0.0 {
            return Err(CamError::InvalidPass(format!(
                "pass {}: speed must be > 0, got {}",
                i + 1,
                p.speed_sec_per_rev
            )));
        }
    }

    let n = target.len();
    let reference_idx = n / 4; // 12 o'clock when sample 0 is 3 o'clock

    let mut current = PolarContour::circular(n, blank_radius_mm);
    let mut current_volume = lens_surface(&current, blank).enclosed_volume()?;
    let mut virtual_circle = blank_radius_mm;

    let mut passes = Vec::with_capacity(params.len() + 1);

    for (i, param) in params.iter().enumerate() {
        let proposed: Vec<f64> = match method {
            RoughingMethod::Concentric => {
                virtual_circle -= param.step_mm;
                target
                    .radii()
                    .iter()
                    .map(|&r| r.max(virtual_circle))
                    .collect()
            }
            RoughingMethod::Interpolation => {
                let gap = current.radii()[reference_idx] - target.radii()[reference_idx];
                let t = if gap <= 0.0 {
                    1.0
                } else {
                    (param.step_mm / gap).min(1.0)
                };
                current
                    .radii()
                    .iter()
                    .zip(target.radii())
                    .map(|(&cur, &tgt)| tgt.max(cur - t * (cur - tgt)))
                    .collect()
            }
        };

        let contour = wrap_machinable(&PolarContour::from_radii(proposed)?);
        let volume = lens_surface(&contour, blank).enclosed_volume()?;
        // Floating-point noise on a no-op pass must not report negative removal.
        let removed = (current_volume - volume).max(0.0);

        passes.push(RoughingPass {
            pass_index: i + 1,
            contour: contour.clone(),
            removed_volume_mm3: removed,
            duration_sec: param.speed_sec_per_rev,
            max_volume_rate_mm3_per_sec: param.max_volume_rate_mm3_per_sec,
        });

        current = contour;
        current_volume = volume;
    }

    if current.max_radial_deviation(target) > TARGET_TOLERANCE_MM {
        tracing::debug!(
            configured_passes = params.len(),
            deviation_mm = current.max_radial_deviation(target),
            "appending finishing pass to land on target"
        );
        let volume = lens_surface(target, blank).enclosed_volume()?;
        let removed = (current_volume - volume).max(0.0);
        let last = params.last();
        passes.push(RoughingPass {
            pass_index: passes.len() + 1,
            contour: target.clone(),
            removed_volume_mm3: removed,
            duration_sec: last.map_or(10.0, |p| p.speed_sec_per_rev),
            max_volume_rate_mm3_per_sec: last.and_then(|p| p.max_volume_rate_mm3_per_sec),
        });
    }

    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn blank() -> LensBlank {
        LensBlank {
            front_curve_mm: 200.0,
            back_curve_mm: 200.0,
            center_thickness_mm: 5.0,
        }
    }

    fn pass(step: f64, speed: f64) -> RoughingPassParam {
        RoughingPassParam {
            step_mm: step,
            speed_sec_per_rev: speed,
            max_volume_rate_mm3_per_sec: None,
        }
    }

    #[test]
    fn test_concentric_reference_scenario() {
        // 50 mm blank, constant 45 mm target, one 3 mm concentric pass:
        // one intermediate contour at 47 mm, then the mandatory finishing
        // pass at exactly 45 mm.
        let target = PolarContour::circular(180, 45.0);
        let passes =
            generate_roughing_passes(&target, 50.0, &blank(), RoughingMethod::Concentric, &[
                pass(3.0, 15.0),
            ])
            .unwrap();

        assert_eq!(passes.len(), 2);
        assert_relative_eq!(passes[0].contour.max_radius(), 47.0, epsilon = 1e-6);
        assert_relative_eq!(passes[0].duration_sec, 15.0);
        assert!(passes[1].contour.max_radial_deviation(&target) < TARGET_TOLERANCE_MM);
    }

    #[test]
    fn test_max_radius_non_increasing_and_ends_on_target() {
        let radii: Vec<f64> = (0..120)
            .map(|i| 40.0 + 4.0 * ((i as f64) * 3.0_f64.to_radians()).cos())
            .collect();
        let target = PolarContour::from_radii(radii).unwrap();
        let params = [pass(2.0, 15.0), pass(2.0, 12.0), pass(2.0, 10.0)];

        for method in [RoughingMethod::Concentric, RoughingMethod::Interpolation] {
            let passes =
                generate_roughing_passes(&target, 50.0, &blank(), method, &params).unwrap();
            assert!(!passes.is_empty());

            let mut prev_max = 50.0 + 1e-9;
            for p in &passes {
                assert!(p.contour.max_radius() <= prev_max + 1e-9);
                prev_max = p.contour.max_radius();
            }
            let last = passes.last().unwrap();
            assert!(last.contour.max_radial_deviation(&target) < TARGET_TOLERANCE_MM);
        }
    }

    #[test]
    fn test_volume_conservation() {
        let target = PolarContour::circular(180, 42.0);
        let b = blank();
        let passes =
            generate_roughing_passes(&target, 50.0, &b, RoughingMethod::Concentric, &[
                pass(3.0, 15.0),
                pass(3.0, 12.0),
            ])
            .unwrap();

        let blank_volume = lens_surface(&PolarContour::circular(180, 50.0), &b)
            .enclosed_volume()
            .unwrap();
        let final_volume = lens_surface(&target, &b).enclosed_volume().unwrap();
        let removed_total: f64 = passes.iter().map(|p| p.removed_volume_mm3).sum();

        assert!(passes.iter().all(|p| p.removed_volume_mm3 >= 0.0));
        assert_relative_eq!(
            removed_total,
            blank_volume - final_volume,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_interpolation_reaches_target_without_overshoot() {
        let target = PolarContour::circular(90, 40.0);
        let passes =
            generate_roughing_passes(&target, 50.0, &blank(), RoughingMethod::Interpolation, &[
                pass(5.0, 15.0),
                pass(5.0, 15.0),
            ])
            .unwrap();
        // Gap at 12 o'clock is 10 mm; two 5 mm steps land on target exactly,
        // so no finishing pass is appended.
        assert_eq!(passes.len(), 2);
        for p in &passes {
            for (&r, &t) in p.contour.radii().iter().zip(target.radii()) {
                assert!(r >= t - 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_params_still_terminates_on_target() {
        let target = PolarContour::circular(36, 45.0);
        let passes =
            generate_roughing_passes(&target, 50.0, &blank(), RoughingMethod::Concentric, &[])
                .unwrap();
        assert_eq!(passes.len(), 1);
        assert!(passes[0].contour.max_radial_deviation(&target) < TARGET_TOLERANCE_MM);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let target = PolarContour::circular(36, 45.0);
        let err = generate_roughing_passes(&target, 50.0, &blank(), RoughingMethod::Concentric, &[
            pass(0.0, 15.0),
        ])
        .unwrap_err();
        assert!(matches!(err, CamError::InvalidPass(_)));
    }

    #[test]
    fn test_finishing_pass_keeps_target_heights() {
        let heights: Vec<f64> = (0..36).map(|i| 0.1 * (i as f64)).collect();
        let target = PolarContour::new(vec![45.0; 36], heights.clone()).unwrap();
        let passes =
            generate_roughing_passes(&target, 50.0, &blank(), RoughingMethod::Concentric, &[
                pass(3.0, 15.0),
            ])
            .unwrap();
        let last = passes.last().unwrap();
        assert_eq!(last.contour.heights(), heights.as_slice());
        // Intermediate contours stay at the blank datum.
        assert!(passes[0].contour.heights().iter().all(|&h| h == 0.0));
    }
}
