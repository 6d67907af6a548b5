//! Machine configuration: the tilted spindle and its wheel stack.

use serde::{Deserialize, Serialize};

use crate::{CamError, Result};

/// Index of the roughing wheel on the stack.
pub const ROUGHING_WHEEL: usize = 0;
/// Index of the finishing/bevel wheel on the stack.
pub const BEVEL_WHEEL: usize = 1;

/// Radial offset reported outside a profile's covered height span.
///
/// Large-negative so that any voxel beyond the wheel's faces resolves to an
/// unreachable cutting radius.
pub const PROFILE_OUT_OF_SPAN: f64 = -1e9;

/// One sample of a wheel's cross-section profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Axial offset from the wheel's cutting-edge datum (mm).
    pub height_mm: f64,
    /// Radial offset from the nominal cutting radius at that height (mm).
    pub radial_offset_mm: f64,
}

/// Piecewise-linear wheel cross-section, monotone in height.
///
/// Maps an axial offset along the wheel to the radial offset from the
/// nominal cutting radius. Only the voxel simulator consumes this; the
/// kinematics solver treats every wheel as a tilted disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxialProfile {
    points: Vec<ProfilePoint>,
}

impl AxialProfile {
    /// Build a profile, sorting samples by height.
    pub fn new(mut points: Vec<ProfilePoint>) -> Self {
        points.sort_by(|a, b| {
            a.height_mm
                .partial_cmp(&b.height_mm)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { points }
    }

    /// Profile samples, ascending in height.
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Radial offset at axial offset `height_mm`.
    ///
    /// Outside the covered span this returns [`PROFILE_OUT_OF_SPAN`] so the
    /// wheel can never cut there.
    pub fn radial_offset_at(&self, height_mm: f64) -> f64 {
        let pts = &self.points;
        if pts.is_empty() {
            return PROFILE_OUT_OF_SPAN;
        }
        if height_mm < pts[0].height_mm || height_mm > pts[pts.len() - 1].height_mm {
            return PROFILE_OUT_OF_SPAN;
        }
        for w in pts.windows(2) {
            if height_mm <= w[1].height_mm {
                let span = w[1].height_mm - w[0].height_mm;
                if span.abs() < f64::EPSILON {
                    return w[1].radial_offset_mm;
                }
                let t = (height_mm - w[0].height_mm) / span;
                return w[0].radial_offset_mm + t * (w[1].radial_offset_mm - w[0].radial_offset_mm);
            }
        }
        pts[pts.len() - 1].radial_offset_mm
    }
}

/// A grinding wheel on the spindle stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelSpec {
    /// Wheel name for reports.
    pub name: String,
    /// Nominal cutting radius used for path generation (mm).
    pub cutting_radius_mm: f64,
    /// Distance from the spindle base to the wheel base along the stack (mm).
    pub stack_offset_mm: f64,
    /// Height of the cutting edge relative to the wheel base (mm).
    pub cutting_offset_mm: f64,
    /// Cross-section profile around the cutting edge.
    pub profile: AxialProfile,
}

impl WheelSpec {
    /// Axial position of the cutting edge along the spindle stack.
    pub fn cutting_axial_mm(&self) -> f64 {
        self.stack_offset_mm + self.cutting_offset_mm
    }
}

/// The whole spindle assembly: global tilt, pivot position, wheel stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Global spindle tilt (degrees).
    pub tilt_deg: f64,
    /// Spindle pivot/base position `[x, y, z]` (mm).
    pub base_position: [f64; 3],
    /// Wheels by stack order; wheel 0 roughs, wheel 1 bevels.
    pub wheels: Vec<WheelSpec>,
}

impl MachineConfig {
    /// The wheel at `index`, or a typed error when the stack is shorter.
    pub fn wheel(&self, index: usize) -> Result<&WheelSpec> {
        self.wheels.get(index).ok_or(CamError::MissingWheel(index))
    }

    /// Cutting-edge position of wheel `index` in machine coordinates,
    /// projected through the spindle tilt: `(wheel_x, wheel_z)`.
    pub fn wheel_position(&self, index: usize) -> Result<(f64, f64)> {
        let wheel = self.wheel(index)?;
        let tilt = self.tilt_deg.to_radians();
        let axial = wheel.cutting_axial_mm();
        let wheel_x = self.base_position[0] - axial * tilt.sin();
        let wheel_z = self.base_position[2] + axial * tilt.cos();
        Ok((wheel_x, wheel_z))
    }

    /// The reference bench: an 18°-tilted two-wheel edger.
    pub fn default_machine() -> Self {
        Self {
            tilt_deg: 18.0,
            base_position: [100.0, 0.0, -150.0],
            wheels: vec![
                WheelSpec {
                    name: "Roughing (Glass)".into(),
                    cutting_radius_mm: 63.3,
                    stack_offset_mm: 10.0,
                    cutting_offset_mm: 8.4,
                    profile: AxialProfile::new(vec![
                        ProfilePoint {
                            height_mm: 9.51,
                            radial_offset_mm: -3.09,
                        },
                        ProfilePoint {
                            height_mm: -9.51,
                            radial_offset_mm: 3.09,
                        },
                    ]),
                },
                WheelSpec {
                    name: "Standard V-Bevel".into(),
                    cutting_radius_mm: 45.0,
                    stack_offset_mm: 26.8,
                    cutting_offset_mm: 7.5,
                    profile: AxialProfile::new(vec![
                        ProfilePoint {
                            height_mm: 9.045,
                            radial_offset_mm: -1.797,
                        },
                        ProfilePoint {
                            height_mm: 1.427,
                            radial_offset_mm: 0.678,
                        },
                        ProfilePoint {
                            height_mm: -0.371,
                            radial_offset_mm: 0.0,
                        },
                        ProfilePoint {
                            height_mm: -1.427,
                            radial_offset_mm: 1.604,
                        },
                        ProfilePoint {
                            height_mm: -9.045,
                            radial_offset_mm: 4.097,
                        },
                    ]),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_interpolation() {
        let profile = AxialProfile::new(vec![
            ProfilePoint {
                height_mm: -2.0,
                radial_offset_mm: 1.0,
            },
            ProfilePoint {
                height_mm: 2.0,
                radial_offset_mm: -1.0,
            },
        ]);
        assert_relative_eq!(profile.radial_offset_at(0.0), 0.0);
        assert_relative_eq!(profile.radial_offset_at(-2.0), 1.0);
        assert_relative_eq!(profile.radial_offset_at(1.0), -0.5);
    }

    #[test]
    fn test_profile_out_of_span_sentinel() {
        let profile = AxialProfile::new(vec![
            ProfilePoint {
                height_mm: -1.0,
                radial_offset_mm: 0.0,
            },
            ProfilePoint {
                height_mm: 1.0,
                radial_offset_mm: 0.0,
            },
        ]);
        assert_eq!(profile.radial_offset_at(5.0), PROFILE_OUT_OF_SPAN);
        assert_eq!(profile.radial_offset_at(-5.0), PROFILE_OUT_OF_SPAN);
    }

    #[test]
    fn test_profile_sorts_input() {
        let profile = AxialProfile::new(vec![
            ProfilePoint {
                height_mm: 3.0,
                radial_offset_mm: 1.0,
            },
            ProfilePoint {
                height_mm: -3.0,
                radial_offset_mm: -1.0,
            },
        ]);
        assert!(profile.points()[0].height_mm < profile.points()[1].height_mm);
    }

    #[test]
    fn test_default_machine_wheel_positions() {
        let machine = MachineConfig::default_machine();
        assert_eq!(machine.wheels.len(), 2);

        let (rough_x, rough_z) = machine.wheel_position(ROUGHING_WHEEL).unwrap();
        let tilt = machine.tilt_deg.to_radians();
        let axial = 10.0 + 8.4;
        assert_relative_eq!(rough_x, 100.0 - axial * tilt.sin());
        assert_relative_eq!(rough_z, -150.0 + axial * tilt.cos());
    }

    #[test]
    fn test_missing_wheel() {
        let machine = MachineConfig {
            tilt_deg: 0.0,
            base_position: [0.0, 0.0, 0.0],
            wheels: vec![],
        };
        assert!(matches!(
            machine.wheel_position(BEVEL_WHEEL),
            Err(CamError::MissingWheel(1))
        ));
    }

    #[test]
    fn test_machine_serde_round_trip() {
        let machine = MachineConfig::default_machine();
        let json = serde_json::to_string(&machine).unwrap();
        let parsed: MachineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, machine);
    }
}
