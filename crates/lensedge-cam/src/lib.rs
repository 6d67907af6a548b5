#![warn(missing_docs)]

//! Planning engine for ophthalmic lens edging.
//!
//! This crate turns a target lens contour into a complete, timed machine
//! path for a tilted multi-wheel edger:
//!
//! - [`kinematics`]: inverts the machine kinematics for one contour with a
//!   robust max-projection collision search
//! - [`roughing`]: generates the intermediate contours that bridge the
//!   circular blank down to the target, with exact volume bookkeeping
//! - [`path`]: stitches home/approach/cut/retract steps into one
//!   continuous [`MovementPath`] with index-based pass segments
//! - [`export`]: the CSV/JSON shapes persisted for renderers and tooling
//!
//! # Example
//!
//! ```
//! use lensedge_cam::{
//!     generate_roughing_passes, plan_movement_path, MachineConfig, PathSettings,
//!     RoughingMethod, RoughingPassParam,
//! };
//! use lensedge_contour::PolarContour;
//! use lensedge_mesh::LensBlank;
//!
//! let machine = MachineConfig::default_machine();
//! let blank = LensBlank { front_curve_mm: 200.0, back_curve_mm: 200.0, center_thickness_mm: 5.0 };
//! let target = PolarContour::circular(360, 45.0);
//!
//! let passes = generate_roughing_passes(
//!     &target,
//!     50.0,
//!     &blank,
//!     RoughingMethod::Concentric,
//!     &[RoughingPassParam { step_mm: 3.0, speed_sec_per_rev: 15.0, max_volume_rate_mm3_per_sec: None }],
//! ).unwrap();
//!
//! let path = plan_movement_path(&machine, PathSettings::default(), &passes, None).unwrap();
//! assert!(path.total_duration_sec() > 0.0);
//! ```

mod error;
pub mod export;
pub mod kinematics;
mod machine;
mod path;
mod roughing;

pub use error::{CamError, Result};
pub use export::{path_summary, to_csv, to_json, PathExport, PathSummary};
pub use kinematics::{solve, KinematicsSolution, RETRACT_MARGIN_MM};
pub use machine::{
    AxialProfile, MachineConfig, ProfilePoint, WheelSpec, BEVEL_WHEEL, PROFILE_OUT_OF_SPAN,
    ROUGHING_WHEEL,
};
pub use path::{
    plan_movement_path, BevelPass, MachineState, MovementPath, MovementPathBuilder,
    OperationKind, OperationStep, PassSegment, PathSettings,
};
pub use roughing::{
    generate_roughing_passes, RoughingMethod, RoughingPass, RoughingPassParam,
    TARGET_TOLERANCE_MM,
};
