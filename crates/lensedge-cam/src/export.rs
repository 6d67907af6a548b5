//! Movement path export.
//!
//! The persisted shapes exchanged with renderers and external tooling:
//! a CSV table (`frame_index,time_sec,x_mm,z_mm,theta_deg`) and a JSON
//! document carrying the raw arrays plus pass-segment metadata. Both take
//! the time axis as a separate argument so a rescaled axis (after the
//! removal-rate simulation) can be exported against the same geometry.

use serde::{Deserialize, Serialize};

use crate::path::{MovementPath, OperationKind, PassSegment};
use crate::{CamError, Result};

/// JSON export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathExport {
    /// Export header.
    pub metadata: PathExportMetadata,
    /// Raw path arrays.
    pub path: PathArrays,
    /// Pass-segment metadata.
    pub pass_segments: Vec<PassSegment>,
}

/// Export header fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathExportMetadata {
    /// Number of frames exported.
    pub total_frames: usize,
    /// Final time stamp (seconds).
    pub total_duration_sec: f64,
}

/// The raw per-frame arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathArrays {
    /// Machine X (mm).
    pub x: Vec<f64>,
    /// Machine Z (mm).
    pub z: Vec<f64>,
    /// Spindle angle (degrees).
    pub theta: Vec<f64>,
    /// Time axis (seconds).
    pub time: Vec<f64>,
}

/// Format the path against `time` as CSV.
pub fn to_csv(path: &MovementPath, time: &[f64]) -> Result<String> {
    check_time_axis(path, time)?;

    let mut out = String::with_capacity(64 * (path.total_frames() + 1));
    out.push_str("frame_index,time_sec,x_mm,z_mm,theta_deg\n");
    for i in 0..path.total_frames() {
        out.push_str(&format!(
            "{},{:.6},{:.6},{:.6},{:.6}\n",
            i,
            time[i],
            path.x()[i],
            path.z()[i],
            path.theta()[i]
        ));
    }
    Ok(out)
}

/// Format the path against `time` as a pretty-printed JSON document.
pub fn to_json(path: &MovementPath, time: &[f64]) -> Result<String> {
    check_time_axis(path, time)?;

    let export = PathExport {
        metadata: PathExportMetadata {
            total_frames: path.total_frames(),
            total_duration_sec: time.last().copied().unwrap_or(0.0),
        },
        path: PathArrays {
            x: path.x().to_vec(),
            z: path.z().to_vec(),
            theta: path.theta().to_vec(),
            time: time.to_vec(),
        },
        pass_segments: path.segments().to_vec(),
    };
    serde_json::to_string_pretty(&export).map_err(|e| CamError::Export(e.to_string()))
}

/// Summary statistics for operator reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    /// Total duration (seconds).
    pub total_duration_sec: f64,
    /// Total duration (minutes).
    pub total_duration_min: f64,
    /// Number of frames.
    pub total_frames: usize,
    /// Number of cutting passes.
    pub num_passes: usize,
    /// Number of roughing passes.
    pub num_roughing_passes: usize,
    /// Number of beveling passes.
    pub num_beveling_passes: usize,
    /// Largest per-pass removal-rate cap (mm³/s), 0 when none is set.
    pub max_volume_rate_mm3_per_sec: f64,
}

/// Summarize a path against `time`.
pub fn path_summary(path: &MovementPath, time: &[f64]) -> Result<PathSummary> {
    check_time_axis(path, time)?;

    let segments = path.segments();
    let total_duration_sec = time.last().copied().unwrap_or(0.0);
    Ok(PathSummary {
        total_duration_sec,
        total_duration_min: total_duration_sec / 60.0,
        total_frames: path.total_frames(),
        num_passes: segments.len(),
        num_roughing_passes: segments
            .iter()
            .filter(|s| s.kind == OperationKind::Roughing)
            .count(),
        num_beveling_passes: segments
            .iter()
            .filter(|s| s.kind == OperationKind::Beveling)
            .count(),
        max_volume_rate_mm3_per_sec: segments
            .iter()
            .filter_map(|s| s.max_volume_rate_mm3_per_sec)
            .fold(0.0, f64::max),
    })
}

fn check_time_axis(path: &MovementPath, time: &[f64]) -> Result<()> {
    if time.len() != path.total_frames() {
        return Err(CamError::MismatchedTimeAxis {
            frames: path.total_frames(),
            times: time.len(),
        });
    }
    Ok(())
}
