#![warn(missing_docs)]

//! Voxel material-removal simulation for lens edging.
//!
//! Consumes the stitched [`MovementPath`](lensedge_cam::MovementPath) and
//! computes, per voxel of a discretized blank, the path frame at which that
//! voxel is first cut (its "death frame"). From that single field everything
//! else derives: removed volume per frame, removal-rate histograms, and the
//! rate-capped rescaling of the path's time axis.
//!
//! # Death-frame encoding
//!
//! Voxel values live on a `0..=ceiling` scale (default 1000): `ceiling`
//! means never cut, lower values encode "cut at or before this fraction of
//! the total frame count", linearly mapped. Values only ever decrease; the
//! update is a commutative `min`, so results are identical regardless of
//! evaluation order.

mod blank;
mod grid;
mod rates;
mod simulate;

pub use blank::generate_blank;
pub use grid::VoxelGrid;
pub use rates::{
    max_rate_per_frame, removal_per_frame, rescale_time, volume_history, VolumeHistory,
    DEFAULT_MAX_RATE_MM3_PER_SEC,
};
pub use simulate::{simulate, CancelFlag};

use thiserror::Error;

/// Errors from stock simulation operations.
#[derive(Debug, Clone, Error)]
pub enum StockSimError {
    /// Grid resolution is zero or negative.
    #[error("resolution too small: {0}")]
    ResolutionTooSmall(f64),

    /// The machine stack lacks the wheel a pass segment refers to.
    #[error("machine has no wheel at index {0}")]
    MissingWheel(usize),

    /// Parallel arrays disagree in length.
    #[error("array length mismatch: expected {expected}, got {got}")]
    MismatchedArrays {
        /// Expected sample count.
        expected: usize,
        /// Actual sample count.
        got: usize,
    },

    /// The simulation was cancelled through its cancel flag.
    #[error("simulation cancelled")]
    Cancelled,
}

/// Result type for stock simulation operations.
pub type Result<T> = std::result::Result<T, StockSimError>;

/// Tunables for the removal simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSettings {
    /// Process every `frame_stride`-th path frame. Accuracy/speed knob:
    /// 1 visits every frame, larger values skip proportionally more.
    pub frame_stride: usize,
    /// Half-width of the tolerance band around the wheel surface (mm).
    /// Voxels inside the band get fractional death values, which keeps the
    /// cut surface from aliasing.
    pub cut_band_mm: f64,
    /// The "never cut" scalar; death frames are mapped linearly into
    /// `0..ceiling`.
    pub ceiling: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            frame_stride: 5,
            cut_band_mm: 0.1,
            ceiling: 1000.0,
        }
    }
}
