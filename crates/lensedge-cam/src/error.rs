//! Error types for planning operations.

use thiserror::Error;

/// Errors that can occur while planning an edging job.
#[derive(Error, Debug)]
pub enum CamError {
    /// A contour failed validation.
    #[error("contour error: {0}")]
    Contour(#[from] lensedge_contour::ContourError),

    /// Volume bookkeeping failed (non-closed surface).
    #[error("volume bookkeeping failed: {0}")]
    Volume(#[from] lensedge_mesh::MeshError),

    /// The machine configuration lacks a required wheel.
    #[error("machine has no wheel at index {0}")]
    MissingWheel(usize),

    /// A roughing pass parameter is out of range.
    #[error("invalid pass parameter: {0}")]
    InvalidPass(String),

    /// A caller-supplied time axis does not match the path.
    #[error("time axis has {times} samples but the path has {frames} frames")]
    MismatchedTimeAxis {
        /// Path frame count.
        frames: usize,
        /// Supplied time sample count.
        times: usize,
    },

    /// Export serialization failed.
    #[error("export failed: {0}")]
    Export(String),
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, CamError>;
