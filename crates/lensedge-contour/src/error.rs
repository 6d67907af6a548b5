//! Error types for contour construction and resampling.

use thiserror::Error;

/// Errors that can occur when building or transforming contours.
#[derive(Error, Debug)]
pub enum ContourError {
    /// Contour has no samples.
    #[error("contour is empty")]
    Empty,

    /// Radius and height arrays differ in length.
    #[error("mismatched sample counts: {radii} radii vs {heights} heights")]
    MismatchedLengths {
        /// Number of radius samples.
        radii: usize,
        /// Number of height samples.
        heights: usize,
    },

    /// A radius sample is negative or non-finite.
    #[error("invalid radius {value} at sample {index}")]
    InvalidRadius {
        /// Sample index.
        index: usize,
        /// Offending value.
        value: f64,
    },
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;
