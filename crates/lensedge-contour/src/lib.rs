#![warn(missing_docs)]

//! Polar lens contours for the lensedge edging planner.
//!
//! A [`PolarContour`] is the unit of exchange between every stage of the
//! pipeline: N evenly spaced angular samples, each carrying an edge radius
//! and a signed axial height. Contours are immutable once built; every
//! transformation returns a new contour.
//!
//! # Example
//!
//! ```
//! use lensedge_contour::PolarContour;
//!
//! let blank = PolarContour::circular(360, 50.0);
//! assert_eq!(blank.len(), 360);
//! assert!((blank.max_radius() - 50.0).abs() < 1e-12);
//! ```

mod error;
pub mod hull;
pub mod resample;

pub use error::{ContourError, Result};
pub use hull::wrap_machinable;
pub use resample::{offset_normal, recentre};

use lensedge_math::{polar_point, sample_angle, Point2};
use serde::{Deserialize, Serialize};

/// A polar lens-edge profile: radius and axial height per uniform angle.
///
/// Sample `i` sits at angle `i * 2π / N`. The serialized form is the
/// contour-with-height-map interchange shape `{radii, heights}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarContour {
    radii: Vec<f64>,
    heights: Vec<f64>,
}

impl PolarContour {
    /// Build a contour from parallel radius and height arrays.
    pub fn new(radii: Vec<f64>, heights: Vec<f64>) -> Result<Self> {
        if radii.is_empty() {
            return Err(ContourError::Empty);
        }
        if radii.len() != heights.len() {
            return Err(ContourError::MismatchedLengths {
                radii: radii.len(),
                heights: heights.len(),
            });
        }
        for (index, &value) in radii.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ContourError::InvalidRadius { index, value });
            }
        }
        Ok(Self { radii, heights })
    }

    /// Build a flat contour from radii alone (all heights zero).
    pub fn from_radii(radii: Vec<f64>) -> Result<Self> {
        let heights = vec![0.0; radii.len()];
        Self::new(radii, heights)
    }

    /// A circular blank of constant radius with zero heights.
    pub fn circular(n: usize, radius: f64) -> Self {
        Self {
            radii: vec![radius; n],
            heights: vec![0.0; n],
        }
    }

    /// Number of angular samples.
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// True if the contour has no samples.
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Radius samples in millimetres.
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Axial height samples in millimetres.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Angle of sample `i` in radians.
    pub fn angle(&self, i: usize) -> f64 {
        sample_angle(i, self.radii.len())
    }

    /// Largest radius sample.
    pub fn max_radius(&self) -> f64 {
        self.radii.iter().cloned().fold(0.0, f64::max)
    }

    /// The contour's sample points in the lens plane.
    pub fn cartesian_points(&self) -> Vec<Point2> {
        self.radii
            .iter()
            .enumerate()
            .map(|(i, &r)| polar_point(r, self.angle(i)))
            .collect()
    }

    /// Largest absolute radius difference to another contour of the same
    /// resolution.
    pub fn max_radial_deviation(&self, other: &PolarContour) -> f64 {
        self.radii
            .iter()
            .zip(other.radii.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}
