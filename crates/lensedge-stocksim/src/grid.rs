//! Dense voxel grid with death-frame scalars.

use serde::{Deserialize, Serialize};

use crate::{Result, StockSimError};

/// A dense scalar grid over a regular 3D lattice, x-fastest storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelGrid {
    dims: [usize; 3],
    spacing_mm: f64,
    origin: [f64; 3],
    values: Vec<f32>,
}

impl VoxelGrid {
    /// Allocate a grid filled with `fill`.
    pub fn new(dims: [usize; 3], spacing_mm: f64, origin: [f64; 3], fill: f32) -> Result<Self> {
        if spacing_mm <= 0.0 {
            return Err(StockSimError::ResolutionTooSmall(spacing_mm));
        }
        Ok(Self {
            dims,
            spacing_mm,
            origin,
            values: vec![fill; dims[0] * dims[1] * dims[2]],
        })
    }

    /// Grid dimensions `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Voxel edge length (mm).
    pub fn spacing_mm(&self) -> f64 {
        self.spacing_mm
    }

    /// World position of voxel `(0, 0, 0)`.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Volume of a single voxel (mm³).
    pub fn voxel_volume_mm3(&self) -> f64 {
        self.spacing_mm.powi(3)
    }

    /// Total voxel count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the grid holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat scalar storage, x-fastest.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable scalar storage, x-fastest.
    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Flat index of voxel `(ix, iy, iz)`.
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (iz * self.dims[1] + iy) * self.dims[0] + ix
    }

    /// Grid coordinates of flat index `i`.
    pub fn coords(&self, i: usize) -> [usize; 3] {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [i % nx, (i / nx) % ny, i / (nx * ny)]
    }

    /// World position of the voxel at flat index `i`.
    pub fn position(&self, i: usize) -> [f64; 3] {
        let [ix, iy, iz] = self.coords(i);
        [
            self.origin[0] + ix as f64 * self.spacing_mm,
            self.origin[1] + iy as f64 * self.spacing_mm,
            self.origin[2] + iz as f64 * self.spacing_mm,
        ]
    }

    /// Scalar at voxel `(ix, iy, iz)`.
    pub fn value(&self, ix: usize, iy: usize, iz: usize) -> f32 {
        self.values[self.index(ix, iy, iz)]
    }

    /// Number of voxels strictly below `threshold`.
    pub fn count_below(&self, threshold: f32) -> usize {
        self.values.iter().filter(|&&v| v < threshold).count()
    }
}
