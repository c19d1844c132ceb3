use crate::bounding_volume::Aabb;
use crate::bricks::CellKey;
use crate::lattice::CellPitch;
use crate::math::{Point, Real, Vector, DIM};

/// A regular grid of cell centers covering a bounding box plus one margin cell per side.
///
/// Cell `key` occupies `[anchor + key * step, anchor + (key + 1) * step]` on every axis. The
/// anchor is snapped to a multiple of the step, so regenerating the lattice after a small change
/// of the source bounds keeps the keys and centers of the cells that still exist.
///
/// Dense per-cell buffers indexed by [`Lattice::linear_index`] store the `x` index fastest.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    anchor: Point<Real>,
    step: Vector<Real>,
    min_key: CellKey,
    dims: [u32; 3],
}

impl Lattice {
    /// Lays a lattice over `bounds`.
    ///
    /// The anchor is derived from `alignment` if given (typically the anchor of a previous
    /// lattice of the same model), or from the center of `bounds` otherwise. An axis along which
    /// `bounds` has no extent gets a single layer of cells centered on the bounds.
    pub fn generate(bounds: &Aabb, pitch: &CellPitch, alignment: Option<Point<Real>>) -> Self {
        let step = pitch.step();
        let reference = alignment.unwrap_or_else(|| bounds.center());
        let mut anchor = Point::origin();
        let mut min_key = [0i32; DIM];
        let mut dims = [1u32; DIM];

        for axis in 0..DIM {
            if bounds.is_flat_along(axis) {
                anchor[axis] = bounds.mins[axis] - step[axis] * 0.5;
                continue;
            }

            anchor[axis] = reference[axis] - reference[axis].rem_euclid(step[axis]);
            let lo = ((bounds.mins[axis] - anchor[axis]) / step[axis]).floor() as i32 - 1;
            let hi = ((bounds.maxs[axis] - anchor[axis]) / step[axis]).ceil() as i32;
            min_key[axis] = lo;
            dims[axis] = (hi - lo + 1) as u32;
        }

        Lattice {
            anchor,
            step,
            min_key: CellKey::from(min_key),
            dims,
        }
    }

    /// Number of cells along each axis.
    #[inline]
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().map(|d| *d as usize).product()
    }

    /// Does this lattice contain no cell? Never true for a generated lattice.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The snapped origin the keys are relative to.
    #[inline]
    pub fn anchor(&self) -> Point<Real> {
        self.anchor
    }

    /// Distance between adjacent cell centers.
    #[inline]
    pub fn step(&self) -> Vector<Real> {
        self.step
    }

    /// The key of the cell with the smallest coordinates.
    #[inline]
    pub fn min_key(&self) -> CellKey {
        self.min_key
    }

    /// The key of the cell at the given grid index.
    #[inline]
    pub fn key_at(&self, index: [u32; 3]) -> CellKey {
        self.min_key
            .offset(index[0] as i32, index[1] as i32, index[2] as i32)
    }

    /// The grid index of `key`, if it lies within this lattice.
    pub fn index_of(&self, key: CellKey) -> Option<[u32; 3]> {
        let mut index = [0; 3];

        for (axis, idx) in index.iter_mut().enumerate() {
            let rel = key.along(axis) - self.min_key.along(axis);

            if rel < 0 || rel as u32 >= self.dims[axis] {
                return None;
            }

            *idx = rel as u32;
        }

        Some(index)
    }

    /// Position of the given grid index in dense per-cell buffers.
    #[inline]
    pub fn linear_index(&self, index: [u32; 3]) -> usize {
        let [rx, ry, _] = self.dims;
        index[0] as usize + index[1] as usize * rx as usize + index[2] as usize * (rx * ry) as usize
    }

    /// Inverse of [`Lattice::linear_index`].
    #[inline]
    pub fn grid_index(&self, linear: usize) -> [u32; 3] {
        let rx = self.dims[0] as usize;
        let ry = self.dims[1] as usize;
        [
            (linear % rx) as u32,
            ((linear / rx) % ry) as u32,
            (linear / (rx * ry)) as u32,
        ]
    }

    /// The world-space center of the cell `key`.
    #[inline]
    pub fn cell_center(&self, key: CellKey) -> Point<Real> {
        Point::new(
            self.anchor.x + (key.x as Real + 0.5) * self.step.x,
            self.anchor.y + (key.y as Real + 0.5) * self.step.y,
            self.anchor.z + (key.z as Real + 0.5) * self.step.z,
        )
    }

    /// The world-space centers of every cell, in dense buffer order.
    pub fn coords(&self) -> Vec<Point<Real>> {
        (0..self.len())
            .map(|i| self.cell_center(self.key_at(self.grid_index(i))))
            .collect()
    }

    /// The region covered by all the cells.
    pub fn aabb(&self) -> Aabb {
        let mins = self.cell_center(self.min_key) - self.step * 0.5;
        let maxs = mins + self.step.component_mul(&Vector::new(
            self.dims[0] as Real,
            self.dims[1] as Real,
            self.dims[2] as Real,
        ));
        Aabb::new(mins, maxs)
    }
}
