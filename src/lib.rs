/*!
brickify
========

**brickify** turns a closed 3D surface (or a volumetric density field) into a
space-filling arrangement of axis-aligned rectangular bricks.

The pipeline is:

1. [`lattice`]: a regular grid of cell centers laid over the source bounds.
2. [`voxelization`]: ray-cast (or density-sampled) classification of every
   cell as outside, shell or interior, with interior depth falloff.
3. [`bricks`]: the sparse voxel dictionary holding one record per cell.
4. [`merge`]: greedy union of adjacent cells into legal rectangular bricks.
5. [`exposure`]: top/bottom visibility of every merged brick.
6. [`supports`]: optional internal columns or lattice beams.
7. [`pipeline`]: dirty-flag driven controller and cache wrapping all of the above.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

extern crate alloc;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod bricks;
pub mod exposure;
pub mod lattice;
pub mod merge;
pub mod pipeline;
pub mod query;
pub mod shape;
pub mod supports;
pub mod utils;
pub mod voxelization;

mod real {
    /// The scalar type used throughout this crate.
    pub use f64 as Real;
}

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use super::real::*;
    pub use na::{Point3, Vector3};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = 1.0e-6;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;
}
