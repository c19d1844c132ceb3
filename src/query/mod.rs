//! Queries the engine issues against its external collaborators.
//!
//! The classifier only needs three capabilities from the outside world:
//!
//! - a [`SurfaceQuery`] answering "where does this ray cross the source surface?",
//! - a [`VolumetricField`] for the smoke variant, sampled on its own fixed grid,
//! - a [`MaterialResolver`] turning a surface sample into a color or a material id.

pub use self::material::{MaterialRef, MaterialResolver, PerFaceMaterials, ResolvedMaterial};
pub use self::ray::{local_ray_intersection_with_triangle, Ray, TriangleHit};
pub use self::surface::{SurfaceHit, SurfaceQuery};
pub use self::volume::{AdaptiveDomain, DenseField, FieldSample, VolumetricField};

mod material;
pub mod ray;
mod surface;
mod volume;
