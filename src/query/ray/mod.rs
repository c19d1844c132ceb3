//! Ray casting.

pub use self::ray::Ray;
pub use self::ray_triangle::{local_ray_intersection_with_triangle, TriangleHit};

mod ray;
mod ray_triangle;
