//! Structure needed to cast rays.

use crate::math::{Point, Real, Vector};

/// A ray for ray-casting queries.
///
/// Points along the ray are `origin + dir * t` for `t >= 0`. The direction does not need to be
/// normalized, but the classifier always builds rays with unit directions so that times of
/// impact are distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// A ray with the same origin, pointing the other way.
    #[inline]
    pub fn reversed(&self) -> Ray {
        Ray::new(self.origin, -self.dir)
    }

    /// Computes the point at the given parameter on this ray.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}
