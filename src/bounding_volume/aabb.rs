//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM};

/// An Axis-Aligned Bounding Box.
///
/// Used to describe the extent of a source surface or of a volumetric domain before a
/// lattice is laid over it.
///
/// # Example
///
/// ```
/// use brickify3d::bounding_volume::Aabb;
/// use brickify3d::na::{Point3, Vector3};
///
/// let aabb = Aabb::new(Point3::new(-1.0, -2.0, 0.0), Point3::new(1.0, 2.0, 0.0));
/// assert_eq!(aabb.center(), Point3::origin());
/// assert_eq!(aabb.extents(), Vector3::new(2.0, 4.0, 0.0));
/// assert!(aabb.is_flat_along(2));
/// ```
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Aabb {
    /// The point with the smallest coordinates on every axis.
    pub mins: Point<Real>,
    /// The point with the largest coordinates on every axis.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new Aabb from its two extremal points.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid Aabb with inverted bounds.
    ///
    /// Any call to [`Aabb::take_point`] turns it into a valid box.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new Aabb from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates the smallest Aabb enclosing all the given points.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn from_points<I>(pts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut it = pts.into_iter();
        let first = it.next()?;
        let mut result = Aabb::new(first, first);

        for pt in it {
            result.take_point(pt);
        }

        Some(result)
    }

    /// Is this box non-inverted on every axis?
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..DIM).all(|i| self.mins[i] <= self.maxs[i])
    }

    /// The center of this Aabb.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half-extents of this Aabb.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this Aabb.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Does this box have a zero extent along `axis`?
    #[inline]
    pub fn is_flat_along(&self, axis: usize) -> bool {
        self.maxs[axis] - self.mins[axis] <= 0.0
    }

    /// Enlarges this Aabb so it also contains the point `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Enlarges this Aabb so it also contains `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.coords.inf(&other.mins.coords).into();
        self.maxs = self.maxs.coords.sup(&other.maxs.coords).into();
    }

    /// Does this Aabb contain the given point (boundary included)?
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        (0..DIM).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }
}
