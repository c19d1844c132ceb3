use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::query::Ray;

/// One crossing of a ray with the source surface.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Distance from the ray origin to the crossing, in units of the ray direction.
    pub distance: Real,
    /// The crossing point.
    pub point: Point<Real>,
    /// The oriented unit normal of the crossed face.
    pub normal: Vector<Real>,
    /// Identifier of the crossed face.
    pub face_id: u32,
}

/// Ray queries against a frozen, evaluated copy of the source surface.
///
/// Implementors must be safe to query from several classifier workers at once.
pub trait SurfaceQuery: Sync {
    /// Every crossing of `ray` with the surface, ordered by increasing distance.
    ///
    /// Crossings closer to each other than the implementation's tolerance (e.g. a ray passing
    /// exactly through an edge shared by two faces) must be reported once.
    fn cast_ray(&self, ray: &Ray) -> Vec<SurfaceHit>;

    /// The bounding box of the surface.
    fn aabb(&self) -> Aabb;
}

impl<T: SurfaceQuery + ?Sized> SurfaceQuery for &T {
    fn cast_ray(&self, ray: &Ray) -> Vec<SurfaceHit> {
        (**self).cast_ray(ray)
    }

    fn aabb(&self) -> Aabb {
        (**self).aabb()
    }
}
