use crate::math::{Point, Real, Vector};
use crate::query::Ray;
use na::Vector3;

/// The result of a ray cast against a single triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// The time of impact of the ray with the triangle.
    pub toi: Real,
    /// The unit normal of the triangle, following its winding (`ab × ac`).
    ///
    /// Unlike a contact normal this is never flipped toward the ray: the classifier needs to know
    /// whether the ray leaves or enters the surface.
    pub normal: Vector<Real>,
    /// The barycentric coordinates of the intersection point.
    pub barycentric: Vector3<Real>,
}

impl TriangleHit {
    /// Does the ray cross this triangle from its back side to its front side?
    #[inline]
    pub fn is_exiting(&self, dir: &Vector<Real>) -> bool {
        self.normal.dot(dir) > 0.0
    }
}

/// Computes the intersection between a triangle and a ray.
///
/// If an intersection is found, the time of impact, the oriented face normal and the barycentric
/// coordinates of the intersection point are returned. Rays parallel to the triangle plane never
/// hit it.
pub fn local_ray_intersection_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
) -> Option<TriangleHit> {
    let ab = *b - *a;
    let ac = *c - *a;

    // normal
    let n = ab.cross(&ac);
    let d = n.dot(&ray.dir);

    // the normal and the ray direction are orthogonal
    if d == 0.0 {
        return None;
    }

    let ap = ray.origin - *a;
    let t = ap.dot(&n);

    // the ray does not intersect the halfspace defined by the triangle
    if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
        return None;
    }

    let d = d.abs();

    //
    // intersection: compute barycentric coordinates
    //
    let e = -ray.dir.cross(&ap);

    let mut v;
    let mut w;
    let toi;

    if t < 0.0 {
        v = -ac.dot(&e);

        if v < 0.0 || v > d {
            return None;
        }

        w = ab.dot(&e);

        if w < 0.0 || v + w > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = -t * invd;
        v *= invd;
        w *= invd;
    } else {
        v = ac.dot(&e);

        if v < 0.0 || v > d {
            return None;
        }

        w = -ab.dot(&e);

        if w < 0.0 || v + w > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = t * invd;
        v *= invd;
        w *= invd;
    }

    Some(TriangleHit {
        toi,
        normal: n.normalize(),
        barycentric: Vector3::new(-v - w + 1.0, v, w),
    })
}
