use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DEFAULT_EPSILON};
use crate::query::{local_ray_intersection_with_triangle, Ray, SurfaceHit, SurfaceQuery};
use ordered_float::OrderedFloat;

/// Indicated an inconsistency while building a triangle soup.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// A triangle soup must contain at least one triangle.
    #[error("A triangle soup must contain at least one triangle.")]
    EmptyIndices,
    /// A triangle references a vertex that does not exist.
    #[error("Triangle {triangle} references the vertex {index} but only {num_vertices} vertices exist.")]
    IndexOutOfBounds {
        /// The faulty triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the soup.
        num_vertices: usize,
    },
}

/// An unstructured set of triangles, queried by brute force.
///
/// Each triangle's face id is its position in the index buffer. The triangles' winding defines
/// their orientation: `(b - a) × (c - a)` points out of the enclosed volume.
#[derive(Clone, Debug)]
pub struct TriangleSoup {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
    aabb: Aabb,
    hit_tolerance: Real,
}

impl TriangleSoup {
    /// Creates a new triangle soup from a vertex buffer and an index buffer.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Result<Self, SurfaceError> {
        if indices.is_empty() {
            return Err(SurfaceError::EmptyIndices);
        }

        for (triangle, idx) in indices.iter().enumerate() {
            if let Some(index) = idx.iter().find(|i| **i as usize >= vertices.len()) {
                return Err(SurfaceError::IndexOutOfBounds {
                    triangle,
                    index: *index,
                    num_vertices: vertices.len(),
                });
            }
        }

        let aabb = Aabb::from_points(
            indices
                .iter()
                .flat_map(|idx| idx.iter().map(|i| vertices[*i as usize])),
        )
        .ok_or(SurfaceError::EmptyIndices)?;

        Ok(TriangleSoup {
            vertices,
            indices,
            aabb,
            hit_tolerance: DEFAULT_EPSILON,
        })
    }

    /// The closed, outward-oriented surface of a box.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let ext = aabb.extents();
        let vertices = (0..8u32)
            .map(|i| {
                Point::new(
                    aabb.mins.x + if i & 1 != 0 { ext.x } else { 0.0 },
                    aabb.mins.y + if i & 2 != 0 { ext.y } else { 0.0 },
                    aabb.mins.z + if i & 4 != 0 { ext.z } else { 0.0 },
                )
            })
            .collect();
        let indices = vec![
            [0, 4, 2],
            [2, 4, 6],
            [1, 3, 5],
            [3, 7, 5],
            [0, 1, 4],
            [1, 5, 4],
            [2, 6, 3],
            [3, 6, 7],
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
        ];

        TriangleSoup {
            vertices,
            indices,
            aabb: *aabb,
            hit_tolerance: DEFAULT_EPSILON,
        }
    }

    /// Sets the distance under which two crossings of the same ray are considered the same.
    pub fn with_hit_tolerance(mut self, tolerance: Real) -> Self {
        self.hit_tolerance = tolerance;
        self
    }

    /// The vertex buffer.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }
}

impl SurfaceQuery for TriangleSoup {
    fn cast_ray(&self, ray: &Ray) -> Vec<SurfaceHit> {
        let mut hits: Vec<SurfaceHit> = self
            .indices
            .iter()
            .enumerate()
            .filter_map(|(face_id, idx)| {
                let a = &self.vertices[idx[0] as usize];
                let b = &self.vertices[idx[1] as usize];
                let c = &self.vertices[idx[2] as usize];
                let hit = local_ray_intersection_with_triangle(a, b, c, ray)?;

                Some(SurfaceHit {
                    distance: hit.toi,
                    point: ray.point_at(hit.toi),
                    normal: hit.normal,
                    face_id: face_id as u32,
                })
            })
            .collect();

        hits.sort_by_key(|hit| (OrderedFloat(hit.distance), hit.face_id));

        // A ray going through an edge or a vertex shared by several faces crosses the surface
        // once. Two coincident hits with opposite orientations are a tangent touch and are both
        // kept so the crossing parity is unchanged.
        let tolerance = self.hit_tolerance;
        let dir = ray.dir;
        hits.dedup_by(|next, kept| {
            (next.distance - kept.distance).abs() <= tolerance
                && (next.normal.dot(&dir) > 0.0) == (kept.normal.dot(&dir) > 0.0)
        });

        hits
    }

    fn aabb(&self) -> Aabb {
        self.aabb
    }
}
