use crate::math::{Point, Real};

/// An opaque material identifier understood by the host application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialRef(pub u32);

/// What a [`MaterialResolver`] knows about a surface sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolvedMaterial {
    /// A named material.
    Material(MaterialRef),
    /// A raw RGBA color (e.g. sampled from a texture).
    Color([Real; 4]),
    /// Nothing is known about this sample.
    Unknown,
}

/// Resolves the material or color of the source surface at a given sample.
pub trait MaterialResolver {
    /// The material of face `face_id` at `point`.
    fn resolve(&self, face_id: u32, point: &Point<Real>) -> ResolvedMaterial;
}

impl<F> MaterialResolver for F
where
    F: Fn(u32, &Point<Real>) -> ResolvedMaterial,
{
    fn resolve(&self, face_id: u32, point: &Point<Real>) -> ResolvedMaterial {
        self(face_id, point)
    }
}

/// A resolver assigning one material per face.
#[derive(Clone, Debug, Default)]
pub struct PerFaceMaterials {
    /// The material of each face, indexed by face id.
    pub materials: Vec<MaterialRef>,
}

impl MaterialResolver for PerFaceMaterials {
    fn resolve(&self, face_id: u32, _: &Point<Real>) -> ResolvedMaterial {
        self.materials
            .get(face_id as usize)
            .map(|m| ResolvedMaterial::Material(*m))
            .unwrap_or(ResolvedMaterial::Unknown)
    }
}
