use crate::bounding_volume::Aabb;
use crate::math::Real;

/// The content of one voxel of a volumetric field.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct FieldSample {
    /// Smoke density, usually within `[0, 1]`.
    pub density: Real,
    /// Flame intensity, usually within `[0, 1]`.
    pub flame: Real,
    /// Smoke color (linear RGB).
    pub color: [Real; 3],
}

/// The sub-region of the source bounds actually covered by an adaptive simulation domain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdaptiveDomain {
    /// The bounds of the whole (non-adaptive) domain.
    pub full: Aabb,
    /// The bounds of the region the field resolution spans.
    pub active: Aabb,
}

/// A density/flame/color field sampled on a fixed-resolution grid.
pub trait VolumetricField: Sync {
    /// Number of voxels along each axis.
    fn resolution(&self) -> [u32; 3];

    /// Samples the voxel at the given grid index.
    ///
    /// Each index component is smaller than the matching `resolution()` component.
    fn sample(&self, index: [u32; 3]) -> FieldSample;

    /// Adaptive-domain metadata, if the field only covers part of the source bounds.
    fn adaptive_domain(&self) -> Option<AdaptiveDomain> {
        None
    }
}

/// A volumetric field fully stored in memory.
///
/// Voxels are stored with the x index varying fastest.
#[derive(Clone, Debug)]
pub struct DenseField {
    resolution: [u32; 3],
    samples: Vec<FieldSample>,
    adaptive: Option<AdaptiveDomain>,
}

impl DenseField {
    /// Creates a field from its samples.
    ///
    /// Returns `None` if the number of samples does not match the resolution.
    pub fn new(resolution: [u32; 3], samples: Vec<FieldSample>) -> Option<Self> {
        let len = resolution.iter().map(|r| *r as usize).product::<usize>();

        if len != samples.len() {
            return None;
        }

        Some(DenseField {
            resolution,
            samples,
            adaptive: None,
        })
    }

    /// Creates a field by evaluating `f` at every voxel.
    pub fn from_fn(resolution: [u32; 3], mut f: impl FnMut([u32; 3]) -> FieldSample) -> Self {
        let mut samples =
            Vec::with_capacity(resolution.iter().map(|r| *r as usize).product::<usize>());

        for k in 0..resolution[2] {
            for j in 0..resolution[1] {
                for i in 0..resolution[0] {
                    samples.push(f([i, j, k]));
                }
            }
        }

        DenseField {
            resolution,
            samples,
            adaptive: None,
        }
    }

    /// Attaches adaptive-domain metadata to this field.
    pub fn with_adaptive_domain(mut self, domain: AdaptiveDomain) -> Self {
        self.adaptive = Some(domain);
        self
    }

    fn linear_index(&self, index: [u32; 3]) -> usize {
        let [rx, ry, _] = self.resolution;
        (index[0] + index[1] * rx + index[2] * rx * ry) as usize
    }
}

impl VolumetricField for DenseField {
    fn resolution(&self) -> [u32; 3] {
        self.resolution
    }

    fn sample(&self, index: [u32; 3]) -> FieldSample {
        self.samples[self.linear_index(index)]
    }

    fn adaptive_domain(&self) -> Option<AdaptiveDomain> {
        self.adaptive
    }
}
