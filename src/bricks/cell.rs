use crate::bricks::{BrickSize, CellKey};
use crate::math::{Point, Real, Vector};
use crate::query::MaterialRef;

/// Merge-group pointer of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentLink {
    /// The cell does not belong to any brick yet.
    #[default]
    Unclaimed,
    /// The cell anchors a brick and holds its size.
    Root,
    /// The cell is covered by the brick anchored at the given key.
    Member(CellKey),
}

/// The nearest intersection of the source surface recorded for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    /// The intersected face.
    pub face_id: u32,
    /// The intersection point.
    pub point: Point<Real>,
    /// The oriented normal of the intersected face.
    pub normal: Vector<Real>,
    /// Distance from the cell center (or from the forward neighbor) to the intersection.
    pub distance: Real,
}

/// The part geometry a brick should be materialized with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickKind {
    /// A regular brick.
    #[default]
    Standard,
    /// A plate (one third of a brick high).
    Plate,
    /// A plate without studs.
    Tile,
    /// A slope whose orientation follows the surface normal.
    Slope,
    /// An inverted slope.
    SlopeInverted,
    /// A round brick.
    Round,
    /// A host-defined part.
    Custom,
}

impl BrickKind {
    /// Is this a slope whose orientation is derived from the surface normal?
    pub fn is_slope(self) -> bool {
        matches!(self, BrickKind::Slope | BrickKind::SlopeInverted)
    }
}

/// One record of the voxel dictionary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// `0` outside, `(0, 1)` interior weighted by depth, `1` shell, `-1` unclassified interior.
    pub value: Real,
    /// Whether this cell renders as part of some brick.
    pub draw: bool,
    /// Size of the brick anchored here. Only set on roots.
    pub size: Option<BrickSize>,
    /// Merge-group pointer.
    pub parent: ParentLink,
    /// Nearest recorded intersection with the source surface.
    pub near_surface: Option<SurfaceSample>,
    /// Resolved material.
    pub material: Option<MaterialRef>,
    /// Sampled RGBA color, if the source provides colors instead of materials.
    pub color: Option<[Real; 4]>,
    /// Is the top face of the brick anchored here visible?
    pub top_exposed: bool,
    /// Is the bottom face of the brick anchored here visible?
    pub bottom_exposed: bool,
    /// Part geometry.
    pub kind: BrickKind,
    /// Flipped over its non-mirrored axis.
    pub flipped: bool,
    /// Rotated by 90 degrees about the vertical axis.
    pub rotated: bool,
    /// Transient flag set once a merge pass has visited this cell.
    pub attempted_merge: bool,
}

impl Cell {
    /// The value of a cell outside of the source.
    pub const OUTSIDE: Real = 0.0;
    /// The value of a shell cell.
    pub const SHELL: Real = 1.0;
    /// The value of an interior cell beyond the falloff depth.
    pub const UNCLASSIFIED_INTERIOR: Real = -1.0;

    /// A fresh, unclaimed and undrawn cell with the given value.
    pub fn new(value: Real) -> Self {
        Cell {
            value,
            draw: false,
            size: None,
            parent: ParentLink::Unclaimed,
            near_surface: None,
            material: None,
            color: None,
            top_exposed: false,
            bottom_exposed: false,
            kind: BrickKind::Standard,
            flipped: false,
            rotated: false,
            attempted_merge: false,
        }
    }

    /// Is this cell inside the source without being on its shell?
    #[inline]
    pub fn is_internal(&self) -> bool {
        (self.value > 0.0 && self.value < 1.0) || self.value == Self::UNCLASSIFIED_INTERIOR
    }

    /// Is this cell outside of the source?
    #[inline]
    pub fn is_outside(&self) -> bool {
        self.value == Self::OUTSIDE
    }

    /// Does this cell anchor a brick?
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent == ParentLink::Root
    }

    /// Is this cell part of a brick?
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.parent != ParentLink::Unclaimed
    }

    /// The key of the root of the brick covering this cell, `own_key` being this cell's key.
    #[inline]
    pub fn root_key(&self, own_key: CellKey) -> Option<CellKey> {
        match self.parent {
            ParentLink::Unclaimed => None,
            ParentLink::Root => Some(own_key),
            ParentLink::Member(root) => Some(root),
        }
    }

    /// Drops any brick membership of this cell.
    pub fn unclaim(&mut self) {
        self.parent = ParentLink::Unclaimed;
        self.size = None;
        self.attempted_merge = false;
    }

    /// Makes this cell its own brick of the given size.
    pub fn make_root(&mut self, size: BrickSize) {
        self.parent = ParentLink::Root;
        self.size = Some(size);
    }
}
