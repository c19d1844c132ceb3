use crate::pipeline::ConfigError;
use smallvec::SmallVec;

/// The physical footprints of the standard part list, as `(short side, long side)`.
const STANDARD_FOOTPRINTS: [(u32, u32); 12] = [
    (1, 1),
    (1, 2),
    (1, 3),
    (1, 4),
    (1, 6),
    (1, 8),
    (2, 2),
    (2, 3),
    (2, 4),
    (2, 6),
    (2, 8),
    (2, 10),
];

/// The family of parts a model is built from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickFamily {
    /// Only full-height bricks; one lattice layer per brick.
    #[default]
    Bricks,
    /// Only plates; one lattice layer per plate.
    Plates,
    /// Bricks and plates mixed; one lattice layer per plate, bricks span three layers.
    BricksAndPlates,
    /// Host-defined parts; only 1x1 footprints.
    Custom,
}

impl BrickFamily {
    /// The nominal height, in plate units, of the smallest part of this family.
    #[inline]
    pub fn base_height(self) -> u32 {
        match self {
            BrickFamily::Plates | BrickFamily::BricksAndPlates => 1,
            BrickFamily::Bricks | BrickFamily::Custom => 3,
        }
    }

    /// Number of lattice layers a brick of the given size spans.
    #[inline]
    pub fn layer_span(self, size: BrickSize) -> u32 {
        match self {
            BrickFamily::BricksAndPlates => size.z.max(1),
            _ => 1,
        }
    }

    /// The heights, in plate units, available in this family.
    fn heights(self) -> &'static [u32] {
        match self {
            BrickFamily::Bricks | BrickFamily::Custom => &[3],
            BrickFamily::Plates => &[1],
            BrickFamily::BricksAndPlates => &[1, 3],
        }
    }
}

/// The size of a brick: its footprint in cells and its nominal height in plate units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrickSize {
    /// Extent along `x`, in cells.
    pub x: u32,
    /// Extent along `y`, in cells.
    pub y: u32,
    /// Nominal height, in plate units (3 for a brick, 1 for a plate).
    pub z: u32,
}

impl BrickSize {
    /// Creates a new brick size.
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        BrickSize { x, y, z }
    }

    /// A 1x1 footprint of the given height.
    #[inline]
    pub const fn unit(z: u32) -> Self {
        BrickSize::new(1, 1, z)
    }

    /// Number of cells covered by the footprint in one layer.
    #[inline]
    pub fn area(&self) -> u32 {
        self.x * self.y
    }

    /// The same size rotated by 90 degrees about the vertical axis.
    #[inline]
    pub fn transposed(&self) -> Self {
        BrickSize::new(self.y, self.x, self.z)
    }
}

/// The set of brick sizes a merge is allowed to produce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegalSizeTable {
    family: BrickFamily,
    sizes: Vec<BrickSize>,
}

impl LegalSizeTable {
    /// Creates a table from an explicit list of sizes.
    ///
    /// The table must contain the 1x1 size at the family's base height, which is what any cell
    /// falls back to when it cannot merge with its neighbors.
    pub fn new(family: BrickFamily, sizes: Vec<BrickSize>) -> Result<Self, ConfigError> {
        if sizes.is_empty() {
            return Err(ConfigError::EmptySizeTable);
        }

        if let Some(zero) = sizes.iter().find(|s| s.x == 0 || s.y == 0 || s.z == 0) {
            return Err(ConfigError::ZeroSizeDimension(*zero));
        }

        let base = BrickSize::unit(family.base_height());

        if !sizes.contains(&base) {
            return Err(ConfigError::MissingBaseSize {
                height: base.z,
            });
        }

        let mut sizes = sizes;
        sizes.sort_unstable();
        sizes.dedup();

        Ok(LegalSizeTable { family, sizes })
    }

    /// Creates a table from a list of `(width, depth)` footprints.
    ///
    /// Every footprint is allowed in both orientations and at every height of the family.
    pub fn from_footprints(
        family: BrickFamily,
        footprints: &[(u32, u32)],
    ) -> Result<Self, ConfigError> {
        let mut sizes = Vec::with_capacity(footprints.len() * 4);

        for (w, d) in footprints {
            for h in family.heights() {
                sizes.push(BrickSize::new(*w, *d, *h));
                sizes.push(BrickSize::new(*d, *w, *h));
            }
        }

        Self::new(family, sizes)
    }

    /// The standard part list of the given family.
    pub fn standard(family: BrickFamily) -> Self {
        let sizes: Vec<BrickSize> = match family {
            BrickFamily::Custom => vec![BrickSize::unit(family.base_height())],
            _ => STANDARD_FOOTPRINTS
                .iter()
                .flat_map(|(w, d)| {
                    family.heights().iter().flat_map(move |h| {
                        [BrickSize::new(*w, *d, *h), BrickSize::new(*d, *w, *h)]
                    })
                })
                .collect(),
        };

        let mut sizes = sizes;
        sizes.sort_unstable();
        sizes.dedup();
        LegalSizeTable { family, sizes }
    }

    /// The family this table was built for.
    #[inline]
    pub fn family(&self) -> BrickFamily {
        self.family
    }

    /// The legal sizes, sorted.
    #[inline]
    pub fn sizes(&self) -> &[BrickSize] {
        &self.sizes
    }

    /// Is `size` a legal size?
    #[inline]
    pub fn contains(&self, size: &BrickSize) -> bool {
        self.sizes.binary_search(size).is_ok()
    }

    /// The fallback size of a cell that cannot merge.
    #[inline]
    pub fn base_size(&self) -> BrickSize {
        BrickSize::unit(self.family.base_height())
    }

    /// The legal sizes whose footprint fits within `max_x` by `max_y` cells.
    pub fn sizes_within(&self, max_x: u32, max_y: u32) -> SmallVec<[BrickSize; 16]> {
        self.sizes
            .iter()
            .filter(|s| s.x <= max_x && s.y <= max_y)
            .copied()
            .collect()
    }
}
