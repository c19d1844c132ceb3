use arrayvec::ArrayVec;

/// The integer coordinates of a lattice cell.
///
/// Keys are relative to the lattice anchor, so they may be negative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    /// Coordinate along the `x` axis.
    pub x: i32,
    /// Coordinate along the `y` axis.
    pub y: i32,
    /// Coordinate along the `z` (vertical) axis.
    pub z: i32,
}

impl CellKey {
    /// Creates a new key.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        CellKey { x, y, z }
    }

    /// The key translated by the given offsets.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        CellKey::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six face-adjacent keys, in the order `+x, -x, +y, -y, +z, -z`.
    pub fn neighbors(self) -> ArrayVec<CellKey, 6> {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
        .into_iter()
        .collect()
    }

    /// The coordinate of this key along `axis` (0, 1 or 2).
    #[inline]
    pub fn along(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl From<[i32; 3]> for CellKey {
    fn from(v: [i32; 3]) -> Self {
        CellKey::new(v[0], v[1], v[2])
    }
}

impl core::fmt::Display for CellKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
