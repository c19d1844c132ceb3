use crate::bricks::{BrickFamily, BrickSize, Cell, CellKey, LegalSizeTable, ParentLink};
use crate::utils::hashmap::{self, HashMap, HashSet};
use alloc::collections::BTreeMap;

/// A violation of the brick partition invariants of a [`VoxelDictionary`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionError {
    /// A root has no size.
    #[error("The root {0} has no size.")]
    RootWithoutSize(CellKey),
    /// A root's size is not part of the legal-size table.
    #[error("The root {root} has the illegal size {size:?}.")]
    IllegalSize {
        /// The faulty root.
        root: CellKey,
        /// Its size.
        size: BrickSize,
    },
    /// A cell covered by a brick footprint is missing, undrawn, or claimed by another brick.
    #[error("The cell {cell} is not a valid member of the brick anchored at {root}.")]
    InvalidMember {
        /// The root of the brick.
        root: CellKey,
        /// The offending cell.
        cell: CellKey,
    },
    /// A drawn cell is not covered by any brick.
    #[error("The drawn cell {0} is not covered by any brick.")]
    Uncovered(CellKey),
    /// A member points to a cell that is not a root.
    #[error("The cell {cell} points to {parent}, which is not a brick root.")]
    DanglingMember {
        /// The offending cell.
        cell: CellKey,
        /// Its parent pointer.
        parent: CellKey,
    },
}

/// The sparse, keyed store of per-cell records.
///
/// Serialization writes the cells as a key-sorted list so identical dictionaries always have
/// identical text forms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxelDictionary {
    cells: HashMap<CellKey, Cell>,
}

impl serde::Serialize for VoxelDictionary {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        hashmap::serialize_sorted_entries(&self.cells, s)
    }
}

impl<'de> serde::Deserialize<'de> for VoxelDictionary {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(VoxelDictionary {
            cells: hashmap::deserialize_entries(d)?,
        })
    }
}

impl VoxelDictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Does this dictionary contain no cell at all?
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `key`, if any.
    #[inline]
    pub fn get(&self, key: &CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// The cell at `key`, if any.
    #[inline]
    pub fn get_mut(&mut self, key: &CellKey) -> Option<&mut Cell> {
        self.cells.get_mut(key)
    }

    /// Is there a cell at `key`?
    #[inline]
    pub fn contains_key(&self, key: &CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Inserts a cell, returning the one it replaces.
    pub fn insert(&mut self, key: CellKey, cell: Cell) -> Option<Cell> {
        self.cells.insert(key, cell)
    }

    /// Removes a cell.
    pub fn remove(&mut self, key: &CellKey) -> Option<Cell> {
        self.cells.remove(key)
    }

    /// Iterates through all the cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Cell)> {
        self.cells.iter()
    }

    /// Iterates mutably through all the cells, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&CellKey, &mut Cell)> {
        self.cells.iter_mut()
    }

    /// All the keys, sorted.
    pub fn sorted_keys(&self) -> Vec<CellKey> {
        let mut keys: Vec<_> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// The keys of every brick root, sorted.
    pub fn root_keys(&self) -> Vec<CellKey> {
        let mut roots: Vec<_> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.is_root())
            .map(|(key, _)| *key)
            .collect();
        roots.sort_unstable();
        roots
    }

    /// The key of the root of the brick covering `key`.
    pub fn root_of(&self, key: &CellKey) -> Option<CellKey> {
        self.cells.get(key)?.root_key(*key)
    }

    /// The given keys grouped by layer, lowest layer first.
    pub fn group_by_layer(keys: impl IntoIterator<Item = CellKey>) -> BTreeMap<i32, Vec<CellKey>> {
        let mut layers: BTreeMap<i32, Vec<CellKey>> = BTreeMap::new();

        for key in keys {
            layers.entry(key.z).or_default().push(key);
        }

        layers
    }

    /// The keys covered by a brick of the given size anchored at `root`.
    pub fn footprint(root: CellKey, size: BrickSize, family: BrickFamily) -> Vec<CellKey> {
        let span = family.layer_span(size) as i32;
        let mut keys = Vec::with_capacity((size.area() as usize) * span as usize);

        for dz in 0..span {
            for dy in 0..size.y as i32 {
                for dx in 0..size.x as i32 {
                    keys.push(root.offset(dx, dy, dz));
                }
            }
        }

        keys
    }

    /// The keys covered by the brick anchored at `root`, or an empty list if `root` is not a
    /// root.
    pub fn brick_keys(&self, root: CellKey, family: BrickFamily) -> Vec<CellKey> {
        match self.cells.get(&root) {
            Some(cell) if cell.is_root() => cell
                .size
                .map(|size| Self::footprint(root, size, family))
                .unwrap_or_else(|| vec![root]),
            _ => Vec::new(),
        }
    }

    /// Checks that the brick roots partition exactly the set of drawn cells, with legal sizes
    /// and flat parent pointers.
    pub fn check_partition(&self, table: &LegalSizeTable) -> Result<(), PartitionError> {
        let family = table.family();
        let mut covered = HashSet::default();

        for root in self.root_keys() {
            let size = self.cells[&root]
                .size
                .ok_or(PartitionError::RootWithoutSize(root))?;

            if !table.contains(&size) {
                return Err(PartitionError::IllegalSize { root, size });
            }

            for key in Self::footprint(root, size, family) {
                let valid = match self.cells.get(&key) {
                    Some(cell) if cell.draw => {
                        if key == root {
                            true
                        } else {
                            cell.parent == ParentLink::Member(root)
                        }
                    }
                    _ => false,
                };

                if !valid || !covered.insert(key) {
                    return Err(PartitionError::InvalidMember { root, cell: key });
                }
            }
        }

        for key in self.sorted_keys() {
            let cell = &self.cells[&key];

            if let ParentLink::Member(parent) = cell.parent {
                if !self.cells.get(&parent).is_some_and(|p| p.is_root()) {
                    return Err(PartitionError::DanglingMember { cell: key, parent });
                }
            }

            if cell.draw && !covered.contains(&key) {
                return Err(PartitionError::Uncovered(key));
            }
        }

        Ok(())
    }
}

impl FromIterator<(CellKey, Cell)> for VoxelDictionary {
    fn from_iter<T: IntoIterator<Item = (CellKey, Cell)>>(iter: T) -> Self {
        VoxelDictionary {
            cells: iter.into_iter().collect(),
        }
    }
}
