use crate::bricks::{BrickFamily, BrickSize, CellKey, VoxelDictionary};
use alloc::collections::BTreeSet;

/// The roots of the bricks covering any of `keys`.
pub fn roots_overlapping<'a>(
    dict: &VoxelDictionary,
    keys: impl IntoIterator<Item = &'a CellKey>,
) -> BTreeSet<CellKey> {
    keys.into_iter().filter_map(|k| dict.root_of(k)).collect()
}

/// Unclaims every cell of the brick anchored at `root`, so they can be merged again.
///
/// Returns the released keys, or an empty list if `root` does not anchor a brick.
pub fn release_brick(dict: &mut VoxelDictionary, root: CellKey, family: BrickFamily) -> Vec<CellKey> {
    let keys = dict.brick_keys(root, family);

    for key in &keys {
        if let Some(cell) = dict.get_mut(key) {
            cell.unclaim();
        }
    }

    keys
}

/// Splits the brick anchored at `root` into 1x1 bricks of the family's base height.
///
/// Every drawn cell of the footprint becomes a root and inherits the exposure of the former
/// brick. Returns the keys of the new roots.
pub fn split_brick(dict: &mut VoxelDictionary, root: CellKey, family: BrickFamily) -> Vec<CellKey> {
    let (top, bottom) = match dict.get(&root) {
        Some(cell) if cell.is_root() => (cell.top_exposed, cell.bottom_exposed),
        _ => return Vec::new(),
    };

    let base = BrickSize::unit(family.base_height());
    let mut roots = Vec::new();

    for key in release_brick(dict, root, family) {
        if let Some(cell) = dict.get_mut(&key) {
            if !cell.draw {
                continue;
            }

            cell.make_root(base);
            cell.attempted_merge = true;
            cell.top_exposed = top;
            cell.bottom_exposed = bottom;
            roots.push(key);
        }
    }

    roots
}
