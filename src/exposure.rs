//! Top and bottom visibility of merged bricks.
//!
//! A brick face is exposed if some column above (or below) its footprint reaches the outside
//! of the model, possibly through undrawn interior cells. Those interior cells are then reset
//! to the outside, so they no longer carry stale interior material.

use crate::bricks::{BrickFamily, Cell, CellKey, VoxelDictionary};
use alloc::collections::BTreeSet;

/// Walks the column starting at `start` along `dz` and reports whether it reaches the outside.
fn column_exposed(dict: &mut VoxelDictionary, start: CellKey, dz: i32) -> bool {
    let mut walked = Vec::new();
    let mut key = start;

    let exposed = loop {
        match dict.get(&key) {
            None => break true,
            Some(cell) if cell.is_outside() => break true,
            Some(cell) if cell.is_internal() && !cell.draw => {
                walked.push(key);
                key = key.offset(0, 0, dz);
            }
            Some(_) => break false,
        }
    };

    if exposed {
        for key in walked {
            if let Some(cell) = dict.get_mut(&key) {
                cell.value = Cell::OUTSIDE;
            }
        }
    }

    exposed
}

/// Recomputes the exposure of the brick anchored at `root`.
///
/// Returns `(top_exposed, bottom_exposed)`, or `None` if `root` does not anchor a brick.
pub fn update_exposure(
    dict: &mut VoxelDictionary,
    root: CellKey,
    family: BrickFamily,
) -> Option<(bool, bool)> {
    let size = dict.get(&root).filter(|c| c.is_root())?.size?;
    let span = family.layer_span(size) as i32;
    let mut top = false;
    let mut bottom = false;

    for dy in 0..size.y as i32 {
        for dx in 0..size.x as i32 {
            let column = root.offset(dx, dy, 0);
            // Every column is walked, so all the stale interior cells get reset.
            top |= column_exposed(dict, column.offset(0, 0, span), 1);
            bottom |= column_exposed(dict, column.offset(0, 0, -1), -1);
        }
    }

    let cell = dict.get_mut(&root)?;
    cell.top_exposed = top;
    cell.bottom_exposed = bottom;
    Some((top, bottom))
}

/// Recomputes the exposure of every brick, lowest layer first.
pub fn update_all_exposure(dict: &mut VoxelDictionary, family: BrickFamily) {
    for root in dict.root_keys() {
        let _ = update_exposure(dict, root, family);
    }
}

/// Recomputes the exposure of the bricks covering `keys` or one of their neighbors.
pub fn update_exposure_around(dict: &mut VoxelDictionary, keys: &[CellKey], family: BrickFamily) {
    let roots: BTreeSet<CellKey> = keys
        .iter()
        .flat_map(|k| core::iter::once(*k).chain(k.neighbors()))
        .filter_map(|k| dict.root_of(&k))
        .collect();

    for root in roots {
        let _ = update_exposure(dict, root, family);
    }
}
