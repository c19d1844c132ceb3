//! Explicit edits issued by external tools on a built dictionary.
//!
//! Every operation keeps the brick partition valid: bricks it breaks are split into 1x1 bricks
//! rather than left partially claimed.

use super::EditError;
use crate::bricks::{BrickFamily, BrickSize, Cell, CellKey, LegalSizeTable, ParentLink, VoxelDictionary};
use crate::merge;
use crate::query::MaterialRef;
use alloc::collections::BTreeSet;

fn root_cell(dict: &VoxelDictionary, root: CellKey) -> Result<&Cell, EditError> {
    let cell = dict.get(&root).ok_or(EditError::UnknownKey(root))?;

    if cell.is_root() {
        Ok(cell)
    } else {
        Err(EditError::NotARoot(root))
    }
}

/// Deletes the given cells from the model.
///
/// Deleted cells become outside cells and the bricks containing them are split. With
/// `auto_update_exposed`, the non-outside neighbors of a deleted cell become shell (and start
/// drawing as 1x1 bricks of the deleted cell's material), and the bricks right below and above
/// it get their top and bottom faces exposed.
///
/// Returns the keys that should be merged again, sorted.
pub fn delete_cells(
    dict: &mut VoxelDictionary,
    keys: &[CellKey],
    family: BrickFamily,
    auto_update_exposed: bool,
) -> Vec<CellKey> {
    let base = BrickSize::unit(family.base_height());
    let mut affected = BTreeSet::new();

    for key in keys {
        let Some(material) = dict.get(key).map(|c| c.material) else {
            continue;
        };

        if let Some(root) = dict.root_of(key) {
            affected.extend(merge::split_brick(dict, root, family));
        }

        if let Some(cell) = dict.get_mut(key) {
            cell.value = Cell::OUTSIDE;
            cell.draw = false;
            cell.unclaim();
        }

        let _ = affected.insert(*key);

        if !auto_update_exposed {
            continue;
        }

        for neighbor in key.neighbors() {
            let Some(cell) = dict.get_mut(&neighbor) else {
                continue;
            };

            if cell.is_outside() {
                continue;
            }

            cell.value = Cell::SHELL;

            if !cell.draw {
                cell.draw = true;
                cell.make_root(base);
                cell.material = material.or(cell.material);
            }

            let _ = affected.insert(neighbor);
        }

        if let Some(below) = dict.root_of(&key.offset(0, 0, -1)) {
            if let Some(cell) = dict.get_mut(&below) {
                cell.top_exposed = true;
            }
        }

        if let Some(above) = dict.root_of(&key.offset(0, 0, 1)) {
            if let Some(cell) = dict.get_mut(&above) {
                cell.bottom_exposed = true;
            }
        }
    }

    affected.into_iter().collect()
}

/// Resizes the brick anchored at `root`.
///
/// Bricks overlapping the new footprint are split first. Cells of the new footprint missing
/// from the dictionary are created from the root record. Returns the keys whose state changed.
pub fn set_brick_size(
    dict: &mut VoxelDictionary,
    root: CellKey,
    size: BrickSize,
    table: &LegalSizeTable,
) -> Result<Vec<CellKey>, EditError> {
    let template = root_cell(dict, root)?.clone();

    if !table.contains(&size) {
        return Err(EditError::IllegalSize(size));
    }

    let family = table.family();
    let footprint = VoxelDictionary::footprint(root, size, family);
    let mut affected: BTreeSet<CellKey> = merge::split_brick(dict, root, family).into_iter().collect();

    for other in merge::roots_overlapping(dict, &footprint) {
        affected.extend(merge::split_brick(dict, other, family));
    }

    for key in &footprint {
        if !dict.contains_key(key) {
            let mut cell = Cell::new(template.value);
            cell.near_surface = template.near_surface;
            cell.color = template.color;
            cell.kind = template.kind;
            let _ = dict.insert(*key, cell);
        }

        let Some(cell) = dict.get_mut(key) else {
            continue;
        };

        cell.draw = true;
        cell.attempted_merge = true;
        cell.material = template.material;

        if *key == root {
            cell.make_root(size);
            cell.kind = template.kind;
            cell.flipped = template.flipped;
            cell.rotated = template.rotated;
        } else {
            cell.parent = ParentLink::Member(root);
            cell.size = None;
        }

        let _ = affected.insert(*key);
    }

    Ok(affected.into_iter().collect())
}

/// Sets the material of the brick anchored at `root` and of all its cells.
pub fn set_material(
    dict: &mut VoxelDictionary,
    root: CellKey,
    material: MaterialRef,
    family: BrickFamily,
) -> Result<(), EditError> {
    let _ = root_cell(dict, root)?;

    for key in dict.brick_keys(root, family) {
        if let Some(cell) = dict.get_mut(&key) {
            cell.material = Some(material);
        }
    }

    Ok(())
}

/// Splits the brick anchored at `root` into 1x1 bricks. Returns the new roots.
pub fn split_brick(
    dict: &mut VoxelDictionary,
    root: CellKey,
    family: BrickFamily,
) -> Result<Vec<CellKey>, EditError> {
    let _ = root_cell(dict, root)?;
    Ok(merge::split_brick(dict, root, family))
}

#[cfg(test)]
mod test {
    use super::*;

    // A 3x3x3 block: a drawn shell of 1x1 bricks around an undrawn interior cell.
    fn block() -> VoxelDictionary {
        let mut dict = VoxelDictionary::new();

        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    let key = CellKey::new(x, y, z);
                    let interior = key == CellKey::new(1, 1, 1);
                    let mut cell = Cell::new(if interior { 0.99 } else { Cell::SHELL });

                    if !interior {
                        cell.draw = true;
                        cell.make_root(BrickSize::unit(3));
                        cell.material = Some(MaterialRef(1));
                    }

                    let _ = dict.insert(key, cell);
                }
            }
        }

        dict
    }

    #[test]
    fn deleting_re_exposes_neighbors() {
        let mut dict = block();
        let before = dict.clone();
        let deleted = CellKey::new(1, 1, 2);
        let affected = delete_cells(&mut dict, &[deleted], BrickFamily::Bricks, true);

        let interior = CellKey::new(1, 1, 1);
        assert!(dict.get(&deleted).unwrap().is_outside());
        assert!(dict.get(&interior).unwrap().draw);
        assert_eq!(dict.get(&interior).unwrap().material, Some(MaterialRef(1)));
        assert!(dict.get(&interior).unwrap().top_exposed);
        assert!(affected.contains(&interior));

        for (key, cell) in dict.iter() {
            if *key != deleted && !deleted.neighbors().contains(key) {
                assert_eq!(cell, before.get(key).unwrap());
            }
        }

        assert_eq!(
            dict.check_partition(&LegalSizeTable::standard(BrickFamily::Bricks)),
            Ok(())
        );
    }

    #[test]
    fn resizing_splits_overlapped_bricks() {
        let mut dict = block();
        let table = LegalSizeTable::standard(BrickFamily::Bricks);
        let root = CellKey::new(0, 0, 0);

        let first = CellKey::new(1, 1, 0);
        let _ = set_brick_size(&mut dict, first, BrickSize::new(2, 2, 3), &table).unwrap();
        assert_eq!(dict.get(&CellKey::new(2, 2, 0)).unwrap().parent, ParentLink::Member(first));
        assert_eq!(dict.check_partition(&table), Ok(()));

        let _ = set_brick_size(&mut dict, root, BrickSize::new(2, 2, 3), &table).unwrap();
        assert_eq!(dict.get(&first).unwrap().parent, ParentLink::Member(root));
        // The rest of the first brick was split back into unit bricks.
        let corner = dict.get(&CellKey::new(2, 2, 0)).unwrap();
        assert!(corner.is_root());
        assert_eq!(corner.size, Some(BrickSize::unit(3)));
        assert_eq!(dict.check_partition(&table), Ok(()));

        assert_eq!(
            set_brick_size(&mut dict, root, BrickSize::new(3, 3, 3), &table),
            Err(EditError::IllegalSize(BrickSize::new(3, 3, 3)))
        );
        assert_eq!(
            set_brick_size(&mut dict, CellKey::new(1, 0, 0), BrickSize::unit(3), &table),
            Err(EditError::NotARoot(CellKey::new(1, 0, 0)))
        );
    }

    #[test]
    fn resizing_creates_missing_cells() {
        let mut dict = block();
        let table = LegalSizeTable::standard(BrickFamily::Bricks);
        let root = CellKey::new(2, 2, 0);

        let _ = set_brick_size(&mut dict, root, BrickSize::new(2, 1, 3), &table).unwrap();
        let created = dict.get(&CellKey::new(3, 2, 0)).unwrap();
        assert_eq!(created.material, Some(MaterialRef(1)));
        assert_eq!(created.parent, ParentLink::Member(root));
    }

    #[test]
    fn material_and_split() {
        let mut dict = block();
        let table = LegalSizeTable::standard(BrickFamily::Bricks);
        let root = CellKey::new(0, 0, 0);
        let _ = set_brick_size(&mut dict, root, BrickSize::new(1, 2, 3), &table).unwrap();

        set_material(&mut dict, root, MaterialRef(9), BrickFamily::Bricks).unwrap();
        assert_eq!(dict.get(&CellKey::new(0, 1, 0)).unwrap().material, Some(MaterialRef(9)));

        let roots = split_brick(&mut dict, root, BrickFamily::Bricks).unwrap();
        assert_eq!(roots, vec![root, CellKey::new(0, 1, 0)]);
        assert_eq!(
            split_brick(&mut dict, CellKey::new(7, 7, 7), BrickFamily::Bricks),
            Err(EditError::UnknownKey(CellKey::new(7, 7, 7)))
        );
    }
}
