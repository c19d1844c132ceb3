use super::MergeSettings;
use crate::bricks::{BrickFamily, BrickKind, BrickSize, CellKey, LegalSizeTable, ParentLink};
use crate::bricks::VoxelDictionary;
use crate::query::MaterialRef;
use crate::utils::{CancelToken, Cancelled};
use oorandom::Rand32;
use smallvec::SmallVec;

/// Greedily merges the drawn, unclaimed cells among `keys`.
///
/// Layers are processed bottom-up. Within a layer, keys are sorted then shuffled with `rng` so
/// the result only depends on the seed. Bricks are only anchored at `keys`, but their footprint
/// may claim any available drawn cell next to them.
///
/// Returns the number of bricks created.
pub fn merge_keys(
    dict: &mut VoxelDictionary,
    keys: &[CellKey],
    table: &LegalSizeTable,
    settings: &MergeSettings,
    rng: &mut Rand32,
    cancel: &CancelToken,
) -> Result<usize, Cancelled> {
    for key in keys {
        if let Some(cell) = dict.get_mut(key) {
            if cell.draw && !cell.is_claimed() {
                cell.attempted_merge = false;
            }
        }
    }

    let primary_axis = rng.rand_range(0..2) as usize;
    let mut num_bricks = 0;

    for (_, mut layer) in VoxelDictionary::group_by_layer(keys.iter().copied()) {
        cancel.check()?;

        layer.sort_unstable_by_key(|k| (k.y, k.x));
        layer.dedup();
        shuffle(&mut layer, rng);

        for key in layer {
            let reference = match dict.get(&key) {
                Some(cell) => cell.material,
                None => continue,
            };

            if !is_available(dict, key, reference, settings) {
                continue;
            }

            let size = best_size(dict, key, reference, table, settings, primary_axis);
            commit_brick(dict, key, size, table.family());
            num_bricks += 1;
        }
    }

    Ok(num_bricks)
}

/// Fisher-Yates shuffle driven by the merge stream.
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut Rand32) {
    for i in (1..items.len()).rev() {
        let j = rng.rand_range(0..i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

#[inline]
fn materials_compatible(a: Option<MaterialRef>, b: Option<MaterialRef>, settings: &MergeSettings) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b || settings.merge_inconsistent_materials,
        _ => true,
    }
}

fn is_available(
    dict: &VoxelDictionary,
    key: CellKey,
    reference: Option<MaterialRef>,
    settings: &MergeSettings,
) -> bool {
    dict.get(&key).is_some_and(|cell| {
        cell.draw
            && cell.parent == ParentLink::Unclaimed
            && !cell.attempted_merge
            && materials_compatible(reference, cell.material, settings)
    })
}

/// Number of consecutive available cells starting at `root` along `dir`, capped to `limit`.
fn run_length(
    dict: &VoxelDictionary,
    root: CellKey,
    dir: (i32, i32),
    reference: Option<MaterialRef>,
    settings: &MergeSettings,
    limit: u32,
) -> u32 {
    let mut len = 1;

    while len < limit {
        let next = root.offset(dir.0 * len as i32, dir.1 * len as i32, 0);

        if !is_available(dict, next, reference, settings) {
            break;
        }

        len += 1;
    }

    len
}

fn fits(
    dict: &VoxelDictionary,
    root: CellKey,
    size: BrickSize,
    reference: Option<MaterialRef>,
    family: BrickFamily,
    settings: &MergeSettings,
) -> bool {
    if settings.align_tall_bricks
        && family == BrickFamily::BricksAndPlates
        && size.z == 3
        && root.z.rem_euclid(3) != 0
    {
        return false;
    }

    let mut material = reference;

    for key in VoxelDictionary::footprint(root, size, family) {
        if key != root && !is_available(dict, key, material, settings) {
            return false;
        }

        // The first material met becomes the reference of the remaining cells.
        if material.is_none() {
            material = dict.get(&key).and_then(|c| c.material);
        }
    }

    true
}

fn best_size(
    dict: &VoxelDictionary,
    root: CellKey,
    reference: Option<MaterialRef>,
    table: &LegalSizeTable,
    settings: &MergeSettings,
    primary_axis: usize,
) -> BrickSize {
    let family = table.family();
    let limit = settings.max_width.max(settings.max_depth).max(1);
    let kx = run_length(dict, root, (1, 0), reference, settings, limit);
    let ky = run_length(dict, root, (0, 1), reference, settings, limit);

    let mut candidates: SmallVec<[BrickSize; 16]> = table
        .sizes_within(kx, ky)
        .into_iter()
        .filter(|s| s.x.max(s.y) <= settings.max_width.max(1))
        .filter(|s| s.x.min(s.y) <= settings.max_depth.max(1))
        .filter(|s| fits(dict, root, *s, reference, family, settings))
        .collect();

    let primary = |s: &BrickSize| if primary_axis == 0 { s.x } else { s.y };

    if settings.prefer_largest {
        candidates.sort_by_key(|s| (s.z, s.area(), primary(s)));
    } else {
        candidates.sort_by_key(|s| (s.z, s.x.min(s.y), s.area(), primary(s)));
    }

    candidates.last().copied().unwrap_or_else(|| table.base_size())
}

/// Claims the footprint of a brick of `size` anchored at `root`.
///
/// The root's material, or the first material found in the footprint, is propagated to every
/// covered cell.
pub(crate) fn commit_brick(dict: &mut VoxelDictionary, root: CellKey, size: BrickSize, family: BrickFamily) {
    let keys = VoxelDictionary::footprint(root, size, family);
    let material = keys
        .iter()
        .find_map(|k| dict.get(k).and_then(|c| c.material));

    for key in &keys {
        let Some(cell) = dict.get_mut(key) else {
            continue;
        };

        cell.attempted_merge = true;

        if *key == root {
            cell.make_root(size);

            if family == BrickFamily::BricksAndPlates
                && matches!(cell.kind, BrickKind::Standard | BrickKind::Plate)
            {
                cell.kind = if size.z >= 3 {
                    BrickKind::Standard
                } else {
                    BrickKind::Plate
                };
            }
        } else {
            cell.parent = ParentLink::Member(root);
            cell.size = None;
        }

        if material.is_some() {
            cell.material = material;
        }
    }
}
