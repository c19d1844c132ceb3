use super::{merge_keys, MergeSettings, VariationPolicy, VariationSearch};
use crate::bricks::{CellKey, LegalSizeTable, VoxelDictionary};
use crate::utils::{CancelToken, Cancelled};
use oorandom::Rand32;

/// Score of the bricks rooted among `keys`: twice the brick count, plus one per pair of
/// same-size bricks sharing an aligned edge.
pub fn variation_score(dict: &VoxelDictionary, keys: &[CellKey]) -> u64 {
    let mut score = 0;

    for key in keys {
        let Some(size) = dict.get(key).filter(|c| c.is_root()).and_then(|c| c.size) else {
            continue;
        };

        score += 2;

        for next in [
            key.offset(size.x as i32, 0, 0),
            key.offset(0, size.y as i32, 0),
        ] {
            if dict
                .get(&next)
                .is_some_and(|c| c.is_root() && c.size == Some(size))
            {
                score += 1;
            }
        }
    }

    score
}

/// Merges `keys` layer by layer, keeping the best of several independent passes per layer.
///
/// Each pass runs on a copy of the cells the layer's bricks may cover, with its own random
/// stream forked from `rng`. Returns the number of bricks created.
pub fn merge_with_variations(
    dict: &mut VoxelDictionary,
    keys: &[CellKey],
    table: &LegalSizeTable,
    settings: &MergeSettings,
    search: &VariationSearch,
    rng: &mut Rand32,
    cancel: &CancelToken,
) -> Result<usize, Cancelled> {
    let family = table.family();
    let max_span = table
        .sizes()
        .iter()
        .map(|s| family.layer_span(*s) as i32)
        .max()
        .unwrap_or(1);
    let mut num_bricks = 0;

    for (z, layer) in VoxelDictionary::group_by_layer(keys.iter().copied()) {
        let region: VoxelDictionary = dict
            .iter()
            .filter(|(k, _)| k.z >= z && k.z < z + max_span)
            .map(|(k, c)| (*k, c.clone()))
            .collect();

        let mut best: Option<(u64, usize, VoxelDictionary)> = None;

        for _ in 0..search.passes.max(1) {
            let mut pass_rng = Rand32::new(rng.rand_u32() as u64);
            let mut trial = region.clone();
            let num = merge_keys(&mut trial, &layer, table, settings, &mut pass_rng, cancel)?;
            let score = variation_score(&trial, &layer);

            let better = match &best {
                None => true,
                Some((best_score, _, _)) => match search.policy {
                    VariationPolicy::Lowest => score < *best_score,
                    VariationPolicy::Highest => score > *best_score,
                },
            };

            if better {
                best = Some((score, num, trial));
            }
        }

        if let Some((score, num, trial)) = best {
            log::debug!("Layer {} kept a variation with score {}.", z, score);
            num_bricks += num;

            for (key, cell) in trial.iter() {
                let _ = dict.insert(*key, cell.clone());
            }
        }
    }

    Ok(num_bricks)
}
