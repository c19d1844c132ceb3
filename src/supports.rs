//! Internal supports: extra interior cells drawn for sturdier (or printable) models.

use crate::bricks::{BrickFamily, CellKey, VoxelDictionary};
use crate::math::Real;
use crate::merge::{release_brick, roots_overlapping};

/// The pattern of interior cells drawn as supports.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternalSupports {
    /// No supports.
    #[default]
    None,
    /// Square pillars of `thickness` cells repeated every `step` cells along `x` and `y`.
    Columns {
        /// Width of a pillar, in cells.
        thickness: u32,
        /// Period of the pillars, in cells.
        step: u32,
    },
    /// Beams along `x` and `y` every `step` cells.
    Lattice {
        /// Period of the beams, in cells.
        step: u32,
        /// Number of layers of each beam course when alternating.
        height: u32,
        /// Alternate courses of `x` beams and `y` beams.
        alternate_xy: bool,
    },
}

impl InternalSupports {
    /// Does this pattern draw the cell at `key`?
    pub fn contains(&self, key: CellKey) -> bool {
        match *self {
            InternalSupports::None => false,
            InternalSupports::Columns { thickness, step } => {
                let step = step.max(1) as i32;
                let thickness = thickness as i32;
                key.x.rem_euclid(step) < thickness && key.y.rem_euclid(step) < thickness
            }
            InternalSupports::Lattice {
                step,
                height,
                alternate_xy,
            } => {
                let step = step.max(1) as i32;
                let course = if alternate_xy {
                    key.z.div_euclid(height.max(1) as i32)
                } else {
                    key.z
                };
                let course = course.rem_euclid(2);

                (key.x.rem_euclid(step) == 0 && (!alternate_xy || course == 0))
                    || (key.y.rem_euclid(step) == 0 && (!alternate_xy || course == 1))
            }
        }
    }
}

/// Marks the interior cells matching `supports` to be drawn, as unclaimed cells.
///
/// With `clear_existing`, previous supports are removed first: bricks covering interior cells
/// valued below `draw_threshold` are released and those cells stop drawing. Returns the keys
/// that now need a merge.
pub fn apply_supports(
    dict: &mut VoxelDictionary,
    supports: &InternalSupports,
    clear_existing: bool,
    draw_threshold: Real,
    family: BrickFamily,
) -> Vec<CellKey> {
    let mut changed = Vec::new();

    if clear_existing {
        let interior: Vec<CellKey> = dict
            .sorted_keys()
            .into_iter()
            .filter(|k| {
                dict.get(k)
                    .is_some_and(|c| c.is_internal() && c.value < draw_threshold)
            })
            .collect();

        for root in roots_overlapping(dict, &interior) {
            // The shell part of a released brick must be merged again.
            changed.extend(release_brick(dict, root, family));
        }

        for key in &interior {
            if let Some(cell) = dict.get_mut(key) {
                cell.draw = false;
                cell.unclaim();
            }
        }

        changed.retain(|k| dict.get(k).is_some_and(|c| c.draw));
    }

    if *supports == InternalSupports::None {
        return changed;
    }

    for key in dict.sorted_keys() {
        if !supports.contains(key) {
            continue;
        }

        if let Some(cell) = dict.get_mut(&key) {
            if cell.is_internal() && !cell.draw {
                cell.draw = true;
                cell.unclaim();
                changed.push(key);
            }
        }
    }

    log::debug!("Internal supports marked {} cells.", changed.len());
    changed
}
