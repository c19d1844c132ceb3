//! Union of adjacent drawn cells into legal rectangular bricks.
//!
//! Cells are merged layer by layer, bottom-up, in an order shuffled by a seeded random stream.
//! Each unclaimed cell becomes the root of the largest legal brick it can anchor (according to
//! the ordering selected by [`MergeSettings::prefer_largest`]), or of a 1x1 brick if no larger
//! size fits.

pub use self::greedy::merge_keys;
pub use self::split::{release_brick, roots_overlapping, split_brick};
pub use self::variation::{merge_with_variations, variation_score};

use crate::bricks::{CellKey, LegalSizeTable, VoxelDictionary};
use crate::utils::{CancelToken, Cancelled};
use oorandom::Rand32;

mod greedy;
mod split;
mod variation;

/// Which variation of a layer is kept by the variation search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationPolicy {
    /// Keep the variation with the lowest score: few bricks and few aligned seams.
    #[default]
    Lowest,
    /// Keep the variation with the highest score.
    Highest,
}

/// Settings of the per-layer variation search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationSearch {
    /// Number of independent merge passes per layer.
    pub passes: u32,
    /// Which pass is committed.
    pub policy: VariationPolicy,
}

impl Default for VariationSearch {
    fn default() -> Self {
        VariationSearch {
            passes: 4,
            policy: VariationPolicy::Lowest,
        }
    }
}

/// Settings of the merge engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Maximum length, in cells, of the long side of a brick.
    pub max_width: u32,
    /// Maximum length, in cells, of the short side of a brick.
    pub max_depth: u32,
    /// Order candidate sizes by area only, instead of favoring balanced footprints.
    pub prefer_largest: bool,
    /// Merge cells with different materials.
    pub merge_inconsistent_materials: bool,
    /// Only start three-layer bricks on layers whose index is a multiple of three.
    pub align_tall_bricks: bool,
    /// Runs several merge passes per layer and keeps the best one.
    pub variation: Option<VariationSearch>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        MergeSettings {
            max_width: 10,
            max_depth: 2,
            prefer_largest: false,
            merge_inconsistent_materials: false,
            align_tall_bricks: false,
            variation: None,
        }
    }
}

/// Merges the given keys, with the variation search if enabled.
///
/// Returns the number of bricks created.
pub fn merge(
    dict: &mut VoxelDictionary,
    keys: &[CellKey],
    table: &LegalSizeTable,
    settings: &MergeSettings,
    rng: &mut Rand32,
    cancel: &CancelToken,
) -> Result<usize, Cancelled> {
    match settings.variation {
        Some(search) if search.passes > 1 => {
            merge_with_variations(dict, keys, table, settings, &search, rng, cancel)
        }
        _ => merge_keys(dict, keys, table, settings, rng, cancel),
    }
}
