use crate::bricks::{BrickKind, BrickSize, CellKey, VoxelDictionary};
use crate::math::Real;
use crate::query::MaterialRef;
use oorandom::Rand32;

/// Number of feature variations (stud and logo placements) a brick may pick from.
pub const NUM_VARIATIONS: u32 = 4;

/// Everything the mesh-generation stage needs to know about one brick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrickInstance {
    /// Key of the brick root.
    pub key: CellKey,
    /// Size of the brick.
    pub size: BrickSize,
    /// Part geometry.
    pub kind: BrickKind,
    /// Flipped over its non-mirrored axis.
    pub flipped: bool,
    /// Rotated by 90 degrees about the vertical axis.
    pub rotated: bool,
    /// Resolved material.
    pub material: Option<MaterialRef>,
    /// Sampled RGBA color.
    pub color: Option<[Real; 4]>,
    /// Is the top face visible?
    pub top_exposed: bool,
    /// Is the bottom face visible?
    pub bottom_exposed: bool,
    /// Feature variation index, below [`NUM_VARIATIONS`].
    pub variation: u32,
}

/// The drawn bricks of `dict`, sorted by root key.
///
/// `rng` is the feature stream of the model; the variations are stable for a given seed.
pub fn brick_instances(dict: &VoxelDictionary, rng: &mut Rand32) -> Vec<BrickInstance> {
    dict.root_keys()
        .into_iter()
        .filter_map(|key| {
            let cell = dict.get(&key).filter(|c| c.draw)?;

            Some(BrickInstance {
                key,
                size: cell.size?,
                kind: cell.kind,
                flipped: cell.flipped,
                rotated: cell.rotated,
                material: cell.material,
                color: cell.color,
                top_exposed: cell.top_exposed,
                bottom_exposed: cell.bottom_exposed,
                variation: rng.rand_range(0..NUM_VARIATIONS),
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bricks::Cell;

    #[test]
    fn only_drawn_roots_are_instantiated() {
        let mut dict = VoxelDictionary::new();
        let mut root = Cell::new(Cell::SHELL);
        root.draw = true;
        root.make_root(BrickSize::new(1, 2, 3));
        let _ = dict.insert(CellKey::new(0, 0, 0), root.clone());
        root.draw = false;
        let _ = dict.insert(CellKey::new(5, 0, 0), root);
        let _ = dict.insert(CellKey::new(1, 0, 0), Cell::new(0.99));

        let bricks = brick_instances(&dict, &mut Rand32::new(0));
        assert_eq!(bricks.len(), 1);
        assert_eq!(bricks[0].size, BrickSize::new(1, 2, 3));
        assert!(bricks[0].variation < NUM_VARIATIONS);
        assert_eq!(bricks, brick_instances(&dict, &mut Rand32::new(0)));
    }
}
