use brickify3d::bricks::{BrickFamily, BrickSize, Cell, CellKey, LegalSizeTable, VoxelDictionary};
use brickify3d::merge::{merge_keys, MergeSettings};
use brickify3d::utils::CancelToken;

fn drawn_block(n: i32) -> VoxelDictionary {
    let mut dict = VoxelDictionary::new();

    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let mut cell = Cell::new(Cell::SHELL);
                cell.draw = true;
                let _ = dict.insert(CellKey::new(x, y, z), cell);
            }
        }
    }

    dict
}

fn merged_block(seed: u64) -> (VoxelDictionary, LegalSizeTable) {
    let table =
        LegalSizeTable::from_footprints(BrickFamily::Bricks, &[(1, 1), (1, 2), (2, 2)]).unwrap();
    let mut dict = drawn_block(4);
    let keys = dict.sorted_keys();
    let mut rng = oorandom::Rand32::new(seed);
    let num = merge_keys(
        &mut dict,
        &keys,
        &table,
        &MergeSettings::default(),
        &mut rng,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(num, dict.root_keys().len());
    (dict, table)
}

#[test]
fn cube_is_tiled_without_gaps_or_overlaps() {
    for seed in 0..8 {
        let (dict, table) = merged_block(seed);
        assert_eq!(dict.check_partition(&table), Ok(()));

        // Each layer of 16 cells is covered exactly.
        for z in 0..4 {
            let area: u32 = dict
                .root_keys()
                .into_iter()
                .filter(|k| k.z == z)
                .map(|k| dict.get(&k).unwrap().size.unwrap().area())
                .sum();
            assert_eq!(area, 16);
        }

        for root in dict.root_keys() {
            let size = dict.get(&root).unwrap().size.unwrap();
            assert!(table.contains(&size));
            assert!(size.x <= 2 && size.y <= 2);
        }
    }
}

#[test]
fn merging_twice_changes_nothing() {
    let (mut dict, table) = merged_block(3);
    let before = dict.clone();
    let keys = dict.sorted_keys();
    let num = merge_keys(
        &mut dict,
        &keys,
        &table,
        &MergeSettings::default(),
        &mut oorandom::Rand32::new(3),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(num, 0);
    assert_eq!(dict, before);
}

#[test]
fn prefer_largest_uses_the_biggest_footprints() {
    let table =
        LegalSizeTable::from_footprints(BrickFamily::Bricks, &[(1, 1), (1, 2), (2, 2)]).unwrap();
    let mut dict = drawn_block(2);
    let settings = MergeSettings {
        prefer_largest: true,
        ..MergeSettings::default()
    };
    let keys = vec![CellKey::new(0, 0, 0), CellKey::new(0, 0, 1)];
    let num = merge_keys(
        &mut dict,
        &keys,
        &table,
        &settings,
        &mut oorandom::Rand32::new(0),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(num, 2);
    for key in keys {
        assert_eq!(dict.get(&key).unwrap().size, Some(BrickSize::new(2, 2, 3)));
    }
    assert_eq!(dict.check_partition(&table), Ok(()));
}
