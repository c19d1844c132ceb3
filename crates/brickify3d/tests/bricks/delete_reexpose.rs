use brickify3d::bounding_volume::Aabb;
use brickify3d::bricks::{BrickFamily, BrickSize, Cell, CellKey, LegalSizeTable, VoxelDictionary};
use brickify3d::math::Point;
use brickify3d::pipeline::{
    edit, BrickCache, BuildSettings, MemoryStore, ModelId, Source, UpdateAction, UpdateController,
};
use brickify3d::query::ResolvedMaterial;
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;
use std::collections::BTreeSet;

// A 3x3x2 slab: a drawn top layer over an undrawn interior layer.
fn slab() -> VoxelDictionary {
    let mut dict = VoxelDictionary::new();

    for y in 0..3 {
        for x in 0..3 {
            let _ = dict.insert(CellKey::new(x, y, 0), Cell::new(0.99));
            let mut top = Cell::new(Cell::SHELL);
            top.draw = true;
            top.make_root(BrickSize::unit(3));
            let _ = dict.insert(CellKey::new(x, y, 1), top);
        }
    }

    dict
}

#[test]
fn deleting_a_cell_exposes_the_cells_behind_it() {
    let mut dict = slab();
    let deleted = CellKey::new(1, 1, 1);
    let below = CellKey::new(1, 1, 0);

    let affected = edit::delete_cells(&mut dict, &[deleted], BrickFamily::Bricks, true);

    let cell = dict.get(&below).unwrap();
    assert_eq!(cell.value, Cell::SHELL);
    assert!(cell.draw);
    assert!(cell.is_root());
    assert!(cell.top_exposed);
    assert!(affected.contains(&below));
    assert!(dict.get(&deleted).unwrap().is_outside());
    assert_eq!(
        dict.check_partition(&LegalSizeTable::standard(BrickFamily::Bricks)),
        Ok(())
    );
}

#[test]
fn deleting_without_auto_update_leaves_neighbors_alone() {
    let mut dict = slab();
    let _ = edit::delete_cells(&mut dict, &[CellKey::new(1, 1, 1)], BrickFamily::Bricks, false);

    let cell = dict.get(&CellKey::new(1, 1, 0)).unwrap();
    assert!(!cell.draw);
    assert!(cell.is_internal());
}

#[test]
fn rebuild_after_delete_keeps_distant_bricks() {
    let id = ModelId(1);
    let soup = TriangleSoup::from_aabb(&Aabb::new(Point::origin(), Point::new(6.0, 6.0, 3.6)));
    let settings = BuildSettings {
        brick_height: 1.2,
        ..BuildSettings::default()
    };
    let resolver = |_: u32, _: &Point<f64>| ResolvedMaterial::Unknown;
    let cancel = CancelToken::new();
    let mut controller = UpdateController::new(BrickCache::new(MemoryStore::new(), 2));
    let _ = controller
        .build(id, Source::Surface(&soup), &settings, &resolver, &cancel)
        .unwrap();

    let before = controller.dictionary(id).unwrap().clone();
    let top = before.iter().map(|(k, _)| k.z).max().unwrap();
    let deleted = before
        .root_keys()
        .into_iter()
        .filter(|k| k.z == top)
        .nth(3)
        .unwrap();

    // Bricks covering the deleted cell or one of its neighbors may be merged again.
    let touched: BTreeSet<CellKey> = std::iter::once(deleted)
        .chain(deleted.neighbors())
        .filter_map(|k| before.root_of(&k))
        .collect();

    let _ = controller.delete_cells(id, &[deleted]).unwrap();
    let action = controller
        .build(id, Source::Surface(&soup), &settings, &resolver, &cancel)
        .unwrap();
    assert!(matches!(action, UpdateAction::Remerge(_)));

    let after = controller.dictionary(id).unwrap();
    let table = settings.legal_size_table().unwrap();
    assert_eq!(after.check_partition(&table), Ok(()));

    let mut num_checked = 0;
    for (key, cell) in before.iter() {
        let Some(root) = before.root_of(key) else {
            continue;
        };

        if touched.contains(&root) {
            continue;
        }

        let now = after.get(key).unwrap();
        assert_eq!(now.parent, cell.parent, "{}", key);
        assert_eq!(now.size, cell.size, "{}", key);
        num_checked += 1;
    }

    assert!(num_checked > 0);
}
