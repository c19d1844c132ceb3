use brickify3d::bounding_volume::Aabb;
use brickify3d::math::Point;
use brickify3d::pipeline::{
    BrickCache, BuildError, BuildSettings, DirtyFlags, DurableStore, MemoryStore, ModelId,
    Source, UpdateAction, UpdateController,
};
use brickify3d::query::{MaterialRef, ResolvedMaterial};
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;

fn cube() -> TriangleSoup {
    TriangleSoup::from_aabb(&Aabb::new(Point::origin(), Point::new(3.0, 3.0, 2.4)))
}

fn settings() -> BuildSettings {
    BuildSettings {
        brick_height: 1.2,
        ..BuildSettings::default()
    }
}

fn unknown(_: u32, _: &Point<f64>) -> ResolvedMaterial {
    ResolvedMaterial::Unknown
}

#[test]
fn corrupt_entries_fall_back_to_a_rebuild() {
    let id = ModelId(7);
    let mut store = MemoryStore::new();
    store.write(id, "[1, 2, oops").unwrap();
    let mut controller = UpdateController::new(BrickCache::new(store, 2));
    let soup = cube();

    let action = controller
        .build(id, Source::Surface(&soup), &settings(), &unknown, &CancelToken::new())
        .unwrap();

    assert_eq!(action, UpdateAction::FullRebuild);
    let stored = controller.cache().store().read(id).unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&stored).is_ok());
}

#[test]
fn durable_entries_are_served_to_a_new_controller() {
    let id = ModelId(8);
    let soup = cube();
    let cancel = CancelToken::new();
    let mut first = UpdateController::new(BrickCache::new(MemoryStore::new(), 2));
    let _ = first
        .build(id, Source::Surface(&soup), &settings(), &unknown, &cancel)
        .unwrap();

    let store = first.cache().store().clone();
    let mut second = UpdateController::new(BrickCache::new(store, 2));
    let action = second
        .build(id, Source::Surface(&soup), &settings(), &unknown, &cancel)
        .unwrap();

    assert_eq!(action, UpdateAction::Cached);
    assert_eq!(second.dictionary(id), first.dictionary(id));
}

#[test]
fn material_changes_skip_the_merge() {
    let id = ModelId(9);
    let soup = cube();
    let cancel = CancelToken::new();
    let mut controller = UpdateController::new(BrickCache::new(MemoryStore::new(), 2));
    let mut settings = settings();
    let _ = controller
        .build(id, Source::Surface(&soup), &settings, &unknown, &cancel)
        .unwrap();
    let roots = controller.dictionary(id).unwrap().root_keys();

    let resolver = |_: u32, _: &Point<f64>| ResolvedMaterial::Material(MaterialRef(5));
    controller.mark_dirty(id, DirtyFlags::MATERIALS);
    let action = controller
        .build(id, Source::Surface(&soup), &settings, &resolver, &cancel)
        .unwrap();

    assert_eq!(action, UpdateAction::Rematerialize);
    let dict = controller.dictionary(id).unwrap();
    assert_eq!(dict.root_keys(), roots);
    let materials: Vec<_> = roots.iter().filter_map(|k| dict.get(k).unwrap().material).collect();
    assert!(!materials.is_empty());
    assert!(materials.iter().all(|m| *m == MaterialRef(5)));

    // A settings change is a full rebuild even without any flag.
    settings.merge.max_width = 1;
    let action = controller
        .build(id, Source::Surface(&soup), &settings, &resolver, &cancel)
        .unwrap();
    assert_eq!(action, UpdateAction::FullRebuild);
}

#[test]
fn cancelled_runs_leave_the_cache_untouched() {
    let id = ModelId(10);
    let soup = cube();
    let mut controller = UpdateController::new(BrickCache::new(MemoryStore::new(), 2));
    let _ = controller
        .build(id, Source::Surface(&soup), &settings(), &unknown, &CancelToken::new())
        .unwrap();
    let before = controller.cache().store().read(id).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    controller.mark_dirty(id, DirtyFlags::SOURCE_GEOMETRY);
    let result = controller.build(id, Source::Surface(&soup), &settings(), &unknown, &cancel);

    assert_eq!(result, Err(BuildError::Cancelled));
    assert_eq!(controller.cache().store().read(id).unwrap(), before);
}

#[test]
fn edits_go_through_the_controller() {
    let id = ModelId(11);
    let soup = cube();
    let cancel = CancelToken::new();
    let mut controller = UpdateController::new(BrickCache::new(MemoryStore::new(), 2));
    let _ = controller
        .build(id, Source::Surface(&soup), &settings(), &unknown, &cancel)
        .unwrap();

    let root = controller.dictionary(id).unwrap().root_keys()[0];
    controller.set_material(id, root, MaterialRef(2)).unwrap();
    let _ = controller.split_brick(id, root).unwrap();
    assert_eq!(
        controller.dictionary(id).unwrap().get(&root).unwrap().material,
        Some(MaterialRef(2))
    );

    let _ = controller.delete_cells(id, &[root]).unwrap();
    let action = controller
        .build(id, Source::Surface(&soup), &settings(), &unknown, &cancel)
        .unwrap();
    assert!(matches!(action, UpdateAction::Remerge(_)));
    assert!(!controller.dictionary(id).unwrap().get(&root).unwrap().draw);
}
