use brickify3d::bounding_volume::Aabb;
use brickify3d::bricks::VoxelDictionary;
use brickify3d::math::Point;
use brickify3d::pipeline::{build_dictionary, BuildSettings, CachedModel, ModelContext, Source};
use brickify3d::query::{MaterialRef, PerFaceMaterials, SurfaceQuery};
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;
use std::collections::BTreeMap;

fn built() -> VoxelDictionary {
    let settings = BuildSettings {
        brick_height: 0.7,
        ..BuildSettings::default()
    };
    let soup = TriangleSoup::from_aabb(&Aabb::new(
        Point::new(0.1, 0.2, 0.3),
        Point::new(3.3, 2.9, 2.45),
    ));
    let mut ctx = ModelContext::new(&settings, &soup.aabb(), None).unwrap();
    let resolver = PerFaceMaterials {
        materials: (0..12).map(MaterialRef).collect(),
    };

    build_dictionary(Source::Surface(&soup), &mut ctx, &resolver, &CancelToken::new()).unwrap()
}

#[test]
fn dictionaries_survive_a_json_round_trip() {
    let dict = built();
    let text = serde_json::to_string(&dict).unwrap();
    let back: VoxelDictionary = serde_json::from_str(&text).unwrap();

    assert_eq!(back, dict);
}

#[test]
fn animated_entries_survive_a_json_round_trip() {
    let dict = built();
    let frames: BTreeMap<u32, VoxelDictionary> = [(0, dict.clone()), (12, dict)].into_iter().collect();
    let entry = CachedModel::Animated(frames);
    let text = serde_json::to_string(&entry).unwrap();

    assert_eq!(serde_json::from_str::<CachedModel>(&text).unwrap(), entry);
}
