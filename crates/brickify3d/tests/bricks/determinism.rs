use brickify3d::bounding_volume::Aabb;
use brickify3d::math::Point;
use brickify3d::merge::{VariationSearch, VariationPolicy};
use brickify3d::pipeline::{
    brick_instances, build_dictionary, BuildSettings, MaterialMode, ModelContext, Source,
};
use brickify3d::query::{MaterialRef, ResolvedMaterial, SurfaceQuery};
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;

fn build_json(settings: &BuildSettings) -> String {
    let soup = TriangleSoup::from_aabb(&Aabb::new(Point::origin(), Point::new(6.0, 5.0, 3.6)));
    let mut ctx = ModelContext::new(settings, &soup.aabb(), None).unwrap();
    let resolver = |_: u32, _: &Point<f64>| ResolvedMaterial::Unknown;
    let dict =
        build_dictionary(Source::Surface(&soup), &mut ctx, &resolver, &CancelToken::new()).unwrap();
    let bricks = brick_instances(&dict, &mut ctx.rng.feature);

    serde_json::to_string(&(dict, bricks)).unwrap()
}

#[test]
fn same_seeds_give_identical_models() {
    let mut settings = BuildSettings {
        brick_height: 1.2,
        materials: MaterialMode::Random(vec![MaterialRef(1), MaterialRef(2), MaterialRef(3)]),
        ..BuildSettings::default()
    };
    settings.seeds.merge = 42;
    settings.seeds.material = 7;

    assert_eq!(build_json(&settings), build_json(&settings));

    settings.merge.variation = Some(VariationSearch {
        passes: 3,
        policy: VariationPolicy::Highest,
    });
    assert_eq!(build_json(&settings), build_json(&settings));
}

#[test]
fn worker_count_does_not_change_the_result() {
    let settings = BuildSettings {
        brick_height: 1.2,
        worker_threads: Some(1),
        ..BuildSettings::default()
    };
    let parallel = BuildSettings {
        worker_threads: Some(4),
        ..settings.clone()
    };

    assert_eq!(build_json(&settings), build_json(&parallel));
}
