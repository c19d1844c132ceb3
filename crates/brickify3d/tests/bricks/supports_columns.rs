use brickify3d::bounding_volume::Aabb;
use brickify3d::bricks::{BrickFamily, Cell, CellKey, VoxelDictionary};
use brickify3d::math::Point;
use brickify3d::pipeline::{build_dictionary, BuildSettings, MaterialMode, ModelContext, Source};
use brickify3d::query::{MaterialRef, ResolvedMaterial, SurfaceQuery};
use brickify3d::shape::TriangleSoup;
use brickify3d::supports::{apply_supports, InternalSupports};
use brickify3d::utils::CancelToken;

#[test]
fn columns_every_other_cell() {
    let mut dict: VoxelDictionary = (0..5)
        .flat_map(|y| (0..5).map(move |x| (CellKey::new(x, y, 0), Cell::new(0.99))))
        .collect();
    let supports = InternalSupports::Columns {
        thickness: 1,
        step: 2,
    };

    let changed = apply_supports(&mut dict, &supports, false, 0.995, BrickFamily::Bricks);

    assert_eq!(changed.len(), 9);
    for (key, cell) in dict.iter() {
        assert_eq!(cell.draw, key.x % 2 == 0 && key.y % 2 == 0, "{}", key);
        assert!(!cell.is_claimed());
    }
}

#[test]
fn support_bricks_take_the_model_material() {
    let soup = TriangleSoup::from_aabb(&Aabb::new(Point::origin(), Point::new(8.0, 8.0, 7.2)));
    let resolver = |_: u32, _: &Point<f64>| ResolvedMaterial::Unknown;
    let palette = vec![MaterialRef(2), MaterialRef(3)];
    let modes = [
        MaterialMode::Uniform(MaterialRef(7)),
        MaterialMode::Random(palette.clone()),
    ];

    for materials in modes {
        let settings = BuildSettings {
            brick_height: 1.2,
            materials: materials.clone(),
            supports: InternalSupports::Columns {
                thickness: 1,
                step: 2,
            },
            ..BuildSettings::default()
        };
        let mut ctx = ModelContext::new(&settings, &soup.aabb(), None).unwrap();
        let dict = build_dictionary(Source::Surface(&soup), &mut ctx, &resolver, &CancelToken::new())
            .unwrap();

        assert!(dict.iter().any(|(_, c)| c.draw && c.is_internal()));

        for root in dict.root_keys() {
            let material = dict.get(&root).unwrap().material;

            match &materials {
                MaterialMode::Uniform(expected) => assert_eq!(material, Some(*expected), "{}", root),
                _ => assert!(material.is_some_and(|m| palette.contains(&m)), "{}", root),
            }
        }
    }
}
