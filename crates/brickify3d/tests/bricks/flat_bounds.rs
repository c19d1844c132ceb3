use brickify3d::bounding_volume::Aabb;
use brickify3d::lattice::{CellPitch, Lattice};
use brickify3d::math::Point;
use brickify3d::pipeline::{build_dictionary, BuildSettings, ModelContext, Source};
use brickify3d::query::{ResolvedMaterial, SurfaceQuery};
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;

fn flat_quad() -> TriangleSoup {
    let vertices = vec![
        Point::new(0.0, 0.0, 1.0),
        Point::new(3.0, 0.0, 1.0),
        Point::new(3.0, 2.0, 1.0),
        Point::new(0.0, 2.0, 1.0),
    ];
    TriangleSoup::new(vertices, vec![[0, 1, 2], [0, 2, 3]]).unwrap()
}

#[test]
fn flat_bounds_give_a_single_layer() {
    let soup = flat_quad();
    let lattice = Lattice::generate(&soup.aabb(), &CellPitch::cube(0.5), None);

    assert_eq!(lattice.dims()[2], 1);
    assert!(lattice.dims()[0] > 1 && lattice.dims()[1] > 1);
    assert_relative_eq!(lattice.cell_center(lattice.min_key()).z, 1.0);
}

#[test]
fn flat_sources_build_without_failing() {
    let soup = flat_quad();
    let settings = BuildSettings {
        brick_height: 0.6,
        ..BuildSettings::default()
    };
    let mut ctx = ModelContext::new(&settings, &soup.aabb(), None).unwrap();
    let resolver = |_: u32, _: &Point<f64>| ResolvedMaterial::Unknown;

    let dict =
        build_dictionary(Source::Surface(&soup), &mut ctx, &resolver, &CancelToken::new()).unwrap();
    assert_eq!(dict.check_partition(&ctx.table), Ok(()));
}
