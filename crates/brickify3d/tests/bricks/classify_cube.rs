use brickify3d::bounding_volume::Aabb;
use brickify3d::bricks::Cell;
use brickify3d::lattice::{CellPitch, Lattice};
use brickify3d::math::Point;
use brickify3d::shape::TriangleSoup;
use brickify3d::utils::CancelToken;
use brickify3d::voxelization::{
    classify_surface, Axes, Insideness, InteriorSettings, ShellSettings, WorkerPool,
};

fn classify(settings: &ShellSettings) -> Vec<Option<f64>> {
    let bounds = Aabb::new(Point::new(-1.0, -1.0, -1.0), Point::new(5.0, 3.0, 3.0));
    let soup = TriangleSoup::from_aabb(&bounds);
    let lattice = Lattice::generate(&bounds, &CellPitch::cube(1.0), None);

    classify_surface(
        &soup,
        &lattice,
        settings,
        &InteriorSettings::default(),
        &WorkerPool::new(Some(2)),
        &CancelToken::new(),
    )
    .unwrap()
    .values
}

#[test]
fn box_shell_and_interior_counts() {
    let values = classify(&ShellSettings::default());
    let shell = values.iter().filter(|v| **v == Some(Cell::SHELL)).count();
    let interior = values
        .iter()
        .filter(|v| v.is_some_and(|v| v < Cell::SHELL))
        .count();

    // A 6x4x4 box of cells, with a 4x2x2 core.
    assert_eq!(shell + interior, 6 * 4 * 4);
    assert_eq!(interior, 4 * 2 * 2);
}

#[test]
fn insideness_strategies_agree_on_a_box() {
    let reference = classify(&ShellSettings::default());

    for insideness in [Insideness::Axes(Axes::all()), Insideness::Axes(Axes::Z)] {
        let settings = ShellSettings {
            insideness,
            skip_after_misses: None,
            ..ShellSettings::default()
        };
        assert_eq!(classify(&settings), reference);
    }
}
