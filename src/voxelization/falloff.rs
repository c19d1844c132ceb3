use super::{grid_neighbor, Axes, ClassifiedGrid, InteriorSettings, FALLOFF_STEP, MAX_FALLOFF_RINGS};
use crate::bricks::{Cell, SurfaceSample};
use crate::math::{Real, DIM};

fn linear(dims: [u32; 3], index: [u32; 3]) -> usize {
    index[0] as usize + (index[1] as usize + index[2] as usize * dims[1] as usize) * dims[0] as usize
}

fn grid_index(dims: [u32; 3], linear: usize) -> [u32; 3] {
    let rx = dims[0] as usize;
    let ry = dims[1] as usize;
    [(linear % rx) as u32, ((linear / rx) % ry) as u32, (linear / (rx * ry)) as u32]
}

/// Turns raw classifier values into the final grid.
///
/// In order:
/// 1. unclassified interior cells touching the outside (or the lattice boundary) along an axis
///    that was not swept become shell,
/// 2. outside cells are dropped, and so are interior cells unless `calc_internals` is set,
/// 3. shell cells entirely enclosed by kept cells become interior,
/// 4. interior cells get a value decreasing by [`FALLOFF_STEP`] with each ring away from the
///    shell, for at most [`MAX_FALLOFF_RINGS`] rings. The first `material_shell_depth - 1`
///    rings inherit the surface sample of the ring they were reached from.
pub fn adjust_values(
    mut values: Vec<Real>,
    mut nearest: Vec<Option<SurfaceSample>>,
    dims: [u32; 3],
    interior: &InteriorSettings,
    swept: Axes,
) -> ClassifiedGrid {
    if swept != Axes::all() {
        seal_unswept_axes(&mut values, dims, swept);
    }

    let mut kept: Vec<Option<Real>> = values
        .iter()
        .map(|v| {
            let trashed = *v == Cell::OUTSIDE
                || (*v == Cell::UNCLASSIFIED_INTERIOR && !interior.calc_internals);
            (!trashed).then_some(*v)
        })
        .collect();

    if !interior.calc_internals {
        return ClassifiedGrid {
            values: kept,
            nearest,
            colors: None,
        };
    }

    let mut front = Vec::new();

    for id in 0..kept.len() {
        if kept[id] != Some(Cell::SHELL) {
            continue;
        }

        let index = grid_index(dims, id);
        let enclosed = (0..DIM).all(|axis| {
            [true, false].iter().all(|forward| {
                grid_neighbor(dims, index, axis, *forward)
                    .is_some_and(|n| kept[linear(dims, n)].is_some())
            })
        });

        if enclosed {
            kept[id] = Some(Cell::UNCLASSIFIED_INTERIOR);
        } else {
            front.push(id);
        }
    }

    let mut inherit_sample = true;

    for ring in 0..MAX_FALLOFF_RINGS {
        if front.is_empty() {
            break;
        }

        let value = 1.0 - (ring + 1) as Real * FALLOFF_STEP;
        inherit_sample = inherit_sample && ring + 1 < interior.material_shell_depth;
        let mut next_front = Vec::new();

        for id in front {
            let index = grid_index(dims, id);

            for axis in 0..DIM {
                for forward in [true, false] {
                    let Some(n) = grid_neighbor(dims, index, axis, forward) else {
                        continue;
                    };
                    let nid = linear(dims, n);

                    if kept[nid] == Some(Cell::UNCLASSIFIED_INTERIOR) {
                        kept[nid] = Some(value);

                        if inherit_sample {
                            nearest[nid] = nearest[id];
                        }

                        next_front.push(nid);
                    }
                }
            }
        }

        front = next_front;
    }

    ClassifiedGrid {
        values: kept,
        nearest,
        colors: None,
    }
}

fn seal_unswept_axes(values: &mut [Real], dims: [u32; 3], swept: Axes) {
    let snapshot = values.to_vec();

    for (id, value) in values.iter_mut().enumerate() {
        if *value != Cell::UNCLASSIFIED_INTERIOR {
            continue;
        }

        let index = grid_index(dims, id);
        let open = (0..DIM).filter(|a| !swept.has(*a)).any(|axis| {
            [true, false].iter().any(|forward| {
                grid_neighbor(dims, index, axis, *forward)
                    .map_or(true, |n| snapshot[linear(dims, n)] == Cell::OUTSIDE)
            })
        });

        if open {
            *value = Cell::SHELL;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // A 5x5x5 block: outside border, shell at depth 1, interior beyond.
    fn block() -> (Vec<Real>, [u32; 3]) {
        let dims = [7, 7, 7];
        let values = (0..343)
            .map(|id| {
                let index = grid_index(dims, id);
                let depth = index.iter().map(|i| (*i).min(6 - *i)).min().unwrap_or(0);
                match depth {
                    0 => Cell::OUTSIDE,
                    1 => Cell::SHELL,
                    _ => Cell::UNCLASSIFIED_INTERIOR,
                }
            })
            .collect();
        (values, dims)
    }

    #[test]
    fn falloff_rings() {
        let (values, dims) = block();
        let grid = adjust_values(
            values,
            vec![None; 343],
            dims,
            &InteriorSettings::default(),
            Axes::all(),
        );

        assert_eq!(grid.values[linear(dims, [0, 0, 0])], None);
        assert_eq!(grid.values[linear(dims, [1, 3, 3])], Some(1.0));
        assert_relative_eq!(grid.values[linear(dims, [2, 3, 3])].unwrap(), 0.99);
        assert_relative_eq!(grid.values[linear(dims, [3, 3, 3])].unwrap(), 0.98);
        assert_eq!(grid.num_kept(), 125);
    }

    #[test]
    fn interior_dropped_without_internals() {
        let (values, dims) = block();
        let interior = InteriorSettings {
            calc_internals: false,
            ..InteriorSettings::default()
        };
        let grid = adjust_values(values, vec![None; 343], dims, &interior, Axes::all());
        assert_eq!(grid.num_kept(), 125 - 27);
        assert_eq!(grid.values[linear(dims, [3, 3, 3])], None);
    }

    #[test]
    fn enclosed_shell_becomes_interior() {
        let dims = [3, 3, 3];
        let mut values = vec![Cell::SHELL; 27];
        values[linear(dims, [0, 0, 0])] = Cell::OUTSIDE;
        let grid = adjust_values(values, vec![None; 27], dims, &InteriorSettings::default(), Axes::all());

        // The center is enclosed, and reached by the first ring.
        assert_relative_eq!(grid.values[linear(dims, [1, 1, 1])].unwrap(), 0.99);
        assert_eq!(grid.values[linear(dims, [2, 1, 1])], Some(1.0));
    }

    #[test]
    fn samples_inherited_by_material_rings() {
        let (values, dims) = block();
        let mut nearest = vec![None; 343];
        let sample = SurfaceSample {
            face_id: 7,
            point: crate::math::Point::origin(),
            normal: crate::math::Vector::x(),
            distance: 0.5,
        };
        nearest[linear(dims, [1, 3, 3])] = Some(sample);

        let interior = InteriorSettings {
            material_shell_depth: 2,
            ..InteriorSettings::default()
        };
        let grid = adjust_values(values, nearest, dims, &interior, Axes::all());
        assert_eq!(grid.nearest[linear(dims, [2, 3, 3])], Some(sample));
        assert_eq!(grid.nearest[linear(dims, [3, 3, 3])], None);
    }

    #[test]
    fn sealing_open_axis() {
        // A 1x1x3 column of interior cells, z not swept.
        let dims = [1, 1, 3];
        let values = vec![Cell::UNCLASSIFIED_INTERIOR; 3];
        let grid = adjust_values(
            values,
            vec![None; 3],
            dims,
            &InteriorSettings::default(),
            Axes::X | Axes::Y,
        );

        assert_eq!(grid.values[0], Some(1.0));
        assert_eq!(grid.values[2], Some(1.0));
        // The middle cell is only open along x and y, which were swept.
        assert_relative_eq!(grid.values[1].unwrap(), 0.99);
    }
}
