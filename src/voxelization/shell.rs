use super::{adjust_values, Axes, ClassifiedGrid, InteriorSettings, Insideness};
use super::{ShellPolicy, ShellSettings, WorkerPool};
use crate::bricks::{Cell, SurfaceSample};
use crate::lattice::Lattice;
use crate::math::{Point, Real, Vector, DIM};
use crate::query::{Ray, SurfaceHit, SurfaceQuery};
use crate::utils::{CancelToken, Cancelled};

/// Slack added to the cell edge when testing whether a crossing lies within it.
const EDGE_TOLERANCE: Real = 1.0e-6;
/// Slack added to the skip bound, so a skipped cell never reaches the next crossing.
const SKIP_MARGIN: Real = 1.5e-4;

/// The outcome of the rays cast from one cell center.
struct Probe {
    inside: bool,
    crossings: usize,
    first_crossing: Option<Real>,
    /// Closest crossing within one cell edge, measured from the cell center.
    first: Option<SurfaceSample>,
    /// Farthest crossing within one cell edge, measured from the forward neighbor.
    last: Option<SurfaceSample>,
}

impl Probe {
    #[inline]
    fn edge_hit(&self) -> bool {
        self.first.is_some()
    }
}

/// One lattice row along a sweep axis, with the values it had before the sweep.
struct Row {
    start: [u32; 3],
    values: Vec<Real>,
    nearest: Vec<Option<SurfaceSample>>,
    casts: usize,
    skipped: usize,
}

/// Classifies every cell of `lattice` against a closed surface.
///
/// Rays are swept along each axis returned by [`ShellSettings::swept_axes`]. Rows of a sweep
/// are independent and run on `workers`. The cancellation token is polled before each row.
pub fn classify_surface<S: SurfaceQuery + ?Sized>(
    surface: &S,
    lattice: &Lattice,
    shell: &ShellSettings,
    interior: &InteriorSettings,
    workers: &WorkerPool,
    cancel: &CancelToken,
) -> Result<ClassifiedGrid, Cancelled> {
    let dims = lattice.dims();
    let mut values = vec![Cell::OUTSIDE; lattice.len()];
    let mut nearest: Vec<Option<SurfaceSample>> = vec![None; lattice.len()];
    let swept = shell.swept_axes();

    for axis in (0..DIM).filter(|a| swept.has(*a)) {
        let rows = gather_rows(lattice, axis, &values, &nearest);
        let num_rows = rows.len();
        let rows = workers.map(rows, |row| {
            if cancel.is_cancelled() {
                row
            } else {
                sweep_row(surface, lattice, shell, axis, row)
            }
        });
        cancel.check()?;

        let mut casts = 0;
        let mut skipped = 0;

        for row in rows {
            casts += row.casts;
            skipped += row.skipped;

            for (i, (value, sample)) in row.values.into_iter().zip(row.nearest).enumerate() {
                let mut index = row.start;
                index[axis] += i as u32;
                let id = lattice.linear_index(index);
                values[id] = value;
                nearest[id] = sample;
            }
        }

        log::debug!(
            "Swept axis {} over {} rows: {} probes cast, {} cells skipped.",
            axis,
            num_rows,
            casts,
            skipped
        );
    }

    Ok(adjust_values(values, nearest, dims, interior, swept))
}

fn gather_rows(
    lattice: &Lattice,
    axis: usize,
    values: &[Real],
    nearest: &[Option<SurfaceSample>],
) -> Vec<Row> {
    let dims = lattice.dims();
    let b = (axis + 1) % DIM;
    let c = (axis + 2) % DIM;
    let mut rows = Vec::with_capacity((dims[b] * dims[c]) as usize);

    for ic in 0..dims[c] {
        for ib in 0..dims[b] {
            let mut start = [0; 3];
            start[b] = ib;
            start[c] = ic;

            let mut row = Row {
                start,
                values: Vec::with_capacity(dims[axis] as usize),
                nearest: Vec::with_capacity(dims[axis] as usize),
                casts: 0,
                skipped: 0,
            };

            for i in 0..dims[axis] {
                let mut index = start;
                index[axis] = i;
                let id = lattice.linear_index(index);
                row.values.push(values[id]);
                row.nearest.push(nearest[id]);
            }

            rows.push(row);
        }
    }

    rows
}

fn sweep_row<S: SurfaceQuery + ?Sized>(
    surface: &S,
    lattice: &Lattice,
    settings: &ShellSettings,
    axis: usize,
    mut row: Row,
) -> Row {
    let len = row.values.len();
    let step = lattice.step()[axis];
    let mut misses = 0u32;
    let mut next_crossing: Option<Real> = None;
    let mut last_value = Cell::OUTSIDE;

    for i in 0..len {
        let mut index = row.start;
        index[axis] = i as u32;
        let point = lattice.cell_center(lattice.key_at(index));

        if let (Some(limit), Some(next)) = (settings.skip_after_misses, next_crossing) {
            if misses >= limit && point[axis] + step + SKIP_MARGIN < next {
                if row.values[i] == Cell::OUTSIDE {
                    row.values[i] = last_value;
                }

                if row.values[i] == last_value {
                    row.skipped += 1;
                    continue;
                }
            }
        }

        let probe = probe_cell(surface, &point, axis, step, settings);
        row.casts += 1;

        if probe.inside && row.values[i] == Cell::OUTSIDE {
            row.values[i] = Cell::UNCLASSIFIED_INTERIOR;
        }

        if probe.edge_hit() {
            let shell_here = match settings.policy {
                ShellPolicy::Inside | ShellPolicy::Consistent => probe.inside,
                ShellPolicy::Outside => !probe.inside,
            };

            if shell_here {
                row.values[i] = Cell::SHELL;
                keep_closest(&mut row.nearest[i], probe.first);
            } else if i + 1 < len {
                row.values[i + 1] = Cell::SHELL;
                keep_closest(&mut row.nearest[i + 1], probe.last);
            }
        }

        misses = if probe.edge_hit() {
            0
        } else {
            misses.saturating_add(1)
        };
        last_value = row.values[i];
        next_crossing = probe.first_crossing.map(|d| point[axis] + d);

        // Nothing left to cross on this row.
        if probe.crossings == 0 {
            break;
        }
    }

    row
}

fn keep_closest(slot: &mut Option<SurfaceSample>, candidate: Option<SurfaceSample>) {
    if let Some(candidate) = candidate {
        match slot {
            Some(current) if current.distance <= candidate.distance => {}
            _ => *slot = Some(candidate),
        }
    }
}

fn axis_dir(axis: usize) -> Vector<Real> {
    let mut dir = Vector::zeros();
    dir[axis] = 1.0;
    dir
}

fn sample(hit: &SurfaceHit, distance: Real) -> SurfaceSample {
    SurfaceSample {
        face_id: hit.face_id,
        point: hit.point,
        normal: hit.normal,
        distance,
    }
}

fn probe_cell<S: SurfaceQuery + ?Sized>(
    surface: &S,
    point: &Point<Real>,
    axis: usize,
    edge_len: Real,
    settings: &ShellSettings,
) -> Probe {
    let dir = axis_dir(axis);
    let hits = surface.cast_ray(&Ray::new(*point, dir));
    let within_edge = |hit: &&SurfaceHit| hit.distance <= edge_len + EDGE_TOLERANCE;

    let first = hits.first().filter(within_edge).map(|h| sample(h, h.distance));
    let last = hits
        .iter()
        .take_while(within_edge)
        .last()
        .map(|h| sample(h, edge_len - h.distance));

    let inside = if settings.policy == ShellPolicy::Consistent && first.is_some() {
        // The placement does not depend on insideness.
        false
    } else {
        vote_inside(surface, point, axis, &hits, settings)
    };

    Probe {
        inside,
        crossings: hits.len(),
        first_crossing: hits.first().map(|h| h.distance),
        first,
        last,
    }
}

/// Majority vote of the insideness rays. A tie counts as inside; no voter at all as outside.
fn vote_inside<S: SurfaceQuery + ?Sized>(
    surface: &S,
    point: &Point<Real>,
    axis: usize,
    primary_hits: &[SurfaceHit],
    settings: &ShellSettings,
) -> bool {
    let voters = match settings.insideness {
        Insideness::HighEfficiency => Axes::from_index(axis),
        Insideness::Axes(axes) => axes,
    };

    let mut total = 0;
    let mut inside = 0;

    for a in (0..DIM).filter(|a| voters.has(*a)) {
        let dir = axis_dir(a);
        let cast;
        let forward: &[SurfaceHit] = if a == axis {
            primary_hits
        } else {
            cast = surface.cast_ray(&Ray::new(*point, dir));
            &cast
        };

        let outside = parity_says_outside(forward, &dir, settings.use_normals) || {
            // Confirm with a ray in the opposite direction.
            let backward = surface.cast_ray(&Ray::new(*point, -dir));
            parity_says_outside(&backward, &-dir, settings.use_normals)
        };

        total += 1;

        if !outside {
            inside += 1;
        }
    }

    total > 0 && inside * 2 >= total
}

fn parity_says_outside(hits: &[SurfaceHit], dir: &Vector<Real>, use_normals: bool) -> bool {
    let leaves_first = hits.first().is_some_and(|h| h.normal.dot(dir) > 0.0);
    hits.len() % 2 == 0 && !(use_normals && leaves_first)
}
