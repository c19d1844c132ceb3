use super::{adjust_values, Axes, ClassifiedGrid, InteriorSettings};
use crate::bricks::Cell;
use crate::lattice::Lattice;
use crate::math::{Real, DIM};
use crate::query::VolumetricField;
use crate::utils::{CancelToken, Cancelled};
use na::{Matrix3, Vector3};

/// Relative luminance of the red, green and blue channels.
const LUMINANCE: [Real; 3] = [0.3086, 0.6094, 0.0820];

/// Settings of the volumetric classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeSettings {
    /// Maximum number of field voxels sampled per cell and per axis.
    pub quality: u32,
    /// Cells whose averaged `density + flame` is below `1 - density` are outside.
    pub density: Real,
    /// `1` leaves the colors untouched; every unit above adds `0.2` to each channel.
    pub brightness: Real,
    /// `0` turns the colors to gray, `1` leaves them untouched.
    pub saturation: Real,
    /// Weight of the flame color.
    pub flame_intensity: Real,
    /// RGB color of the flames.
    pub flame_color: [Real; 3],
}

impl Default for SmokeSettings {
    fn default() -> Self {
        SmokeSettings {
            quality: 1,
            density: 0.5,
            brightness: 1.0,
            saturation: 1.0,
            flame_intensity: 1.0,
            flame_color: [1.0, 0.63, 0.2],
        }
    }
}

impl SmokeSettings {
    fn saturation_matrix(&self) -> Matrix3<Real> {
        let s = self.saturation;
        Vector3::repeat(1.0 - s) * Vector3::from(LUMINANCE).transpose() + Matrix3::identity() * s
    }
}

/// Classifies every cell of `lattice` by averaging the field voxels it covers.
///
/// The field spans the whole lattice, or the part of it given by the field's
/// [`AdaptiveDomain`](crate::query::AdaptiveDomain). The resulting grid always carries colors.
pub fn classify_volume<F: VolumetricField + ?Sized>(
    field: &F,
    lattice: &Lattice,
    settings: &SmokeSettings,
    interior: &InteriorSettings,
    cancel: &CancelToken,
) -> Result<ClassifiedGrid, Cancelled> {
    let dims = lattice.dims();
    let res = field.resolution();
    let mut values = vec![Cell::OUTSIDE; lattice.len()];
    let mut colors = vec![[0.0; 4]; lattice.len()];

    let empty = |values: Vec<Real>, colors: Vec<[Real; 4]>| ClassifiedGrid {
        values: values.into_iter().map(|_| None).collect(),
        nearest: vec![None; lattice.len()],
        colors: Some(colors),
    };

    let (start, end) = match field.adaptive_domain() {
        Some(domain) => {
            let full = domain.full.extents();

            if (0..DIM).any(|a| full[a] == 0.0) {
                return Ok(empty(values, colors));
            }

            let mut start = [0.0; 3];
            let mut end = [0.0; 3];

            for a in 0..DIM {
                start[a] = dims[a] as Real * (domain.active.mins[a] - domain.full.mins[a]) / full[a];
                end[a] = dims[a] as Real * (domain.active.maxs[a] - domain.full.mins[a]) / full[a];
            }

            (start, end)
        }
        None => ([0.0; 3], dims.map(|d| d as Real)),
    };

    let span = [end[0] - start[0], end[1] - start[1], end[2] - start[2]];

    if span.iter().any(|s| *s <= 0.0) || res.contains(&0) {
        return Ok(empty(values, colors));
    }

    let first = start.map(|s| (s.floor().max(0.0)) as u32);
    let last = [0, 1, 2].map(|a| (end[a].floor().max(0.0) as u32).min(dims[a]));
    let voxels_per_cell = [0, 1, 2].map(|a| res[a] as Real / span[a]);
    let quality = settings.quality.max(1);
    let brightness = (settings.brightness - 1.0) / 5.0;
    let saturation = settings.saturation_matrix();
    let flame_color = Vector3::from(settings.flame_color);

    for z in first[2]..last[2] {
        cancel.check()?;

        for y in first[1]..last[1] {
            for x in first[0]..last[0] {
                let index = [x, y, z];
                let mut ranges = [(0u32, 0u32, 1u32); 3];

                for a in 0..DIM {
                    let rel = index[a] as Real - start[a];
                    let lo = ((voxels_per_cell[a] * rel).floor().max(0.0) as u32).min(res[a] - 1);
                    let mut hi = ((voxels_per_cell[a] * (rel + 1.0)).floor().max(0.0) as u32).min(res[a]);

                    if hi <= lo {
                        hi = lo + 1;
                    }

                    let stride = (hi - lo).div_ceil(quality).max(1);
                    ranges[a] = (lo, hi, stride);
                }

                let mut density = 0.0;
                let mut flame = 0.0;
                let mut smoke_acc = Vector3::zeros();
                let mut flame_acc = Vector3::zeros();
                let mut n = 0.0;

                for fz in (ranges[2].0..ranges[2].1).step_by(ranges[2].2 as usize) {
                    for fy in (ranges[1].0..ranges[1].1).step_by(ranges[1].2 as usize) {
                        for fx in (ranges[0].0..ranges[0].1).step_by(ranges[0].2 as usize) {
                            let sample = field.sample([fx, fy, fz]);
                            density += sample.density;
                            flame += sample.flame;
                            smoke_acc += Vector3::from(sample.color) * sample.density;
                            flame_acc += flame_color
                                * (sample.flame * settings.flame_intensity * sample.flame);
                            n += 1.0;
                        }
                    }
                }

                let d_ave = density / n;
                let f_ave = flame / n;
                let alpha = d_ave + f_ave;
                let smoke_color = smoke_acc / (n * if d_ave != 0.0 { d_ave } else { 1.0 });
                let flame_part = flame_acc / (n * if f_ave != 0.0 { f_ave } else { 1.0 });
                let color = saturation * (smoke_color + flame_part).add_scalar(brightness);

                let id = lattice.linear_index(index);
                values[id] = if alpha < 1.0 - settings.density {
                    Cell::OUTSIDE
                } else {
                    Cell::SHELL
                };
                colors[id] = [color.x, color.y, color.z, alpha];
            }
        }
    }

    let mut grid = adjust_values(values, vec![None; lattice.len()], dims, interior, Axes::all());
    log::debug!("Volumetric field kept {} of {} cells.", grid.num_kept(), lattice.len());
    grid.colors = Some(colors);
    Ok(grid)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::Aabb;
    use crate::lattice::CellPitch;
    use crate::math::Point;
    use crate::query::{AdaptiveDomain, DenseField, FieldSample};

    fn lattice() -> Lattice {
        let bounds = Aabb::new(Point::origin(), Point::new(2.0, 2.0, 2.0));
        Lattice::generate(&bounds, &CellPitch::cube(1.0), None)
    }

    #[test]
    fn dense_voxels_become_shell() {
        let lattice = lattice();
        let dims = lattice.dims();
        // One voxel per cell: a dense blob at the center of the lattice.
        let field = DenseField::from_fn(dims, |[x, y, z]| {
            let dense = (1..3).contains(&x) && (1..3).contains(&y) && (1..3).contains(&z);
            FieldSample {
                density: if dense { 0.9 } else { 0.1 },
                flame: 0.0,
                color: [1.0, 0.0, 0.0],
            }
        });

        let grid = classify_volume(
            &field,
            &lattice,
            &SmokeSettings::default(),
            &InteriorSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(grid.num_kept(), 8);
        let id = lattice.linear_index([1, 1, 1]);
        assert_eq!(grid.values[id], Some(1.0));
        let colors = grid.colors.unwrap();
        assert_relative_eq!(colors[id][0], 1.0);
        assert_relative_eq!(colors[id][1], 0.0);
        assert_relative_eq!(colors[id][3], 0.9);
    }

    #[test]
    fn zero_saturation_is_gray() {
        let settings = SmokeSettings {
            saturation: 0.0,
            ..SmokeSettings::default()
        };
        let gray = settings.saturation_matrix() * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(gray, Vector3::repeat(0.3086));
    }

    #[test]
    fn flat_adaptive_domain_is_empty() {
        let lattice = lattice();
        let flat = Aabb::new(Point::origin(), Point::new(2.0, 2.0, 0.0));
        let field = DenseField::from_fn([4, 4, 4], |_| FieldSample {
            density: 1.0,
            ..FieldSample::default()
        })
        .with_adaptive_domain(AdaptiveDomain {
            full: flat,
            active: flat,
        });

        let grid = classify_volume(
            &field,
            &lattice,
            &SmokeSettings::default(),
            &InteriorSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(grid.num_kept(), 0);
    }

    #[test]
    fn adaptive_domain_maps_onto_a_sub_range() {
        let lattice = lattice();
        let full = lattice.aabb();
        // The active domain is the upper half of the lattice along x.
        let mut active = full;
        active.mins.x = full.center().x;
        let field = DenseField::from_fn([2, 4, 4], |_| FieldSample {
            density: 1.0,
            ..FieldSample::default()
        })
        .with_adaptive_domain(AdaptiveDomain { full, active });

        let grid = classify_volume(
            &field,
            &lattice,
            &SmokeSettings::default(),
            &InteriorSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(grid.values[lattice.linear_index([0, 0, 0])], None);
        assert_eq!(grid.values[lattice.linear_index([3, 0, 0])], Some(1.0));
        assert_eq!(grid.num_kept(), 2 * 4 * 4);
    }
}
