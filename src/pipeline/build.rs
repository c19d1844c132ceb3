use super::{BuildError, MaterialMode, ModelContext};
use crate::bounding_volume::Aabb;
use crate::bricks::{BrickFamily, Cell, CellKey, VoxelDictionary};
use crate::exposure::update_all_exposure;
use crate::math::Vector;
use crate::math::Real;
use crate::merge;
use crate::query::{MaterialRef, MaterialResolver, ResolvedMaterial, SurfaceQuery, VolumetricField};
use crate::supports::apply_supports;
use crate::utils::CancelToken;
use crate::voxelization::{classify_surface, classify_volume, ClassifiedGrid, WorkerPool};
use oorandom::Rand32;

/// The geometry a model is built from.
#[derive(Copy, Clone)]
pub enum Source<'a> {
    /// A closed surface queried by ray casts.
    Surface(&'a dyn SurfaceQuery),
    /// A volumetric field spanning `bounds`.
    Volume {
        /// The field.
        field: &'a dyn VolumetricField,
        /// The world-space region covered by the field.
        bounds: Aabb,
    },
}

impl Source<'_> {
    /// The world-space bounds of the source.
    pub fn bounds(&self) -> Aabb {
        match self {
            Source::Surface(surface) => surface.aabb(),
            Source::Volume { bounds, .. } => *bounds,
        }
    }
}

/// Orientation of a slope facing along `normal`, as `(flipped, rotated)`.
fn slope_orientation(normal: &Vector<Real>) -> (bool, bool) {
    if normal.x.abs() >= normal.y.abs() {
        (normal.x < 0.0, false)
    } else {
        (normal.y < 0.0, true)
    }
}

/// Builds the dictionary records of every kept cell of `grid`.
pub fn dictionary_from_grid(grid: &ClassifiedGrid, ctx: &ModelContext) -> VoxelDictionary {
    let threshold = ctx.settings.interior.draw_threshold();
    let kind = ctx.settings.brick_kind;
    let lattice = &ctx.lattice;
    let mut dict = VoxelDictionary::new();

    for (id, value) in grid.values.iter().enumerate() {
        let Some(value) = *value else {
            continue;
        };

        let mut cell = Cell::new(value);
        cell.draw = value >= threshold;
        cell.near_surface = grid.nearest[id];
        cell.color = grid.colors.as_ref().map(|colors| colors[id]);
        cell.kind = kind;

        if let Some(sample) = cell.near_surface.filter(|_| kind.is_slope()) {
            (cell.flipped, cell.rotated) = slope_orientation(&sample.normal);
        }

        let _ = dict.insert(lattice.key_at(lattice.grid_index(id)), cell);
    }

    dict
}

/// Resolves the material of every cell carrying a surface sample, before the merge.
///
/// Only [`MaterialMode::Source`] and [`MaterialMode::Uniform`] are resolved per cell; random
/// materials are picked per brick once the merge is done. Uniform materials are set on every
/// cell, drawn or not, since supports may start drawing interior cells later.
pub fn resolve_cell_materials(
    dict: &mut VoxelDictionary,
    mode: &MaterialMode,
    resolver: &dyn MaterialResolver,
) {
    for (_, cell) in dict.iter_mut() {
        match mode {
            MaterialMode::Source => {
                if let Some(sample) = cell.near_surface {
                    match resolver.resolve(sample.face_id, &sample.point) {
                        ResolvedMaterial::Material(material) => cell.material = Some(material),
                        ResolvedMaterial::Color(color) => cell.color = Some(color),
                        ResolvedMaterial::Unknown => {}
                    }
                }
            }
            MaterialMode::Uniform(material) => cell.material = Some(*material),
            MaterialMode::Random(_) => {}
        }
    }
}

/// Assigns a material to every brick, and propagates it to the brick's cells.
///
/// With [`MaterialMode::Source`], a brick takes the material resolved at the first sample found
/// in its footprint (root first).
pub fn resolve_brick_materials(
    dict: &mut VoxelDictionary,
    mode: &MaterialMode,
    family: BrickFamily,
    resolver: &dyn MaterialResolver,
    rng: &mut Rand32,
) {
    for root in dict.root_keys() {
        let keys = dict.brick_keys(root, family);

        let material = match mode {
            MaterialMode::Uniform(material) => Some(*material),
            MaterialMode::Random(palette) if !palette.is_empty() => {
                Some(palette[rng.rand_range(0..palette.len() as u32) as usize])
            }
            MaterialMode::Random(_) => None,
            MaterialMode::Source => keys
                .iter()
                .filter_map(|k| dict.get(k).and_then(|c| c.near_surface))
                .find_map(|sample| match resolver.resolve(sample.face_id, &sample.point) {
                    ResolvedMaterial::Material(material) => Some(material),
                    _ => None,
                }),
        };

        if let Some(material) = material {
            set_materials(dict, &keys, material);
        }
    }
}

fn set_materials(dict: &mut VoxelDictionary, keys: &[CellKey], material: MaterialRef) {
    for key in keys {
        if let Some(cell) = dict.get_mut(key) {
            cell.material = Some(material);
        }
    }
}

/// Runs the whole pipeline: classification, materials, supports, merge and exposure.
pub fn build_dictionary(
    source: Source,
    ctx: &mut ModelContext,
    resolver: &dyn MaterialResolver,
    cancel: &CancelToken,
) -> Result<VoxelDictionary, BuildError> {
    let settings = ctx.settings;
    let family = settings.family;

    log::info!(
        "Classifying a lattice of {:?} cells ({} total).",
        ctx.lattice.dims(),
        ctx.lattice.len()
    );

    let grid = match source {
        Source::Surface(surface) => {
            let workers = WorkerPool::new(settings.worker_threads);
            classify_surface(
                surface,
                &ctx.lattice,
                &settings.shell,
                &settings.interior,
                &workers,
                cancel,
            )?
        }
        Source::Volume { field, .. } => classify_volume(
            field,
            &ctx.lattice,
            &settings.smoke,
            &settings.interior,
            cancel,
        )?,
    };

    let mut dict = dictionary_from_grid(&grid, ctx);
    log::info!("Classified {} cells.", dict.len());

    resolve_cell_materials(&mut dict, &settings.materials, resolver);
    // Every support cell is among the keys merged below.
    let _supported = apply_supports(
        &mut dict,
        &settings.supports,
        false,
        settings.interior.draw_threshold(),
        family,
    );

    let keys = dict.sorted_keys();
    let num_bricks = merge::merge(
        &mut dict,
        &keys,
        &ctx.table,
        &settings.merge,
        &mut ctx.rng.merge,
        cancel,
    )?;

    if matches!(settings.materials, MaterialMode::Uniform(_) | MaterialMode::Random(_)) {
        resolve_brick_materials(
            &mut dict,
            &settings.materials,
            family,
            resolver,
            &mut ctx.rng.material,
        );
    }

    update_all_exposure(&mut dict, family);
    log::info!("Merged the model into {} bricks.", num_bricks);
    Ok(dict)
}
