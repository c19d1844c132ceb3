use super::build::{build_dictionary, resolve_brick_materials, Source};
use super::cache::{BrickCache, DurableStore};
use super::context::{ModelContext, RandomStreams};
use super::{edit, BuildError, BuildSettings, EditError, ModelId};
use crate::bricks::{BrickFamily, BrickSize, CellKey, LegalSizeTable, VoxelDictionary};
use crate::exposure::update_exposure_around;
use crate::math::{Point, Real};
use crate::merge;
use crate::query::{MaterialRef, MaterialResolver};
use crate::utils::{CancelToken, Cancelled, HashMap};
use alloc::collections::BTreeSet;
use oorandom::Rand32;

/// Which inputs of a model changed since its last successful build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirtyFlags(u8);

bitflags::bitflags! {
    impl DirtyFlags: u8 {
        /// The source surface or field changed.
        const SOURCE_GEOMETRY = 1 << 0;
        /// The build settings changed.
        const BUILD_SETTINGS = 1 << 1;
        /// Only the materials changed.
        const MATERIALS = 1 << 2;
        /// Some cells were edited and their neighborhood must be merged again.
        const TOPOLOGY = 1 << 3;
    }
}

/// The work done by [`UpdateController::build`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateAction {
    /// The model was classified and merged from scratch.
    FullRebuild,
    /// The neighborhood of the edited cells was merged again, creating this many bricks.
    Remerge(usize),
    /// Only the brick materials were resolved again.
    Rematerialize,
    /// The cached dictionary was served as is.
    Cached,
}

#[derive(Default)]
struct ModelState {
    dirty: DirtyFlags,
    pending: BTreeSet<CellKey>,
    settings: Option<BuildSettings>,
    anchor: Option<Point<Real>>,
    dict: Option<VoxelDictionary>,
}

/// Decides, per model, between a full rebuild, a local re-merge, or serving the cache.
///
/// The controller exclusively owns the working dictionary of every model it built. A run that
/// fails or is cancelled leaves both the working dictionary and the cache untouched.
pub struct UpdateController<S: DurableStore> {
    cache: BrickCache<S>,
    models: HashMap<ModelId, ModelState>,
}

impl<S: DurableStore> UpdateController<S> {
    /// A controller backed by `cache`.
    pub fn new(cache: BrickCache<S>) -> Self {
        UpdateController {
            cache,
            models: HashMap::default(),
        }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &BrickCache<S> {
        &self.cache
    }

    /// The underlying cache, mutably.
    pub fn cache_mut(&mut self) -> &mut BrickCache<S> {
        &mut self.cache
    }

    /// Flags inputs of `id` as changed.
    pub fn mark_dirty(&mut self, id: ModelId, flags: DirtyFlags) {
        self.models.entry(id).or_default().dirty |= flags;
    }

    /// The pending dirty flags of `id`.
    pub fn dirty(&self, id: ModelId) -> DirtyFlags {
        self.models.get(&id).map(|s| s.dirty).unwrap_or_default()
    }

    /// The working dictionary of `id`, once built or loaded.
    ///
    /// Only complete passes are ever visible here.
    pub fn dictionary(&self, id: ModelId) -> Option<&VoxelDictionary> {
        self.models.get(&id)?.dict.as_ref()
    }

    /// Forgets the model `id` and drops its cache entries.
    pub fn remove_model(&mut self, id: ModelId) {
        let _ = self.models.remove(&id);
        self.cache.invalidate(id);
    }

    /// Brings the dictionary of the static model `id` up to date.
    ///
    /// | dirty flags | action |
    /// |---|---|
    /// | `SOURCE_GEOMETRY` or `BUILD_SETTINGS`, or nothing cached | full rebuild |
    /// | `TOPOLOGY` | re-merge of the cells affected by the edits |
    /// | `MATERIALS` | brick materials resolved again |
    /// | none | cached dictionary served |
    ///
    /// Settings different from those of the previous build count as `BUILD_SETTINGS`.
    pub fn build(
        &mut self,
        id: ModelId,
        source: Source,
        settings: &BuildSettings,
        resolver: &dyn MaterialResolver,
        cancel: &CancelToken,
    ) -> Result<UpdateAction, BuildError> {
        settings.validate()?;
        let state = self.models.entry(id).or_default();

        if state.settings.as_ref().is_some_and(|s| s != settings) {
            state.dirty |= DirtyFlags::BUILD_SETTINGS;
        }

        if state.dict.is_none() && !state.dirty.intersects(DirtyFlags::SOURCE_GEOMETRY) {
            state.dict = self.cache.load(id);

            if state.dict.is_some() {
                log::debug!("Loaded model {} from the cache.", id);
            }
        }

        let rebuild = state.dict.is_none()
            || state
                .dirty
                .intersects(DirtyFlags::SOURCE_GEOMETRY | DirtyFlags::BUILD_SETTINGS);

        if rebuild {
            let mut ctx = ModelContext::new(settings, &source.bounds(), state.anchor)?;
            let dict = build_dictionary(source, &mut ctx, resolver, cancel)?;

            state.anchor = Some(ctx.lattice.anchor());
            state.settings = Some(settings.clone());
            state.dirty = DirtyFlags::empty();
            state.pending.clear();
            self.cache.save(id, dict.clone());
            state.dict = Some(dict);
            return Ok(UpdateAction::FullRebuild);
        }

        let Some(current) = state.dict.as_ref() else {
            return Ok(UpdateAction::Cached);
        };

        if state.dirty.is_empty() {
            state.settings = Some(settings.clone());
            return Ok(UpdateAction::Cached);
        }

        let mut dict = current.clone();
        let mut rng = RandomStreams::new(&settings.seeds);
        let table = settings.legal_size_table()?;
        let mut action = UpdateAction::Rematerialize;

        if state.dirty.contains(DirtyFlags::TOPOLOGY) {
            let keys: Vec<CellKey> = state.pending.iter().copied().collect();
            let num = remerge_around(&mut dict, &keys, &table, settings, &mut rng.merge, cancel)?;
            action = UpdateAction::Remerge(num);
        }

        if state.dirty.contains(DirtyFlags::MATERIALS) {
            resolve_brick_materials(
                &mut dict,
                &settings.materials,
                settings.family,
                resolver,
                &mut rng.material,
            );
        }

        state.settings = Some(settings.clone());
        state.dirty = DirtyFlags::empty();
        state.pending.clear();
        self.cache.save(id, dict.clone());
        state.dict = Some(dict);
        Ok(action)
    }

    /// Returns the dictionary of one frame of the animated model `id`, building it if needed.
    ///
    /// Frames are cached independently. Dirty source or settings flags, or settings different
    /// from the previous frame build, invalidate every cached frame of the model.
    pub fn build_frame(
        &mut self,
        id: ModelId,
        frame: u32,
        source: Source,
        settings: &BuildSettings,
        resolver: &dyn MaterialResolver,
        cancel: &CancelToken,
    ) -> Result<VoxelDictionary, BuildError> {
        settings.validate()?;
        let state = self.models.entry(id).or_default();
        let stale = state
            .dirty
            .intersects(DirtyFlags::SOURCE_GEOMETRY | DirtyFlags::BUILD_SETTINGS)
            || state.settings.as_ref().is_some_and(|s| s != settings);

        if stale {
            self.cache.invalidate(id);
            state.dirty = DirtyFlags::empty();
        }

        state.settings = Some(settings.clone());

        if let Some(dict) = self.cache.load_frame(id, frame) {
            return Ok(dict);
        }

        let mut ctx = ModelContext::new(settings, &source.bounds(), state.anchor)?;
        let dict = build_dictionary(source, &mut ctx, resolver, cancel)?;
        state.anchor = Some(ctx.lattice.anchor());
        self.cache.save_frame(id, frame, dict.clone());
        log::info!("Built frame {} of model {}.", frame, id);
        Ok(dict)
    }

    fn edit_target(&mut self, id: ModelId) -> Result<(&mut VoxelDictionary, &BuildSettings), EditError> {
        let state = self.models.get_mut(&id).ok_or(EditError::UnknownModel(id.0))?;

        match (state.dict.as_mut(), state.settings.as_ref()) {
            (Some(dict), Some(settings)) => Ok((dict, settings)),
            _ => Err(EditError::UnknownModel(id.0)),
        }
    }

    fn commit_edit(&mut self, id: ModelId) {
        if let Some(dict) = self.dictionary(id).cloned() {
            self.cache.save(id, dict);
        }
    }

    /// Deletes cells of a built model. Their neighborhood is merged again on the next
    /// [`UpdateController::build`].
    pub fn delete_cells(&mut self, id: ModelId, keys: &[CellKey]) -> Result<Vec<CellKey>, EditError> {
        let (dict, settings) = self.edit_target(id)?;
        let affected = edit::delete_cells(dict, keys, settings.family, settings.auto_update_exposed);

        if let Some(state) = self.models.get_mut(&id) {
            state.dirty |= DirtyFlags::TOPOLOGY;
            state.pending.extend(affected.iter().copied());
        }

        self.commit_edit(id);
        Ok(affected)
    }

    /// Resizes a brick of a built model.
    pub fn set_brick_size(
        &mut self,
        id: ModelId,
        root: CellKey,
        size: BrickSize,
    ) -> Result<Vec<CellKey>, EditError> {
        let (dict, settings) = self.edit_target(id)?;
        let table = settings
            .legal_size_table()
            .unwrap_or_else(|_| LegalSizeTable::standard(settings.family));
        let affected = edit::set_brick_size(dict, root, size, &table)?;
        update_exposure_around(dict, &affected, table.family());
        self.commit_edit(id);
        Ok(affected)
    }

    /// Sets the material of a brick of a built model.
    pub fn set_material(&mut self, id: ModelId, root: CellKey, material: MaterialRef) -> Result<(), EditError> {
        let (dict, settings) = self.edit_target(id)?;
        edit::set_material(dict, root, material, settings.family)?;
        self.commit_edit(id);
        Ok(())
    }

    /// Splits a brick of a built model into 1x1 bricks.
    pub fn split_brick(&mut self, id: ModelId, root: CellKey) -> Result<Vec<CellKey>, EditError> {
        let (dict, settings) = self.edit_target(id)?;
        let family = settings.family;
        let roots = edit::split_brick(dict, root, family)?;
        update_exposure_around(dict, &roots, family);
        self.commit_edit(id);
        Ok(roots)
    }
}

/// Releases every brick touching `keys`, and merges the released cells again.
///
/// `keys` is the affected set returned by an edit, which already holds the neighbors of the
/// edited cells. Bricks that do not cover one of `keys` are left untouched.
///
/// Returns the number of bricks created.
pub fn remerge_around(
    dict: &mut VoxelDictionary,
    keys: &[CellKey],
    table: &LegalSizeTable,
    settings: &BuildSettings,
    rng: &mut Rand32,
    cancel: &CancelToken,
) -> Result<usize, Cancelled> {
    let family: BrickFamily = table.family();
    let mut region: BTreeSet<CellKey> = keys
        .iter()
        .copied()
        .filter(|k| dict.contains_key(k))
        .collect();

    for root in merge::roots_overlapping(dict, &region) {
        region.extend(merge::release_brick(dict, root, family));
    }

    let region: Vec<CellKey> = region.into_iter().collect();
    let num = merge::merge(dict, &region, table, &settings.merge, rng, cancel)?;
    update_exposure_around(dict, &region, family);
    log::debug!("Merged {} cells again into {} bricks.", region.len(), num);
    Ok(num)
}
