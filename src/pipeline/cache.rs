use super::{CacheError, ModelId};
use crate::bricks::VoxelDictionary;
use crate::utils::HashMap;
use alloc::collections::BTreeMap;
use std::path::PathBuf;

/// A cached model: one dictionary, or one dictionary per animation frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CachedModel {
    /// A static model.
    Static(VoxelDictionary),
    /// An animated model, keyed by frame number.
    Animated(BTreeMap<u32, VoxelDictionary>),
}

/// Persistent storage of encoded cache entries.
pub trait DurableStore {
    /// The encoded entry of `id`, if any.
    fn read(&self, id: ModelId) -> Result<Option<String>, CacheError>;
    /// Stores the encoded entry of `id`.
    fn write(&mut self, id: ModelId, entry: &str) -> Result<(), CacheError>;
    /// Removes the entry of `id`. Removing a missing entry is not an error.
    fn remove(&mut self, id: ModelId) -> Result<(), CacheError>;
}

/// A durable store kept in memory, mostly useful for tests and short-lived hosts.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<ModelId, String>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, id: ModelId) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(&id).cloned())
    }

    fn write(&mut self, id: ModelId, entry: &str) -> Result<(), CacheError> {
        let _ = self.entries.insert(id, entry.to_string());
        Ok(())
    }

    fn remove(&mut self, id: ModelId) -> Result<(), CacheError> {
        let _ = self.entries.remove(&id);
        Ok(())
    }
}

/// A durable store writing one `<model id>.json` file per model in a directory.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// A store writing into `root`, which is created if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(DirectoryStore { root })
    }

    fn path(&self, id: ModelId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }
}

impl DurableStore for DirectoryStore {
    fn read(&self, id: ModelId) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(self.path(id)) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, id: ModelId, entry: &str) -> Result<(), CacheError> {
        std::fs::write(self.path(id), entry)?;
        Ok(())
    }

    fn remove(&mut self, id: ModelId) -> Result<(), CacheError> {
        match std::fs::remove_file(self.path(id)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A two-tier cache of built models.
///
/// The hot tier keeps the decoded entries of the most recently used models, up to a fixed
/// capacity. Every save is written through to the durable store. Entries that cannot be read
/// or decoded are logged and treated as missing, so the caller falls back to a rebuild.
pub struct BrickCache<S: DurableStore> {
    store: S,
    hot: HashMap<ModelId, (u64, CachedModel)>,
    capacity: usize,
    clock: u64,
}

impl<S: DurableStore> BrickCache<S> {
    /// A cache over `store` keeping at most `capacity` decoded models in memory.
    pub fn new(store: S, capacity: usize) -> Self {
        BrickCache {
            store,
            hot: HashMap::default(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// The durable store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The durable store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Is the entry of `id` currently decoded in memory?
    pub fn is_hot(&self, id: ModelId) -> bool {
        self.hot.contains_key(&id)
    }

    /// The dictionary of the static model `id`.
    pub fn load(&mut self, id: ModelId) -> Option<VoxelDictionary> {
        match self.entry(id)? {
            CachedModel::Static(dict) => Some(dict.clone()),
            CachedModel::Animated(_) => None,
        }
    }

    /// The dictionary of one frame of the animated model `id`.
    pub fn load_frame(&mut self, id: ModelId, frame: u32) -> Option<VoxelDictionary> {
        match self.entry(id)? {
            CachedModel::Animated(frames) => frames.get(&frame).cloned(),
            CachedModel::Static(_) => None,
        }
    }

    /// Caches the dictionary of the static model `id`.
    pub fn save(&mut self, id: ModelId, dict: VoxelDictionary) {
        self.put(id, CachedModel::Static(dict));
    }

    /// Caches one frame of the animated model `id`, keeping its other frames.
    pub fn save_frame(&mut self, id: ModelId, frame: u32, dict: VoxelDictionary) {
        let mut frames = match self.entry(id) {
            Some(CachedModel::Animated(frames)) => core::mem::take(frames),
            _ => BTreeMap::new(),
        };

        let _ = frames.insert(frame, dict);
        self.put(id, CachedModel::Animated(frames));
    }

    /// Drops every cached entry of `id`.
    pub fn invalidate(&mut self, id: ModelId) {
        let _ = self.hot.remove(&id);

        if let Err(e) = self.store.remove(id) {
            log::warn!("Failed to remove the cache entry of model {}: {}", id, e);
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn entry(&mut self, id: ModelId) -> Option<&mut CachedModel> {
        let stamp = self.tick();

        if !self.hot.contains_key(&id) {
            let decoded = match self.store.read(id) {
                Ok(Some(text)) => serde_json::from_str::<CachedModel>(&text)
                    .map_err(CacheError::from)
                    .map_err(|e| log::warn!("Discarding the cache entry of model {}: {}", id, e))
                    .ok()?,
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("Failed to read the cache entry of model {}: {}", id, e);
                    return None;
                }
            };

            self.promote(id, decoded);
        }

        let (last_use, entry) = self.hot.get_mut(&id)?;
        *last_use = stamp;
        Some(entry)
    }

    fn promote(&mut self, id: ModelId, entry: CachedModel) {
        while self.hot.len() >= self.capacity {
            let Some(lru) = self
                .hot
                .iter()
                .min_by_key(|(_, (last_use, _))| *last_use)
                .map(|(id, _)| *id)
            else {
                break;
            };

            log::debug!("Evicting model {} from the hot cache.", lru);
            let _ = self.hot.remove(&lru);
        }

        let stamp = self.tick();
        let _ = self.hot.insert(id, (stamp, entry));
    }

    fn put(&mut self, id: ModelId, entry: CachedModel) {
        match serde_json::to_string(&entry) {
            Ok(text) => {
                if let Err(e) = self.store.write(id, &text) {
                    log::warn!("Failed to write the cache entry of model {}: {}", id, e);
                }
            }
            Err(e) => log::warn!("Failed to encode the cache entry of model {}: {}", id, e),
        }

        let _ = self.hot.remove(&id);
        self.promote(id, entry);
    }
}
