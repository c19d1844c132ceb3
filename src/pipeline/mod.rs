//! The brick pipeline: settings, model builds, incremental updates, edits and caching.

pub use self::build::{
    build_dictionary, dictionary_from_grid, resolve_brick_materials, resolve_cell_materials, Source,
};
pub use self::cache::{BrickCache, CachedModel, DirectoryStore, DurableStore, MemoryStore};
pub use self::context::{ModelContext, RandomStreams};
pub use self::controller::{remerge_around, DirtyFlags, UpdateAction, UpdateController};
pub use self::error::{BuildError, CacheError, ConfigError, EditError};
pub use self::output::{brick_instances, BrickInstance, NUM_VARIATIONS};
pub use self::settings::{BuildSettings, MaterialMode, Seeds};

mod build;
mod cache;
mod context;
mod controller;
pub mod edit;
mod error;
mod output;
mod settings;

/// Identifier of a model managed by an [`UpdateController`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u64);

impl core::fmt::Display for ModelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
