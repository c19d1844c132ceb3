use crate::bricks::{BrickSize, CellKey};
use crate::utils::Cancelled;

/// A setting or size table rejected before any work starts.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A legal-size table must contain at least one size.
    #[error("The legal-size table is empty.")]
    EmptySizeTable,
    /// A legal-size table must contain the 1x1 fallback at the family's base height.
    #[error("The legal-size table has no 1x1 size of height {height}.")]
    MissingBaseSize {
        /// The base height of the brick family.
        height: u32,
    },
    /// Every dimension of a legal size must be at least one.
    #[error("The size {0:?} has a zero dimension.")]
    ZeroSizeDimension(BrickSize),
    /// A numeric setting is out of its valid range.
    #[error("Invalid value for `{field}`: {reason}.")]
    InvalidValue {
        /// The faulty setting.
        field: &'static str,
        /// What is expected from it.
        reason: &'static str,
    },
    /// The settings document could not be parsed.
    #[error("Could not parse the build settings: {0}")]
    Parse(String),
}

/// An explicit edit request that cannot be applied.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    /// No cell exists at this key.
    #[error("No cell exists at {0}.")]
    UnknownKey(CellKey),
    /// The operation requires the key of a brick root.
    #[error("The cell at {0} does not anchor a brick.")]
    NotARoot(CellKey),
    /// The requested size is not part of the legal-size table.
    #[error("The size {0:?} is not a legal brick size.")]
    IllegalSize(BrickSize),
    /// No model with this identifier has been built yet.
    #[error("The model {0} has not been built.")]
    UnknownModel(u64),
}

/// A failure of the durable cache store.
///
/// These errors never escape [`BrickCache::load`](crate::pipeline::BrickCache::load): they are
/// logged and turned into cache misses.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// Reading or writing the store failed.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A cache entry could not be encoded or decoded.
    #[error("Cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Error returned by a pipeline run.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The settings were rejected before the run started.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The run was cancelled. The cache was left untouched.
    #[error("The build was cancelled.")]
    Cancelled,
}

impl From<Cancelled> for BuildError {
    fn from(_: Cancelled) -> Self {
        BuildError::Cancelled
    }
}
