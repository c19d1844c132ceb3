//! The sparse voxel dictionary and the records it holds.
//!
//! Every lattice cell the classifier keeps becomes one [`Cell`] keyed by its integer
//! [`CellKey`]. Merged bricks are expressed inside the dictionary itself: the anchor cell of a
//! brick is a [`ParentLink::Root`] carrying the brick's [`BrickSize`], every other covered cell
//! is a [`ParentLink::Member`] pointing straight at the root.

pub use self::cell::{BrickKind, Cell, ParentLink, SurfaceSample};
pub use self::dictionary::{PartitionError, VoxelDictionary};
pub use self::key::CellKey;
pub use self::size_table::{BrickFamily, BrickSize, LegalSizeTable};

mod cell;
mod dictionary;
mod key;
mod size_table;
