//! The regular grid of cell centers laid over the source bounds.

pub use self::lattice::Lattice;
pub use self::pitch::CellPitch;

mod lattice;
mod pitch;
