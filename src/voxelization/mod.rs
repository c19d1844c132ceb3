//! Classification of lattice cells as outside, shell or interior.
//!
//! Two classifiers fill the same dense grid:
//!
//! - [`classify_surface`] sweeps axis-aligned rays through the lattice rows and applies the
//!   parity rule against a [`SurfaceQuery`](crate::query::SurfaceQuery),
//! - [`classify_volume`] averages a [`VolumetricField`](crate::query::VolumetricField) over
//!   the voxels each cell covers.
//!
//! Both then run [`adjust_values`], which seals open axes, drops trashed cells, and assigns the
//! interior depth falloff.

pub use self::falloff::adjust_values;
pub use self::settings::{Axes, Insideness, InteriorSettings, ShellPolicy, ShellSettings};
pub use self::shell::classify_surface;
pub use self::smoke::{classify_volume, SmokeSettings};

use crate::bricks::SurfaceSample;
use crate::math::Real;

mod falloff;
mod settings;
mod shell;
mod smoke;

/// Value decrement between two consecutive interior rings.
pub const FALLOFF_STEP: Real = 0.01;
/// Maximum number of interior rings.
pub const MAX_FALLOFF_RINGS: u32 = 50;

/// Per-cell classification results, in dense lattice order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifiedGrid {
    /// Cell values; `None` marks cells dropped from the dictionary.
    pub values: Vec<Option<Real>>,
    /// Nearest recorded surface sample of each cell.
    pub nearest: Vec<Option<SurfaceSample>>,
    /// Per-cell RGBA colors, for the volumetric classifier.
    pub colors: Option<Vec<[Real; 4]>>,
}

impl ClassifiedGrid {
    /// Number of cells kept in the dictionary.
    pub fn num_kept(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// A fixed-size pool running the independent per-row classification jobs.
///
/// Without the `parallel` feature, jobs run sequentially on the calling thread.
#[derive(Default)]
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// A pool with the given number of threads, or rayon's global pool if `None`.
    pub fn new(threads: Option<usize>) -> Self {
        #[cfg(feature = "parallel")]
        {
            let pool = threads.and_then(|n| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| log::warn!("Falling back to the global thread pool: {}", e))
                    .ok()
            });
            WorkerPool { pool }
        }

        #[cfg(not(feature = "parallel"))]
        {
            let _ = threads;
            WorkerPool {}
        }
    }

    /// Applies `f` to every item, possibly in parallel, preserving the order of the results.
    pub(crate) fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let run = || -> Vec<R> { items.into_par_iter().map(&f).collect() };

            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            items.into_iter().map(f).collect()
        }
    }
}

/// Neighbor of a grid index along `axis`, if it lies within `dims`.
#[inline]
pub(crate) fn grid_neighbor(dims: [u32; 3], index: [u32; 3], axis: usize, forward: bool) -> Option<[u32; 3]> {
    let mut result = index;

    if forward {
        if index[axis] + 1 >= dims[axis] {
            return None;
        }
        result[axis] += 1;
    } else {
        if index[axis] == 0 {
            return None;
        }
        result[axis] -= 1;
    }

    Some(result)
}
