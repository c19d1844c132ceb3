use super::{BuildSettings, ConfigError, Seeds};
use crate::bounding_volume::Aabb;
use crate::bricks::LegalSizeTable;
use crate::lattice::Lattice;
use crate::math::{Point, Real};
use oorandom::Rand32;

/// The three independent random streams of a pipeline run.
#[derive(Clone, Debug)]
pub struct RandomStreams {
    /// Merge order and variation passes.
    pub merge: Rand32,
    /// Random material picks.
    pub material: Rand32,
    /// Per-brick feature variations.
    pub feature: Rand32,
}

impl RandomStreams {
    /// Streams seeded from `seeds`.
    pub fn new(seeds: &Seeds) -> Self {
        RandomStreams {
            merge: Rand32::new(seeds.merge),
            material: Rand32::new(seeds.material),
            feature: Rand32::new(seeds.feature),
        }
    }
}

/// Everything a pipeline run needs to know about the model being built.
pub struct ModelContext<'a> {
    /// The validated settings of this run.
    pub settings: &'a BuildSettings,
    /// The legal sizes derived from the settings.
    pub table: LegalSizeTable,
    /// The lattice laid over the source.
    pub lattice: Lattice,
    /// The random streams of this run.
    pub rng: RandomStreams,
}

impl<'a> ModelContext<'a> {
    /// Validates `settings` and lays the lattice over `bounds`.
    ///
    /// The explicit alignment of the settings wins over `previous_anchor`.
    pub fn new(
        settings: &'a BuildSettings,
        bounds: &Aabb,
        previous_anchor: Option<Point<Real>>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let table = settings.legal_size_table()?;
        let alignment = settings.alignment.or(previous_anchor);
        let lattice = Lattice::generate(bounds, &settings.cell_pitch(), alignment);

        Ok(ModelContext {
            settings,
            table,
            lattice,
            rng: RandomStreams::new(&settings.seeds),
        })
    }
}
