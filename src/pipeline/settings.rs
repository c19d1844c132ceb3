use super::ConfigError;
use crate::bricks::{BrickFamily, BrickKind, LegalSizeTable};
use crate::lattice::CellPitch;
use crate::math::{Point, Real};
use crate::merge::MergeSettings;
use crate::query::MaterialRef;
use crate::supports::InternalSupports;
use crate::voxelization::{InteriorSettings, ShellSettings, SmokeSettings};

/// How the materials of the bricks are chosen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MaterialMode {
    /// Resolved from the source surface, at the nearest sample of each cell.
    #[default]
    Source,
    /// The same material everywhere.
    Uniform(MaterialRef),
    /// A material picked per brick from the palette.
    Random(Vec<MaterialRef>),
}

/// Seeds of the three random streams of a model.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seeds {
    /// Seeds the merge order.
    pub merge: u64,
    /// Seeds the random material picks.
    pub material: u64,
    /// Seeds the per-brick feature variations of the drawing stage.
    pub feature: u64,
}

/// Every setting of a model build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// The family of parts the model is built from.
    pub family: BrickFamily,
    /// World-space height of a full brick.
    pub brick_height: Real,
    /// Space between two adjacent cells.
    pub gap: Real,
    /// Surface classification.
    pub shell: ShellSettings,
    /// Interior falloff and drawn depth.
    pub interior: InteriorSettings,
    /// Merge engine.
    pub merge: MergeSettings,
    /// Volumetric classification.
    pub smoke: SmokeSettings,
    /// Internal supports.
    pub supports: InternalSupports,
    /// Material selection.
    pub materials: MaterialMode,
    /// Part geometry assigned to every cell.
    pub brick_kind: BrickKind,
    /// Replaces the standard part list by these `(width, depth)` footprints.
    pub custom_footprints: Option<Vec<(u32, u32)>>,
    /// Random stream seeds.
    pub seeds: Seeds,
    /// Number of classifier threads, or `None` for the global pool.
    pub worker_threads: Option<usize>,
    /// Re-expose the neighbors of deleted cells.
    pub auto_update_exposed: bool,
    /// Explicit lattice anchor. When `None`, the anchor of the previous build is reused.
    pub alignment: Option<Point<Real>>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            family: BrickFamily::Bricks,
            brick_height: 0.1,
            gap: 0.0,
            shell: ShellSettings::default(),
            interior: InteriorSettings::default(),
            merge: MergeSettings::default(),
            smoke: SmokeSettings::default(),
            supports: InternalSupports::None,
            materials: MaterialMode::Source,
            brick_kind: BrickKind::Standard,
            custom_footprints: None,
            seeds: Seeds::default(),
            worker_threads: None,
            auto_update_exposed: true,
            alignment: None,
        }
    }
}

impl BuildSettings {
    /// Parses settings from JSON. Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The dimensions of one lattice cell.
    pub fn cell_pitch(&self) -> CellPitch {
        CellPitch::from_brick_height(self.brick_height, self.gap, self.family)
    }

    /// The brick sizes the merge engine may produce.
    pub fn legal_size_table(&self) -> Result<LegalSizeTable, ConfigError> {
        match &self.custom_footprints {
            Some(footprints) => LegalSizeTable::from_footprints(self.family, footprints),
            None => Ok(LegalSizeTable::standard(self.family)),
        }
    }

    /// Checks every setting, so a run never fails on its configuration once started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue { field, reason })
        }

        if !(self.brick_height.is_finite() && self.brick_height > 0.0) {
            return invalid("brick_height", "must be finite and positive");
        }

        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return invalid("gap", "must be finite and non-negative");
        }

        if self.shell.swept_axes().is_empty() {
            return invalid("shell.calculation_axes", "must contain at least one axis");
        }

        if self.interior.shell_thickness == 0 {
            return invalid("interior.shell_thickness", "must be at least 1");
        }

        if self.merge.max_width == 0 || self.merge.max_depth == 0 {
            return invalid("merge", "maximum brick extents must be at least 1");
        }

        if self.merge.variation.is_some_and(|v| v.passes == 0) {
            return invalid("merge.variation.passes", "must be at least 1");
        }

        if self.smoke.quality == 0 {
            return invalid("smoke.quality", "must be at least 1");
        }

        if !(0.0..=1.0).contains(&self.smoke.density) {
            return invalid("smoke.density", "must be within [0, 1]");
        }

        match self.supports {
            InternalSupports::Columns { thickness, step } if thickness == 0 || step == 0 => {
                return invalid("supports", "column thickness and step must be at least 1");
            }
            InternalSupports::Lattice { step, height, .. } if step == 0 || height == 0 => {
                return invalid("supports", "lattice step and height must be at least 1");
            }
            _ => {}
        }

        if matches!(&self.materials, MaterialMode::Random(palette) if palette.is_empty()) {
            return invalid("materials", "the random palette is empty");
        }

        let _ = self.legal_size_table()?;
        Ok(())
    }
}
