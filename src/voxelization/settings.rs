use crate::math::Real;

/// Where the shell is placed when a cell edge crosses the source surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellPolicy {
    /// The crossing cell that lies inside the source becomes shell.
    #[default]
    Inside,
    /// The crossing cell that lies outside of the source becomes shell.
    Outside,
    /// The cell after the crossing (along the ray) always becomes shell.
    Consistent,
}

/// A set of coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axes(u8);

bitflags::bitflags! {
    /// Flags identifying the coordinate axes.
    impl Axes: u8 {
        /// The `x` axis.
        const X = 1 << 0;
        /// The `y` axis.
        const Y = 1 << 1;
        /// The `z` axis.
        const Z = 1 << 2;
    }
}

impl Axes {
    /// The flag of the axis with the given index.
    #[inline]
    pub fn from_index(axis: usize) -> Self {
        match axis {
            0 => Axes::X,
            1 => Axes::Y,
            _ => Axes::Z,
        }
    }

    /// Does this set contain the axis with the given index?
    #[inline]
    pub fn has(self, axis: usize) -> bool {
        self.contains(Self::from_index(axis))
    }
}

impl Default for Axes {
    fn default() -> Self {
        Axes::all()
    }
}

/// Which rays vote on the insideness of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Insideness {
    /// Only the ray of the current sweep votes.
    #[default]
    HighEfficiency,
    /// One ray per listed axis votes; a tie counts as inside.
    Axes(Axes),
}

/// Settings of the ray-cast shell classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Shell placement policy.
    pub policy: ShellPolicy,
    /// Axes along which shell rays are cast. Only honored by [`ShellPolicy::Outside`]; the other
    /// policies always sweep the three axes.
    pub calculation_axes: Axes,
    /// Insideness voting.
    pub insideness: Insideness,
    /// Treat a first crossing that leaves the surface as "inside", whatever the parity.
    pub use_normals: bool,
    /// Enables the row skip heuristic after this many consecutive rays without a crossing
    /// within one cell edge.
    ///
    /// Skipping may misclassify cells next to geometry that grazes the ray axis.
    pub skip_after_misses: Option<u32>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        ShellSettings {
            policy: ShellPolicy::Inside,
            calculation_axes: Axes::all(),
            insideness: Insideness::HighEfficiency,
            use_normals: false,
            skip_after_misses: Some(3),
        }
    }
}

impl ShellSettings {
    /// The axes actually swept by the classifier.
    pub fn swept_axes(&self) -> Axes {
        match self.policy {
            ShellPolicy::Outside => self.calculation_axes,
            ShellPolicy::Inside | ShellPolicy::Consistent => Axes::all(),
        }
    }
}

/// Settings of the interior depth falloff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteriorSettings {
    /// Number of cell rings, shell included, drawn from the surface inward.
    pub shell_thickness: u32,
    /// Keep interior cells in the dictionary at all.
    pub calc_internals: bool,
    /// Number of interior rings inheriting the nearest surface sample for material lookup.
    pub material_shell_depth: u32,
}

impl Default for InteriorSettings {
    fn default() -> Self {
        InteriorSettings {
            shell_thickness: 1,
            calc_internals: true,
            material_shell_depth: 1,
        }
    }
}

impl InteriorSettings {
    /// The smallest value of a drawn cell.
    ///
    /// Ring `n` inside the shell has the value `1 - n / 100`, so a thickness of `t` draws the
    /// shell and its `t - 1` first rings.
    pub fn draw_threshold(&self) -> Real {
        1.0 - (self.shell_thickness.max(1) - 1) as Real * super::FALLOFF_STEP
            - super::FALLOFF_STEP * 0.5
    }
}
