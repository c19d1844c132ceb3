use crate::bricks::BrickFamily;
use crate::math::{Real, Vector};

/// Ratio between the width and the height of a standard brick.
const WIDTH_OVER_HEIGHT: Real = 8.0 / 9.6;

/// Dimensions of one lattice cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellPitch {
    /// Extent of a cell along `x`.
    pub width: Real,
    /// Extent of a cell along `y`.
    pub depth: Real,
    /// Extent of a cell along `z` (one lattice layer).
    pub height: Real,
    /// Space left between two adjacent cells, on every axis.
    pub gap: Real,
}

impl CellPitch {
    /// A pitch with explicit dimensions.
    pub fn new(width: Real, depth: Real, height: Real, gap: Real) -> Self {
        CellPitch {
            width,
            depth,
            height,
            gap,
        }
    }

    /// Cubic cells of the given size, without gap.
    pub fn cube(size: Real) -> Self {
        Self::new(size, size, size, 0.0)
    }

    /// The pitch of bricks of the given height.
    ///
    /// The width and depth follow the proportions of a physical brick. In families built from
    /// plates, one lattice layer is a third of the brick height.
    pub fn from_brick_height(height: Real, gap: Real, family: BrickFamily) -> Self {
        let width = height * WIDTH_OVER_HEIGHT;
        let layer = match family {
            BrickFamily::Bricks | BrickFamily::Custom => height,
            BrickFamily::Plates | BrickFamily::BricksAndPlates => height / 3.0,
        };

        Self::new(width, width, layer, gap)
    }

    /// Distance between the centers of two adjacent cells, on every axis.
    #[inline]
    pub fn step(&self) -> Vector<Real> {
        Vector::new(
            self.width + self.gap,
            self.depth + self.gap,
            self.height + self.gap,
        )
    }

    /// Are all the dimensions finite and strictly positive (gap excepted)?
    pub fn is_valid(&self) -> bool {
        [self.width, self.depth, self.height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
            && self.gap.is_finite()
            && self.gap >= 0.0
    }
}

impl Default for CellPitch {
    fn default() -> Self {
        Self::from_brick_height(0.1, 0.0, BrickFamily::Bricks)
    }
}
