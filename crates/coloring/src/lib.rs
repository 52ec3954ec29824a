//! Everything between a solved root set and colored canvas pixels:
//! viewport projection, the four coloring modes' palettes, and the scalar
//! scoring passes (nearest-neighbor proximity, coefficient sensitivity,
//! rank-normalization) that feed the ramp lookups.

pub mod palette;
pub mod proximity;
pub mod rank;
pub mod sensitivity;
pub mod types;
pub mod viewport;

pub use palette::{PaletteSet, Ramp, RAMP_LEN};
pub use types::{Hsv, Rgb};
pub use viewport::Viewport;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How each plotted root is colored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorMode
{
    /// One configured color for every root.
    #[default]
    Uniform,
    /// A fixed color per root index; pairs with predecessor matching to
    /// keep each trajectory's color stable.
    Index,
    /// Ramp lookup by distance to the nearest other root.
    Proximity,
    /// Ramp lookup by rank-normalized coefficient sensitivity.
    Derivative,
}
