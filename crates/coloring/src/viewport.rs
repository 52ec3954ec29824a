use rootflow_common::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Square window of the complex plane mapped onto the canvas. `range` is
/// the half-width of the window in plane units; the imaginary axis points
/// up on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Viewport
{
    pub width: u32,
    pub height: u32,
    pub center: Cplx,
    pub range: Real,
}

impl Viewport
{
    /// Linear pixel index (`iy * width + ix`) for a plane point, or `None`
    /// when it lands off-canvas.
    #[must_use]
    pub fn project(&self, z: Cplx) -> Option<u32>
    {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let ix = (((z.re - self.center.re) / self.range + 1.0) * 0.5 * w).floor();
        let iy = ((1.0 - (z.im - self.center.im) / self.range) * 0.5 * h).floor();
        if ix >= 0.0 && ix < w && iy >= 0.0 && iy < h {
            Some(iy as u32 * self.width + ix as u32)
        } else {
            None
        }
    }
}
