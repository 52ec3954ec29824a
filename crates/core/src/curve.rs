use rootflow_common::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rng::DitherKind;

/// Control-point curve addressed by a phase in [0, 1).
///
/// A cloud holds discrete samples and snaps to the nearest-below sample;
/// a polyline closes into a loop and interpolates linearly with
/// wraparound.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve
{
    points: Vec<Cplx>,
    is_cloud: bool,
}

impl Curve
{
    #[must_use]
    pub fn polyline(points: Vec<Cplx>) -> Self
    {
        Self {
            points,
            is_cloud: false,
        }
    }

    #[must_use]
    pub fn cloud(points: Vec<Cplx>) -> Self
    {
        Self {
            points,
            is_cloud: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.points.is_empty()
    }

    #[must_use]
    pub const fn is_cloud(&self) -> bool
    {
        self.is_cloud
    }

    /// Sample at phase `u` in [0, 1).
    #[must_use]
    pub fn sample(&self, u: Real) -> Cplx
    {
        let n = self.points.len();
        if n == 0 {
            return Cplx::new(0.0, 0.0);
        }
        let raw = u * n as Real;
        let lo = (raw as usize).min(n - 1);
        if self.is_cloud {
            return self.points[lo];
        }
        let hi = (lo + 1) % n;
        let frac = raw - lo as Real;
        self.points[lo] * (1.0 - frac) + self.points[hi] * frac
    }
}

/// Binding of a curve to one coefficient slot, plus its animation
/// parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveEntry
{
    /// Index of the coefficient this entry drives.
    pub coeff: usize,
    /// Curve traversals per elapsed unit.
    pub speed: Real,
    /// Reverses the traversal direction.
    pub ccw: bool,
    /// Additive noise amplitude; zero disables the dither.
    pub dither_sigma: Real,
    pub dither_dist: DitherKind,
    pub curve: Curve,
}

impl CurveEntry
{
    /// Curve phase for the given elapsed time.
    #[must_use]
    pub fn phase(&self, elapsed: Real) -> Real
    {
        let dir = if self.ccw { -1.0 } else { 1.0 };
        fract(elapsed * self.speed * dir)
    }
}
