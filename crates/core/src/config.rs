use aberth_solve::MAX_DEGREE;
use derive_more::{Display, Error};
use rootflow_color::{ColorMode, Rgb};
use rootflow_common::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Root-to-predecessor matching strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchStrategy
{
    /// Greedy matching on every 4th step; solver order in between. Trades
    /// identity continuity for throughput.
    #[default]
    Strided,
    /// Greedy nearest-predecessor matching on every step.
    Greedy,
    /// Minimum-cost assignment, degrading silently to greedy above the
    /// size cap.
    Hungarian,
}

/// Parametric trajectory a coefficient travels between its base position
/// and its morph target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MorphPath
{
    #[default]
    Line,
    Circle,
    Ellipse,
    FigureEight,
}

/// The morph layer's scalar configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MorphSettings
{
    pub enabled: bool,
    /// Cycle rate in Hz.
    pub rate: Real,
    pub path: MorphPath,
    /// Traversal direction for the non-line paths.
    pub ccw: bool,
    /// Minor-axis fraction of the ellipse path.
    pub ellipse_minor: Real,
    /// Envelope dither sigma near the base endpoint.
    pub dither_start: Real,
    /// Envelope dither sigma at mid-cycle.
    pub dither_mid: Real,
    /// Envelope dither sigma near the target endpoint.
    pub dither_end: Real,
}

impl Default for MorphSettings
{
    fn default() -> Self
    {
        Self {
            enabled: false,
            rate: 0.0,
            path: MorphPath::Line,
            ccw: false,
            ellipse_minor: 1.0,
            dither_start: 0.0,
            dither_mid: 0.0,
            dither_end: 0.0,
        }
    }
}

/// Scalar configuration for one animation. Buffer contents live in
/// [`crate::memory::Memory`]; this is everything else the host declares.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings
{
    /// Declared coefficient count, leading term included.
    pub n_coeffs: usize,
    /// Declared root count; must equal `n_coeffs - 1`.
    pub n_roots: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Step count of the whole animation (the time base for `elapsed`).
    pub total_steps: usize,
    pub fps: Real,
    /// Half-width of the viewport in plane units.
    pub view_range: Real,
    pub view_center: Cplx,
    pub color_mode: ColorMode,
    pub match_strategy: MatchStrategy,
    pub morph: MorphSettings,
    pub has_jiggle: bool,
    pub uniform_color: Rgb,
    /// xorshift128 seed words; all-zero selects a fixed fallback.
    pub seed: [u32; 4],
}

impl Settings
{
    /// Declared degree, before any leading-coefficient stripping.
    #[must_use]
    pub const fn degree(&self) -> usize
    {
        self.n_coeffs.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError>
    {
        if self.n_coeffs == 0 {
            return Err(ConfigError::NoCoefficients);
        }
        if self.degree() > MAX_DEGREE {
            return Err(ConfigError::DegreeTooLarge {
                degree: self.degree(),
            });
        }
        if self.n_roots != self.degree() {
            return Err(ConfigError::RootCountMismatch {
                n_roots: self.n_roots,
                expected: self.degree(),
            });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::EmptyCanvas);
        }
        if self.total_steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError
{
    #[display("coefficient count must be positive")]
    NoCoefficients,
    #[display("degree {degree} exceeds the supported maximum of 255")]
    DegreeTooLarge
    {
        degree: usize
    },
    #[display("{n_roots} roots declared for a degree-{expected} polynomial")]
    RootCountMismatch
    {
        n_roots: usize, expected: usize
    },
    #[display("canvas must have a nonzero area")]
    EmptyCanvas,
    #[display("animation must span at least one step")]
    NoSteps,
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rootflow_color::ColorMode;

    fn settings(n_coeffs: usize) -> Settings
    {
        Settings {
            n_coeffs,
            n_roots: n_coeffs.saturating_sub(1),
            canvas_width: 32,
            canvas_height: 32,
            total_steps: 100,
            fps: 30.0,
            view_range: 2.0,
            view_center: Cplx::new(0.0, 0.0),
            color_mode: ColorMode::Uniform,
            match_strategy: MatchStrategy::default(),
            morph: MorphSettings::default(),
            has_jiggle: false,
            uniform_color: Rgb::WHITE,
            seed: [1, 2, 3, 4],
        }
    }

    #[test]
    fn accepts_max_degree()
    {
        assert!(settings(256).validate().is_ok());
    }

    #[test]
    fn rejects_over_cap()
    {
        assert_eq!(
            settings(257).validate(),
            Err(ConfigError::DegreeTooLarge { degree: 256 })
        );
    }

    #[test]
    fn rejects_root_count_mismatch()
    {
        let mut s = settings(4);
        s.n_roots = 4;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::RootCountMismatch { .. })
        ));
    }

    #[test]
    fn rejects_empty_shapes()
    {
        assert_eq!(settings(0).validate(), Err(ConfigError::NoCoefficients));
        let mut s = settings(3);
        s.canvas_height = 0;
        assert_eq!(s.validate(), Err(ConfigError::EmptyCanvas));
        let mut s = settings(3);
        s.total_steps = 0;
        assert_eq!(s.validate(), Err(ConfigError::NoSteps));
    }
}
