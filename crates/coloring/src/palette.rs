use crate::types::{Hsv, Rgb};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of entries in a discrete color ramp.
pub const RAMP_LEN: usize = 16;

/// Sixteen-entry color ramp addressed by a normalized score in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ramp(pub [Rgb; RAMP_LEN]);

impl Ramp
{
    /// Ramp index for a score, floor convention.
    #[must_use]
    pub fn index_floor(t: f64) -> usize
    {
        ((t * 15.0) as usize).min(RAMP_LEN - 1)
    }

    /// Ramp index for a score, round-half-up convention.
    #[must_use]
    pub fn index_round(t: f64) -> usize
    {
        ((t * 15.0 + 0.5) as usize).min(RAMP_LEN - 1)
    }

    #[must_use]
    pub fn at_floor(&self, t: f64) -> Rgb
    {
        self.0[Self::index_floor(t)]
    }

    #[must_use]
    pub fn at_round(&self, t: f64) -> Rgb
    {
        self.0[Self::index_round(t)]
    }
}

impl Default for Ramp
{
    fn default() -> Self
    {
        Self(std::array::from_fn(|i| Rgb::grey((i * 17) as u8)))
    }
}

/// The four palettes a step loop can draw from: one flat color, one color
/// per root index, and two score ramps.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaletteSet
{
    pub uniform: Rgb,
    pub per_root: Vec<Rgb>,
    pub proximity: Ramp,
    pub derivative: Ramp,
}

impl PaletteSet
{
    /// White uniform color, a hue wheel over the root indices, greyscale
    /// ramps.
    #[must_use]
    pub fn sized(n_roots: usize) -> Self
    {
        let per_root = (0..n_roots)
            .map(|i| Hsv::new((i as f32 + 0.5) / n_roots as f32, 0.7, 0.9).into())
            .collect();
        Self {
            uniform: Rgb::WHITE,
            per_root,
            proximity: Ramp::default(),
            derivative: Ramp::default(),
        }
    }
}

#[cfg(feature = "serde")]
impl PaletteSet
{
    pub fn save_to_file<P>(&self, path: P) -> std::io::Result<()>
    where
        P: AsRef<std::path::Path>,
    {
        let toml_string = toml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(path, toml_string)
    }

    pub fn load_from_file<P>(path: P) -> Result<Self, Box<dyn std::error::Error>>
    where
        P: AsRef<std::path::Path>,
    {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
