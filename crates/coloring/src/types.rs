#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 8-bit RGB triple, the pixel currency of the paint buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn grey(v: u8) -> Self
    {
        Self { r: v, g: v, b: v }
    }

    pub const WHITE: Self = Self::grey(255);
    pub const BLACK: Self = Self::grey(0);
}

/// Hue/saturation/intensity helper for generating per-root color wheels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv
{
    pub hue: f32,
    pub saturation: f32,
    pub intensity: f32,
}

impl Hsv
{
    #[must_use]
    pub const fn new(hue: f32, saturation: f32, intensity: f32) -> Self
    {
        Self {
            hue,
            saturation,
            intensity,
        }
    }
}

impl From<Hsv> for Rgb
{
    fn from(hsv: Hsv) -> Self
    {
        let hue = hsv.hue.rem_euclid(1.0) * 6.0;
        let sector = hue as u32 % 6;
        let frac = hue - hue.floor();

        let v = hsv.intensity;
        let p = v * (1.0 - hsv.saturation);
        let q = v * (1.0 - hsv.saturation * frac);
        let t = v * (1.0 - hsv.saturation * (1.0 - frac));

        let (r, g, b) = match sector {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let to_byte = |x: f32| (x * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to_byte(r), to_byte(g), to_byte(b))
    }
}
