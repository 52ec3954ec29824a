use derive_more::{Display, Error};
use rootflow_color::PaletteSet;

use crate::config::Settings;
use crate::curve::CurveEntry;

/// Every buffer the step loop touches, pre-sized by the host and bound
/// once per animation.
///
/// The step loop reads the input region, overwrites the scratch region
/// each step, and appends to the output region; the persistent root
/// arrays are the only state carried across steps and invocations. None
/// of these grow after [`Memory::allocate`].
#[derive(Clone, Debug)]
pub struct Memory
{
    // Inputs.
    pub base_re: Vec<f64>,
    pub base_im: Vec<f64>,
    pub jiggle_re: Vec<f64>,
    pub jiggle_im: Vec<f64>,
    pub morph_target_re: Vec<f64>,
    pub morph_target_im: Vec<f64>,
    pub c_entries: Vec<CurveEntry>,
    pub d_entries: Vec<CurveEntry>,
    /// Coefficient indices where the morph target mirrors the working
    /// polynomial instead of carrying its own curve.
    pub follow_c: Vec<usize>,
    /// Coefficient subset feeding the sensitivity score.
    pub selected: Vec<usize>,
    pub palettes: PaletteSet,

    // Persistent root state.
    pub root_re: Vec<f64>,
    pub root_im: Vec<f64>,

    // Scratch, overwritten every step.
    pub work_re: Vec<f64>,
    pub work_im: Vec<f64>,
    pub tmp_re: Vec<f64>,
    pub tmp_im: Vec<f64>,
    pub morph_work_re: Vec<f64>,
    pub morph_work_im: Vec<f64>,

    // Packed pixel output.
    pub paint_idx: Vec<u32>,
    pub paint_r: Vec<u8>,
    pub paint_g: Vec<u8>,
    pub paint_b: Vec<u8>,
}

impl Memory
{
    /// Allocate a zeroed region sized for `settings` and an output
    /// capacity of `max_steps` steps.
    #[must_use]
    pub fn allocate(settings: &Settings, max_steps: usize) -> Self
    {
        let nc = settings.n_coeffs;
        let nr = settings.n_roots;
        let cap = nr * max_steps;
        Self {
            base_re: vec![0.0; nc],
            base_im: vec![0.0; nc],
            jiggle_re: vec![0.0; nc],
            jiggle_im: vec![0.0; nc],
            morph_target_re: vec![0.0; nc],
            morph_target_im: vec![0.0; nc],
            c_entries: Vec::new(),
            d_entries: Vec::new(),
            follow_c: Vec::new(),
            selected: Vec::new(),
            palettes: PaletteSet::sized(nr),
            root_re: vec![0.0; nr],
            root_im: vec![0.0; nr],
            work_re: vec![0.0; nc],
            work_im: vec![0.0; nc],
            tmp_re: vec![0.0; nr],
            tmp_im: vec![0.0; nr],
            morph_work_re: vec![0.0; nc],
            morph_work_im: vec![0.0; nc],
            paint_idx: vec![0; cap],
            paint_r: vec![0; cap],
            paint_g: vec![0; cap],
            paint_b: vec![0; cap],
        }
    }

    /// Output capacity in pixels, limited by the shortest paint buffer.
    #[must_use]
    pub fn paint_capacity(&self) -> usize
    {
        self.paint_idx
            .len()
            .min(self.paint_r.len())
            .min(self.paint_g.len())
            .min(self.paint_b.len())
    }

    pub(crate) fn validate(&self, settings: &Settings) -> Result<(), BindError>
    {
        let nc = settings.n_coeffs;
        let nr = settings.n_roots;

        let check = |name: &'static str, len: usize, need: usize| {
            if len < need {
                Err(BindError::BufferTooSmall { name, len, need })
            } else {
                Ok(())
            }
        };

        check("base_re", self.base_re.len(), nc)?;
        check("base_im", self.base_im.len(), nc)?;
        check("morph_target_re", self.morph_target_re.len(), nc)?;
        check("morph_target_im", self.morph_target_im.len(), nc)?;
        check("work_re", self.work_re.len(), nc)?;
        check("work_im", self.work_im.len(), nc)?;
        check("morph_work_re", self.morph_work_re.len(), nc)?;
        check("morph_work_im", self.morph_work_im.len(), nc)?;
        if settings.has_jiggle {
            check("jiggle_re", self.jiggle_re.len(), nc)?;
            check("jiggle_im", self.jiggle_im.len(), nc)?;
        }
        check("root_re", self.root_re.len(), nr)?;
        check("root_im", self.root_im.len(), nr)?;
        check("tmp_re", self.tmp_re.len(), nr)?;
        check("tmp_im", self.tmp_im.len(), nr)?;
        check("per_root palette", self.palettes.per_root.len(), nr)?;

        for entry in self.c_entries.iter().chain(&self.d_entries) {
            if entry.coeff >= nc {
                return Err(BindError::CurveIndexOutOfRange {
                    index: entry.coeff,
                    n_coeffs: nc,
                });
            }
            if entry.curve.is_empty() {
                return Err(BindError::EmptyCurve { coeff: entry.coeff });
            }
        }
        for &idx in &self.follow_c {
            if idx >= nc {
                return Err(BindError::CurveIndexOutOfRange {
                    index: idx,
                    n_coeffs: nc,
                });
            }
        }
        for &idx in &self.selected {
            if idx >= nc {
                return Err(BindError::CurveIndexOutOfRange {
                    index: idx,
                    n_coeffs: nc,
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum BindError
{
    #[display("buffer {name} holds {len} entries, {need} required")]
    BufferTooSmall
    {
        name: &'static str,
        len: usize,
        need: usize,
    },
    #[display("entry binds coefficient {index} of a {n_coeffs}-coefficient polynomial")]
    CurveIndexOutOfRange
    {
        index: usize, n_coeffs: usize
    },
    #[display("curve bound to coefficient {coeff} has no control points")]
    EmptyCurve
    {
        coeff: usize
    },
}

#[cfg(test)]
mod tests
{
    use super::Memory;
    use crate::config::{MatchStrategy, MorphSettings, Settings};
    use crate::curve::{Curve, CurveEntry};
    use crate::memory::BindError;
    use crate::rng::DitherKind;
    use rootflow_color::ColorMode;
    use rootflow_common::types::Cplx;

    fn settings() -> Settings
    {
        Settings {
            n_coeffs: 3,
            n_roots: 2,
            canvas_width: 16,
            canvas_height: 16,
            total_steps: 10,
            fps: 30.0,
            view_range: 2.0,
            view_center: Cplx::new(0.0, 0.0),
            color_mode: ColorMode::Uniform,
            match_strategy: MatchStrategy::default(),
            morph: MorphSettings::default(),
            has_jiggle: false,
            uniform_color: rootflow_color::Rgb::WHITE,
            seed: [1, 2, 3, 4],
        }
    }

    #[test]
    fn allocate_passes_validation()
    {
        let s = settings();
        let mem = Memory::allocate(&s, 10);
        assert!(mem.validate(&s).is_ok());
        assert_eq!(mem.paint_capacity(), 20);
    }

    #[test]
    fn short_buffer_is_rejected()
    {
        let s = settings();
        let mut mem = Memory::allocate(&s, 10);
        mem.root_im.pop();
        assert_eq!(
            mem.validate(&s),
            Err(BindError::BufferTooSmall {
                name: "root_im",
                len: 1,
                need: 2
            })
        );
    }

    #[test]
    fn out_of_range_entry_is_rejected()
    {
        let s = settings();
        let mut mem = Memory::allocate(&s, 10);
        mem.c_entries.push(CurveEntry {
            coeff: 3,
            speed: 1.0,
            ccw: false,
            dither_sigma: 0.0,
            dither_dist: DitherKind::Gaussian,
            curve: Curve::polyline(vec![Cplx::new(0.0, 0.0)]),
        });
        assert!(matches!(
            mem.validate(&s),
            Err(BindError::CurveIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn empty_curve_is_rejected()
    {
        let s = settings();
        let mut mem = Memory::allocate(&s, 10);
        mem.d_entries.push(CurveEntry {
            coeff: 1,
            speed: 1.0,
            ccw: false,
            dither_sigma: 0.0,
            dither_dist: DitherKind::Uniform,
            curve: Curve::cloud(Vec::new()),
        });
        assert_eq!(mem.validate(&s), Err(BindError::EmptyCurve { coeff: 1 }));
    }
}
