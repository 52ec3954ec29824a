use std::f64::consts::TAU;

use aberth_solve::MAX_DEGREE;
use derive_more::{Display, Error, From};
use log::{debug, info};
use rootflow_color::proximity::{min_pair_distances, ProxScale};
use rootflow_color::rank::rank_normalize;
use rootflow_color::sensitivity::compute_sensitivity;
use rootflow_color::{ColorMode, Rgb, Viewport};
use rootflow_common::prelude::*;

use crate::config::{ConfigError, MatchStrategy, Settings};
use crate::matcher::{match_greedy, match_hungarian};
use crate::memory::{BindError, Memory};
use crate::morph;
use crate::rng::RngState;

/// Interval between progress callbacks, in steps.
pub const PROGRESS_INTERVAL: usize = 2000;

/// Stride of the cheap matching schedule (strided strategy, derivative
/// mode).
const MATCH_STRIDE: usize = 4;

/// Angular offset of the rescue circle for roots the solver lost.
const RESCUE_PHASE: f64 = 0.37;

#[derive(Clone, Debug, Display, Error, From, PartialEq, Eq)]
pub enum InitError
{
    Config(ConfigError),
    Bind(BindError),
}

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum StepError
{
    #[display("paint buffers hold {capacity} pixels, the requested span may emit {required}")]
    OutputCapacity
    {
        capacity: usize, required: usize
    },
}

/// The bound compute core: validated settings plus the dither stream.
/// Root state and every buffer stay in the host's [`Memory`].
pub struct Engine
{
    settings: Settings,
    rng: RngState,
}

impl Engine
{
    /// Validate the configuration against the host's region and capture
    /// the seed words. The Gaussian spare starts cleared.
    pub fn bind(settings: Settings, memory: &Memory) -> Result<Self, InitError>
    {
        settings.validate()?;
        memory.validate(&settings)?;
        info!(
            "bound degree-{} animation on a {}x{} canvas ({:?} coloring, {:?} matching)",
            settings.n_roots,
            settings.canvas_width,
            settings.canvas_height,
            settings.color_mode,
            settings.match_strategy,
        );
        let rng = RngState::from_seed(settings.seed);
        Ok(Self { settings, rng })
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings
    {
        &self.settings
    }

    /// Execute steps `[step_start, step_end)`, packing one pixel per
    /// on-canvas root into the paint buffers. Returns the pixel count.
    ///
    /// `progress` is invoked every [`PROGRESS_INTERVAL`] steps with the
    /// batch-relative step index; it must not re-enter the core.
    pub fn run_step_loop<F>(
        &mut self,
        mem: &mut Memory,
        step_start: usize,
        step_end: usize,
        elapsed_offset: f64,
        mut progress: F,
    ) -> Result<usize, StepError>
    where
        F: FnMut(usize),
    {
        let Self { settings, rng } = self;
        let nc = settings.n_coeffs;
        let nr = settings.n_roots;

        let n_steps = step_end.saturating_sub(step_start);
        let required = nr * n_steps;
        let capacity = mem.paint_capacity();
        if required > capacity {
            return Err(StepError::OutputCapacity { capacity, required });
        }

        let viewport = Viewport {
            width: settings.canvas_width,
            height: settings.canvas_height,
            center: settings.view_center,
            range: settings.view_range,
        };
        let total = settings.total_steps as f64;

        // Seed the scratch polynomials from the host inputs; per-step
        // resets only happen when jiggle is enabled.
        mem.work_re[..nc].copy_from_slice(&mem.base_re[..nc]);
        mem.work_im[..nc].copy_from_slice(&mem.base_im[..nc]);
        mem.morph_work_re[..nc].copy_from_slice(&mem.morph_target_re[..nc]);
        mem.morph_work_im[..nc].copy_from_slice(&mem.morph_target_im[..nc]);

        let mut rotor = settings.morph.enabled.then(|| {
            let d_theta = TAU * settings.morph.rate * settings.fps / total;
            let theta0 = TAU
                * settings.morph.rate
                * (elapsed_offset + (step_start as f64 / total) * settings.fps);
            PhaseRotor::new(theta0, d_theta)
        });

        let mut prox = ProxScale::new();
        let mut pixels = 0;

        for step in step_start..step_end {
            let rel = step - step_start;
            let elapsed = elapsed_offset + (step as f64 / total) * settings.fps;

            assemble_step(settings, mem, rng, elapsed, rotor.as_ref());

            // Solve on scratch, warm-started from the persistent roots.
            mem.tmp_re[..nr].copy_from_slice(&mem.root_re[..nr]);
            mem.tmp_im[..nr].copy_from_slice(&mem.root_im[..nr]);
            aberth_solve::solve(
                &mem.work_re[..nc],
                &mem.work_im[..nc],
                &mut mem.tmp_re[..nr],
                &mut mem.tmp_im[..nr],
            );

            // Roots the solver lost restart from the unit circle.
            for i in 0..nr {
                if mem.tmp_re[i].is_nan() || mem.tmp_im[i].is_nan() {
                    debug!("rescuing root {i} at step {step}");
                    let angle = TAU * i as f64 / nr as f64 + RESCUE_PHASE;
                    mem.tmp_re[i] = angle.cos();
                    mem.tmp_im[i] = angle.sin();
                }
            }

            match settings.color_mode {
                ColorMode::Uniform => {
                    commit_roots(mem, nr);
                    let color = settings.uniform_color;
                    emit_pixels(mem, nr, &viewport, &mut pixels, |_, _| color);
                }
                ColorMode::Index => {
                    match settings.match_strategy {
                        MatchStrategy::Hungarian => match_against_prev(mem, nr, match_hungarian),
                        MatchStrategy::Greedy => match_against_prev(mem, nr, match_greedy),
                        MatchStrategy::Strided => {
                            if rel % MATCH_STRIDE == 0 {
                                match_against_prev(mem, nr, match_greedy);
                            }
                        }
                    }
                    commit_roots(mem, nr);
                    emit_pixels(mem, nr, &viewport, &mut pixels, |mem, i| {
                        mem.palettes.per_root[i]
                    });
                }
                ColorMode::Proximity => {
                    let mut dists = [0.0; MAX_DEGREE];
                    min_pair_distances(&mem.tmp_re[..nr], &mem.tmp_im[..nr], &mut dists[..nr]);
                    prox.absorb(&dists[..nr]);
                    commit_roots(mem, nr);
                    emit_pixels(mem, nr, &viewport, &mut pixels, |mem, i| {
                        mem.palettes.proximity.at_floor(prox.score(dists[i]))
                    });
                }
                ColorMode::Derivative => {
                    if rel % MATCH_STRIDE == 0 {
                        match_against_prev(mem, nr, match_greedy);
                    }
                    let mut raw = [0.0; MAX_DEGREE];
                    let mut norm = [0.0; MAX_DEGREE];
                    compute_sensitivity(
                        &mem.work_re[..nc],
                        &mem.work_im[..nc],
                        &mem.tmp_re[..nr],
                        &mem.tmp_im[..nr],
                        &mem.selected,
                        &mut raw[..nr],
                    );
                    rank_normalize(&raw[..nr], &mut norm[..nr]);
                    commit_roots(mem, nr);
                    emit_pixels(mem, nr, &viewport, &mut pixels, |mem, i| {
                        mem.palettes.derivative.at_round(norm[i])
                    });
                }
            }

            if let Some(rotor) = rotor.as_mut() {
                rotor.advance();
            }
            if rel % PROGRESS_INTERVAL == 0 {
                progress(rel);
            }
        }

        Ok(pixels)
    }
}

/// Assemble the working polynomial for one step: base reset, C-curve
/// overlay with dither, morph-target overlay, follow-C copy, path blend,
/// envelope dither, jiggle.
fn assemble_step(
    settings: &Settings,
    mem: &mut Memory,
    rng: &mut RngState,
    elapsed: f64,
    rotor: Option<&PhaseRotor>,
)
{
    let nc = settings.n_coeffs;

    if settings.has_jiggle {
        mem.work_re[..nc].copy_from_slice(&mem.base_re[..nc]);
        mem.work_im[..nc].copy_from_slice(&mem.base_im[..nc]);
    }

    for entry in &mem.c_entries {
        let z = entry.curve.sample(entry.phase(elapsed));
        mem.work_re[entry.coeff] = z.re;
        mem.work_im[entry.coeff] = z.im;
        if entry.dither_sigma > 0.0 {
            mem.work_re[entry.coeff] += rng.dither(entry.dither_dist) * entry.dither_sigma;
            mem.work_im[entry.coeff] += rng.dither(entry.dither_dist) * entry.dither_sigma;
        }
    }

    if settings.morph.enabled {
        for entry in &mem.d_entries {
            let z = entry.curve.sample(entry.phase(elapsed));
            mem.morph_work_re[entry.coeff] = z.re;
            mem.morph_work_im[entry.coeff] = z.im;
            if entry.dither_sigma > 0.0 {
                mem.morph_work_re[entry.coeff] +=
                    rng.dither(entry.dither_dist) * entry.dither_sigma;
                mem.morph_work_im[entry.coeff] +=
                    rng.dither(entry.dither_dist) * entry.dither_sigma;
            }
        }
        for &idx in &mem.follow_c {
            mem.morph_work_re[idx] = mem.work_re[idx];
            mem.morph_work_im[idx] = mem.work_im[idx];
        }
        if let Some(rotor) = rotor {
            if !rotor.is_near_zero() {
                morph::blend(
                    &settings.morph,
                    rotor.cos(),
                    rotor.sin(),
                    &mut mem.work_re[..nc],
                    &mut mem.work_im[..nc],
                    &mem.morph_work_re[..nc],
                    &mem.morph_work_im[..nc],
                );
            }
            let sigma = morph::envelope_sigma(&settings.morph, rotor.cos(), rotor.sin());
            if sigma > 0.0 {
                for k in 0..nc {
                    mem.work_re[k] += (rng.uniform() - 0.5) * 2.0 * sigma;
                    mem.work_im[k] += (rng.uniform() - 0.5) * 2.0 * sigma;
                }
            }
        }
    }

    if settings.has_jiggle {
        for (w, j) in mem.work_re[..nc].iter_mut().zip(&mem.jiggle_re[..nc]) {
            *w += j;
        }
        for (w, j) in mem.work_im[..nc].iter_mut().zip(&mem.jiggle_im[..nc]) {
            *w += j;
        }
    }
}

/// Reorder the freshly solved scratch roots against the persistent
/// predecessors with the given matcher.
fn match_against_prev(
    mem: &mut Memory,
    nr: usize,
    matcher: fn(&mut [f64], &mut [f64], &[f64], &[f64]),
)
{
    let Memory {
        tmp_re,
        tmp_im,
        root_re,
        root_im,
        ..
    } = mem;
    matcher(
        &mut tmp_re[..nr],
        &mut tmp_im[..nr],
        &root_re[..nr],
        &root_im[..nr],
    );
}

fn commit_roots(mem: &mut Memory, nr: usize)
{
    mem.root_re[..nr].copy_from_slice(&mem.tmp_re[..nr]);
    mem.root_im[..nr].copy_from_slice(&mem.tmp_im[..nr]);
}

fn emit_pixels<F>(mem: &mut Memory, nr: usize, viewport: &Viewport, pixels: &mut usize, color: F)
where
    F: Fn(&Memory, usize) -> Rgb,
{
    for i in 0..nr {
        let z = Cplx::new(mem.root_re[i], mem.root_im[i]);
        let Some(idx) = viewport.project(z) else {
            continue;
        };
        let rgb = color(mem, i);
        let at = *pixels;
        mem.paint_idx[at] = idx;
        mem.paint_r[at] = rgb.r;
        mem.paint_g[at] = rgb.g;
        mem.paint_b[at] = rgb.b;
        *pixels += 1;
    }
}

#[cfg(test)]
mod tests
{
    use super::{Engine, StepError};
    use crate::config::{MatchStrategy, MorphPath, MorphSettings, Settings};
    use crate::curve::{Curve, CurveEntry};
    use crate::memory::Memory;
    use crate::rng::DitherKind;
    use rootflow_color::{ColorMode, Rgb};
    use rootflow_common::types::Cplx;

    fn settings() -> Settings
    {
        Settings {
            n_coeffs: 3,
            n_roots: 2,
            canvas_width: 64,
            canvas_height: 64,
            total_steps: 8,
            fps: 1.0,
            view_range: 4.0,
            view_center: Cplx::new(0.0, 0.0),
            color_mode: ColorMode::Uniform,
            match_strategy: MatchStrategy::Strided,
            morph: MorphSettings::default(),
            has_jiggle: false,
            uniform_color: Rgb::new(200, 100, 50),
            seed: [1, 2, 3, 4],
        }
    }

    /// z^2 - 1 with a gently perturbed warm start.
    fn unit_quadratic_memory(s: &Settings, max_steps: usize) -> Memory
    {
        let mut mem = Memory::allocate(s, max_steps);
        mem.base_re.copy_from_slice(&[1.0, 0.0, -1.0]);
        mem.root_re.copy_from_slice(&[0.1, -0.1]);
        mem
    }

    #[test]
    fn uniform_run_converges_and_paints()
    {
        let s = settings();
        let mut mem = unit_quadratic_memory(&s, 8);
        let mut engine = Engine::bind(s, &mem).unwrap();

        let mut reports = Vec::new();
        let pixels = engine
            .run_step_loop(&mut mem, 0, 8, 0.0, |rel| reports.push(rel))
            .unwrap();

        // Both roots stay on canvas for all eight steps.
        assert_eq!(pixels, 16);
        assert_eq!(reports, vec![0]);

        let mut roots = [mem.root_re[0], mem.root_re[1]];
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((roots[0] + 1.0).abs() < 1e-10);
        assert!((roots[1] - 1.0).abs() < 1e-10);
        assert!(mem.root_im[0].abs() < 1e-10);

        for k in 0..pixels {
            assert!(mem.paint_idx[k] < 64 * 64);
            assert_eq!(mem.paint_r[k], 200);
            assert_eq!(mem.paint_g[k], 100);
            assert_eq!(mem.paint_b[k], 50);
        }
    }

    #[test]
    fn index_mode_tracks_identity()
    {
        let mut s = settings();
        s.color_mode = ColorMode::Index;
        let mut mem = unit_quadratic_memory(&s, 8);
        mem.palettes.per_root[0] = Rgb::new(255, 0, 0);
        mem.palettes.per_root[1] = Rgb::new(0, 0, 255);
        let mut engine = Engine::bind(s, &mem).unwrap();

        let pixels = engine.run_step_loop(&mut mem, 0, 8, 0.0, |_| {}).unwrap();
        assert_eq!(pixels, 16);

        // Slot 0 chased the predecessor at +0.1, so it owns the root at
        // +1 and paints red on the right half of the canvas.
        assert!((mem.root_re[0] - 1.0).abs() < 1e-10);
        for k in 0..pixels {
            let ix = mem.paint_idx[k] % 64;
            if mem.paint_r[k] == 255 {
                assert!(ix > 32);
            } else {
                assert_eq!(mem.paint_b[k], 255);
                assert!(ix < 32);
            }
        }
    }

    #[test]
    fn single_point_curve_drives_the_constant_term()
    {
        let mut s = settings();
        s.color_mode = ColorMode::Uniform;
        let mut mem = unit_quadratic_memory(&s, 4);
        // Pin the constant coefficient to -4: the polynomial becomes
        // z^2 - 4 on every step.
        mem.c_entries.push(CurveEntry {
            coeff: 2,
            speed: 1.0,
            ccw: false,
            dither_sigma: 0.0,
            dither_dist: DitherKind::Gaussian,
            curve: Curve::polyline(vec![Cplx::new(-4.0, 0.0)]),
        });
        let mut engine = Engine::bind(s, &mem).unwrap();
        engine.run_step_loop(&mut mem, 0, 4, 0.0, |_| {}).unwrap();

        let mut roots = [mem.root_re[0], mem.root_re[1]];
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((roots[0] + 2.0).abs() < 1e-8);
        assert!((roots[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn line_morph_reaches_the_target_polynomial()
    {
        let mut s = settings();
        s.total_steps = 4;
        s.morph = MorphSettings {
            enabled: true,
            rate: 0.5,
            path: MorphPath::Line,
            ..MorphSettings::default()
        };
        let mut mem = unit_quadratic_memory(&s, 6);
        mem.morph_target_re.copy_from_slice(&[1.0, 0.0, -4.0]);
        let mut engine = Engine::bind(s, &mem).unwrap();

        // Step 4 runs at half the morph cycle, where the blend sits fully
        // on the target: z^2 - 4.
        engine.run_step_loop(&mut mem, 0, 5, 0.0, |_| {}).unwrap();

        let mut roots = [mem.root_re[0], mem.root_re[1]];
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((roots[0] + 2.0).abs() < 1e-6);
        assert!((roots[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn jiggle_offsets_shift_the_polynomial()
    {
        let mut s = settings();
        s.has_jiggle = true;
        let mut mem = unit_quadratic_memory(&s, 4);
        // Constant term -1 + 3 = 2: roots move to +/- i sqrt(2).
        mem.jiggle_re[2] = 3.0;
        mem.root_re.copy_from_slice(&[0.1, -0.1]);
        mem.root_im.copy_from_slice(&[0.5, -0.5]);
        let mut engine = Engine::bind(s, &mem).unwrap();
        engine.run_step_loop(&mut mem, 0, 4, 0.0, |_| {}).unwrap();

        let expect = 2.0f64.sqrt();
        let mut ims = [mem.root_im[0], mem.root_im[1]];
        ims.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((ims[0] + expect).abs() < 1e-8);
        assert!((ims[1] - expect).abs() < 1e-8);
        assert!(mem.root_re[0].abs() < 1e-8);
    }

    #[test]
    fn proximity_and_derivative_modes_emit_ramp_colors()
    {
        for mode in [ColorMode::Proximity, ColorMode::Derivative] {
            let mut s = settings();
            s.color_mode = mode;
            let mut mem = unit_quadratic_memory(&s, 8);
            mem.selected = vec![2];
            let mut engine = Engine::bind(s, &mem).unwrap();
            let pixels = engine.run_step_loop(&mut mem, 0, 8, 0.0, |_| {}).unwrap();
            assert_eq!(pixels, 16);
            // Greyscale default ramps paint equal channels.
            for k in 0..pixels {
                assert_eq!(mem.paint_r[k], mem.paint_g[k]);
                assert_eq!(mem.paint_g[k], mem.paint_b[k]);
            }
        }
    }

    #[test]
    fn output_capacity_is_enforced()
    {
        let s = settings();
        let mut mem = unit_quadratic_memory(&s, 1);
        let mut engine = Engine::bind(s, &mem).unwrap();
        let err = engine
            .run_step_loop(&mut mem, 0, 2, 0.0, |_| {})
            .unwrap_err();
        assert_eq!(
            err,
            StepError::OutputCapacity {
                capacity: 2,
                required: 4
            }
        );
    }

    #[test]
    fn off_canvas_roots_are_dropped()
    {
        let mut s = settings();
        s.view_range = 0.5;
        s.view_center = Cplx::new(10.0, 10.0);
        let mut mem = unit_quadratic_memory(&s, 4);
        let mut engine = Engine::bind(s, &mem).unwrap();
        let pixels = engine.run_step_loop(&mut mem, 0, 4, 0.0, |_| {}).unwrap();
        assert_eq!(pixels, 0);
    }

    #[test]
    fn root_state_persists_across_invocations()
    {
        let s = settings();
        let mut mem = unit_quadratic_memory(&s, 8);
        let mut engine = Engine::bind(s, &mem).unwrap();

        engine.run_step_loop(&mut mem, 0, 4, 0.0, |_| {}).unwrap();
        let after_first = [mem.root_re[0], mem.root_re[1]];
        engine.run_step_loop(&mut mem, 4, 8, 0.0, |_| {}).unwrap();
        let after_second = [mem.root_re[0], mem.root_re[1]];

        // Already converged after the first span; the warm start keeps
        // the second span on the same trajectories.
        for k in 0..2 {
            assert!((after_first[k] - after_second[k]).abs() < 1e-10);
        }
    }
}

