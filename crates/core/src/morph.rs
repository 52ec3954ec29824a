use itertools::izip;
use rootflow_common::prelude::*;

use crate::config::{MorphPath, MorphSettings};

/// Spans shorter than this keep the base coefficient untouched.
const SPAN_EPS_SQR: f64 = 1e-30;

/// Move every working coefficient toward its morph target along the
/// configured path, at the phase given by (cos t, sin t).
///
/// The line path is a plain cosine-eased lerp. The other paths travel the
/// span endpoint-to-endpoint along a circle, a flattened ellipse, or a
/// figure-eight drawn in the span's own frame: `u` along the span, `v`
/// perpendicular to it, centered on the midpoint.
pub fn blend(
    settings: &MorphSettings,
    cos_t: Real,
    sin_t: Real,
    work_re: &mut [f64],
    work_im: &mut [f64],
    target_re: &[f64],
    target_im: &[f64],
)
{
    if settings.path == MorphPath::Line {
        let mu = 0.5 - 0.5 * cos_t;
        let omu = 1.0 - mu;
        for (wr, wi, &tr, &ti) in izip!(
            work_re.iter_mut(),
            work_im.iter_mut(),
            target_re.iter(),
            target_im.iter()
        ) {
            *wr = *wr * omu + tr * mu;
            *wi = *wi * omu + ti * mu;
        }
        return;
    }

    let sign = if settings.ccw { 1.0 } else { -1.0 };
    let sin_2t = 2.0 * sin_t * cos_t;
    for (wr, wi, &tr, &ti) in izip!(
        work_re.iter_mut(),
        work_im.iter_mut(),
        target_re.iter(),
        target_im.iter()
    ) {
        let c = Cplx::new(*wr, *wi);
        let d = Cplx::new(tr, ti);
        let span = d - c;
        let len_sqr = span.norm_sqr();
        if len_sqr < SPAN_EPS_SQR {
            continue;
        }
        let len = len_sqr.sqrt();
        let u = span / len;
        let v = Cplx::new(-u.im, u.re);
        let mid = (c + d) * 0.5;
        let semi = len * 0.5;

        let lx = -semi * cos_t;
        let ly = match settings.path {
            MorphPath::Circle => sign * semi * sin_t,
            MorphPath::Ellipse => sign * settings.ellipse_minor * semi * sin_t,
            _ => sign * (semi * 0.5) * sin_2t,
        };

        let z = mid + u * lx + v * ly;
        *wr = z.re;
        *wi = z.im;
    }
}

/// Phase-localized dither amplitude: squared-cosine envelopes pinned to
/// the cycle's start and end, a squared-sine envelope at mid-cycle.
#[must_use]
pub fn envelope_sigma(settings: &MorphSettings, cos_t: Real, sin_t: Real) -> Real
{
    let start_env = if cos_t > 0.0 { cos_t * cos_t } else { 0.0 };
    let end_env = if cos_t < 0.0 { cos_t * cos_t } else { 0.0 };
    settings.dither_start * start_env
        + settings.dither_mid * sin_t * sin_t
        + settings.dither_end * end_env
}
